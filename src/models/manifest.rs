//! Manifest models for Docker schema 2 and OCI image formats
//!
//! A manifest body is discriminated on its `mediaType` field into one of four
//! supported formats: Docker schema 2 manifest, OCI image manifest, Docker
//! manifest list, and OCI image index. Single manifests carry a config
//! descriptor plus ordered layer descriptors; lists carry platform-tagged
//! sub-manifest descriptors. Anything else (including Docker schema 1) is
//! rejected as unsupported.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::digest::Digest;
use crate::error::{RegistryError, Result};

/// Media types defined by the Docker Registry v2 and OCI image specs.
pub mod media_types {
    /// Manifest, Docker version 2 schema 2.
    pub const DOCKER_MANIFEST_V2: &str = "application/vnd.docker.distribution.manifest.v2+json";
    /// Manifest list, Docker version 2 schema 2 ("fat manifest").
    pub const DOCKER_MANIFEST_LIST: &str =
        "application/vnd.docker.distribution.manifest.list.v2+json";
    /// OCI image manifest.
    pub const OCI_MANIFEST: &str = "application/vnd.oci.image.manifest.v1+json";
    /// OCI image index.
    pub const OCI_INDEX: &str = "application/vnd.oci.image.index.v1+json";
    /// Signed manifest, Docker version 2 schema 1. Recognized but unsupported.
    pub const DOCKER_MANIFEST_V1_SIGNED: &str =
        "application/vnd.docker.distribution.manifest.v1+prettyjws";
    /// Container config blob, Docker flavor.
    pub const DOCKER_IMAGE_CONFIG: &str = "application/vnd.docker.container.image.v1+json";
    /// Container config blob, OCI flavor.
    pub const OCI_IMAGE_CONFIG: &str = "application/vnd.oci.image.config.v1+json";
    /// Image layer as gzip-compressed tar, Docker flavor.
    pub const DOCKER_LAYER_TAR_GZIP: &str = "application/vnd.docker.image.rootfs.diff.tar.gzip";
    /// Image layer as gzip-compressed tar, OCI flavor.
    pub const OCI_LAYER_TAR_GZIP: &str = "application/vnd.oci.image.layer.v1.tar+gzip";

    /// Accept header value listing every manifest format this crate parses.
    pub const ACCEPT_MANIFESTS: &str = "application/vnd.docker.distribution.manifest.v2+json, \
         application/vnd.docker.distribution.manifest.list.v2+json, \
         application/vnd.oci.image.manifest.v1+json, \
         application/vnd.oci.image.index.v1+json";
}

/// Content descriptor: media type, digest and size of a referenced blob.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Descriptor {
    pub media_type: String,
    pub digest: Digest,
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,
}

/// Target platform of a sub-manifest in a list/index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Platform {
    pub architecture: String,
    pub os: String,
    #[serde(
        default,
        rename = "os.version",
        skip_serializing_if = "Option::is_none"
    )]
    pub os_version: Option<String>,
    #[serde(
        default,
        rename = "os.features",
        skip_serializing_if = "Option::is_none"
    )]
    pub os_features: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
}

/// Descriptor of a sub-manifest inside a manifest list or index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlatformDescriptor {
    #[serde(flatten)]
    pub descriptor: Descriptor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
}

/// Single-image manifest body (Docker schema 2 or OCI).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageManifest {
    pub schema_version: u32,
    pub config: Descriptor,
    #[serde(default, deserialize_with = "crate::models::null_to_default")]
    pub layers: Vec<Descriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,
}

impl ImageManifest {
    /// Sum of all layer sizes in bytes, excluding the config blob.
    pub fn total_size(&self) -> u64 {
        self.layers.iter().map(|layer| layer.size).sum()
    }
}

/// Multi-platform manifest body (Docker manifest list or OCI index).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManifestList {
    pub schema_version: u32,
    #[serde(default, deserialize_with = "crate::models::null_to_default")]
    pub manifests: Vec<PlatformDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,
}

/// A manifest response, discriminated by its `mediaType`.
#[derive(Debug, Clone, PartialEq)]
pub enum Manifest {
    DockerV2(ImageManifest),
    Oci(ImageManifest),
    DockerList(ManifestList),
    OciIndex(ManifestList),
}

impl Manifest {
    /// Parse a manifest body, discriminating on `mediaType`.
    ///
    /// Bodies without a `mediaType` are classified by shape when
    /// `schemaVersion` is 2 (the OCI spec long treated the field as
    /// optional); everything else fails as unsupported.
    pub fn from_value(value: Value) -> Result<Self> {
        let media_type = value
            .get("mediaType")
            .and_then(Value::as_str)
            .map(str::to_string);

        match media_type.as_deref() {
            Some(media_types::DOCKER_MANIFEST_V2) => {
                Ok(Manifest::DockerV2(serde_json::from_value(value)?))
            }
            Some(media_types::OCI_MANIFEST) => Ok(Manifest::Oci(serde_json::from_value(value)?)),
            Some(media_types::DOCKER_MANIFEST_LIST) => {
                Ok(Manifest::DockerList(serde_json::from_value(value)?))
            }
            Some(media_types::OCI_INDEX) => Ok(Manifest::OciIndex(serde_json::from_value(value)?)),
            Some(other) => Err(RegistryError::Validation(format!(
                "unsupported manifest type '{}'",
                other
            ))),
            None => {
                let schema_version = value.get("schemaVersion").and_then(Value::as_u64);
                if schema_version != Some(2) {
                    return Err(RegistryError::Validation(
                        "unsupported manifest type: missing mediaType".to_string(),
                    ));
                }
                if value.get("manifests").is_some() {
                    Ok(Manifest::OciIndex(serde_json::from_value(value)?))
                } else if value.get("config").is_some() {
                    Ok(Manifest::Oci(serde_json::from_value(value)?))
                } else {
                    Err(RegistryError::Validation(
                        "unsupported manifest type: missing mediaType".to_string(),
                    ))
                }
            }
        }
    }

    /// Parse a raw manifest body.
    pub fn from_slice(data: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(data)?;
        Self::from_value(value)
    }

    /// The media type of this manifest, as sent in `Content-Type`.
    pub fn media_type(&self) -> &'static str {
        match self {
            Manifest::DockerV2(_) => media_types::DOCKER_MANIFEST_V2,
            Manifest::Oci(_) => media_types::OCI_MANIFEST,
            Manifest::DockerList(_) => media_types::DOCKER_MANIFEST_LIST,
            Manifest::OciIndex(_) => media_types::OCI_INDEX,
        }
    }

    /// Serialize to JSON with the `mediaType` field filled in.
    pub fn to_value(&self) -> Result<Value> {
        let value = match self {
            Manifest::DockerV2(manifest) | Manifest::Oci(manifest) => {
                serde_json::to_value(manifest)?
            }
            Manifest::DockerList(list) | Manifest::OciIndex(list) => serde_json::to_value(list)?,
        };
        match value {
            Value::Object(mut body) => {
                body.insert(
                    "mediaType".to_string(),
                    Value::String(self.media_type().to_string()),
                );
                Ok(Value::Object(body))
            }
            _ => Err(RegistryError::Validation(
                "manifest did not serialize to a JSON object".to_string(),
            )),
        }
    }

    /// Serialize to the raw bytes sent in a manifest PUT body.
    pub fn to_vec(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&self.to_value()?)?)
    }
}

impl Serialize for Manifest {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_value()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Manifest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Manifest::from_value(value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn docker_v2_body() -> Value {
        json!({
            "schemaVersion": 2,
            "mediaType": media_types::DOCKER_MANIFEST_V2,
            "config": {
                "mediaType": media_types::DOCKER_IMAGE_CONFIG,
                "size": 7023,
                "digest": "sha256:b5b2b2c507a0944348e0303114d8d93aaaa081732b86451d9bce1f432a537bc7"
            },
            "layers": [
                {
                    "mediaType": media_types::DOCKER_LAYER_TAR_GZIP,
                    "size": 32654,
                    "digest": "sha256:e692418e4cbaf90ca69d05a66403747baa33ee08806650b51fab815ad7fc331f"
                },
                {
                    "mediaType": media_types::DOCKER_LAYER_TAR_GZIP,
                    "size": 16724,
                    "digest": "sha256:3c3a4604a545cdc127456d94e421cd355bca5b528f4a9c1905b15da2eb4a4c6b"
                }
            ]
        })
    }

    fn oci_index_body() -> Value {
        json!({
            "schemaVersion": 2,
            "mediaType": media_types::OCI_INDEX,
            "manifests": [
                {
                    "mediaType": media_types::OCI_MANIFEST,
                    "size": 7143,
                    "digest": "sha256:e692418e4cbaf90ca69d05a66403747baa33ee08806650b51fab815ad7fc331f",
                    "platform": { "architecture": "amd64", "os": "linux" }
                },
                {
                    "mediaType": media_types::OCI_MANIFEST,
                    "size": 7682,
                    "digest": "sha256:5b0bcabd1ed22e9fb1310cf6c2dec7cdef19f0ad69efa1f392e94a4333501270",
                    "platform": { "architecture": "arm64", "os": "linux", "variant": "v8" }
                }
            ]
        })
    }

    #[test]
    fn parses_docker_v2_manifest() {
        let manifest = Manifest::from_value(docker_v2_body()).unwrap();
        let Manifest::DockerV2(inner) = &manifest else {
            panic!("expected DockerV2, got {:?}", manifest);
        };
        assert_eq!(inner.schema_version, 2);
        assert_eq!(inner.layers.len(), 2);
        assert_eq!(inner.total_size(), 32654 + 16724);
        assert_eq!(inner.config.media_type, media_types::DOCKER_IMAGE_CONFIG);
    }

    #[test]
    fn parses_oci_index_with_platforms() {
        let manifest = Manifest::from_value(oci_index_body()).unwrap();
        let Manifest::OciIndex(inner) = &manifest else {
            panic!("expected OciIndex, got {:?}", manifest);
        };
        assert_eq!(inner.manifests.len(), 2);
        let platform = inner.manifests[1].platform.as_ref().unwrap();
        assert_eq!(platform.architecture, "arm64");
        assert_eq!(platform.variant.as_deref(), Some("v8"));
    }

    #[test]
    fn round_trips_to_equivalent_json() {
        for body in [docker_v2_body(), oci_index_body()] {
            let manifest = Manifest::from_value(body.clone()).unwrap();
            assert_eq!(manifest.to_value().unwrap(), body);
        }
    }

    #[test]
    fn unknown_media_type_is_unsupported() {
        let body = json!({ "schemaVersion": 2, "mediaType": "application/vnd.example.unknown+json" });
        let err = Manifest::from_value(body).unwrap_err();
        assert!(err.to_string().contains("unsupported manifest type"));
    }

    #[test]
    fn schema1_is_unsupported() {
        let body = json!({
            "schemaVersion": 1,
            "mediaType": media_types::DOCKER_MANIFEST_V1_SIGNED,
            "name": "python",
            "tag": "latest",
            "fsLayers": []
        });
        let err = Manifest::from_value(body).unwrap_err();
        assert!(err.to_string().contains("unsupported manifest type"));
    }

    #[test]
    fn missing_media_type_falls_back_on_shape() {
        let mut manifest_body = docker_v2_body();
        manifest_body.as_object_mut().unwrap().remove("mediaType");
        let manifest = Manifest::from_value(manifest_body).unwrap();
        assert!(matches!(manifest, Manifest::Oci(_)));

        let mut index_body = oci_index_body();
        index_body.as_object_mut().unwrap().remove("mediaType");
        let manifest = Manifest::from_value(index_body).unwrap();
        assert!(matches!(manifest, Manifest::OciIndex(_)));
    }

    #[test]
    fn missing_media_type_without_known_shape_fails() {
        let body = json!({ "schemaVersion": 2, "something": "else" });
        assert!(Manifest::from_value(body).is_err());

        let body = json!({ "schemaVersion": 1, "config": {} });
        assert!(Manifest::from_value(body).is_err());
    }

    #[test]
    fn descriptor_with_bad_digest_fails() {
        let body = json!({
            "schemaVersion": 2,
            "mediaType": media_types::DOCKER_MANIFEST_V2,
            "config": {
                "mediaType": media_types::DOCKER_IMAGE_CONFIG,
                "size": 10,
                "digest": "not-a-digest"
            },
            "layers": []
        });
        assert!(Manifest::from_value(body).is_err());
    }

    #[test]
    fn descriptor_with_negative_size_fails() {
        let mut body = docker_v2_body();
        body["config"]["size"] = json!(-1);
        assert!(Manifest::from_value(body).is_err());
    }

    #[test]
    fn descriptor_with_missing_size_fails() {
        let mut body = docker_v2_body();
        body["config"].as_object_mut().unwrap().remove("size");
        assert!(Manifest::from_value(body).is_err());
    }

    #[test]
    fn manifest_serde_matches_from_slice() {
        let raw = serde_json::to_vec(&docker_v2_body()).unwrap();
        let via_slice = Manifest::from_slice(&raw).unwrap();
        let via_serde: Manifest = serde_json::from_slice(&raw).unwrap();
        assert_eq!(via_slice, via_serde);
    }
}
