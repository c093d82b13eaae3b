//! Registry error body models
//!
//! Failed requests to a Docker/OCI registry carry a JSON envelope of the form
//! `{"errors":[{"code":"...","message":"...","detail":{...}}]}`. The `code`
//! values come from a fixed set defined by the distribution spec; registries
//! in the wild sometimes omit the code or invent their own, so unrecognized
//! codes map to [`ErrorCode::Unknown`] instead of failing the parse.

use serde::{Deserialize, Deserializer, Serialize};

/// Registry error codes from the Docker Registry v2 / OCI distribution spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    BlobUnknown,
    BlobUploadInvalid,
    BlobUploadUnknown,
    DigestInvalid,
    ManifestBlobUnknown,
    ManifestInvalid,
    ManifestUnknown,
    ManifestUnverified,
    NameInvalid,
    NameUnknown,
    PaginationNumberInvalid,
    RangeInvalid,
    SizeInvalid,
    TagInvalid,
    Unauthorized,
    Denied,
    Unsupported,
    InternalError,
    /// Missing or nonstandard code.
    Unknown,
}

impl ErrorCode {
    pub fn from_wire_str(value: &str) -> Self {
        match value {
            "BLOB_UNKNOWN" => ErrorCode::BlobUnknown,
            "BLOB_UPLOAD_INVALID" => ErrorCode::BlobUploadInvalid,
            "BLOB_UPLOAD_UNKNOWN" => ErrorCode::BlobUploadUnknown,
            "DIGEST_INVALID" => ErrorCode::DigestInvalid,
            "MANIFEST_BLOB_UNKNOWN" => ErrorCode::ManifestBlobUnknown,
            "MANIFEST_INVALID" => ErrorCode::ManifestInvalid,
            "MANIFEST_UNKNOWN" => ErrorCode::ManifestUnknown,
            "MANIFEST_UNVERIFIED" => ErrorCode::ManifestUnverified,
            "NAME_INVALID" => ErrorCode::NameInvalid,
            "NAME_UNKNOWN" => ErrorCode::NameUnknown,
            "PAGINATION_NUMBER_INVALID" => ErrorCode::PaginationNumberInvalid,
            "RANGE_INVALID" => ErrorCode::RangeInvalid,
            "SIZE_INVALID" => ErrorCode::SizeInvalid,
            "TAG_INVALID" => ErrorCode::TagInvalid,
            "UNAUTHORIZED" => ErrorCode::Unauthorized,
            "DENIED" => ErrorCode::Denied,
            "UNSUPPORTED" => ErrorCode::Unsupported,
            "INTERNAL_ERROR" => ErrorCode::InternalError,
            _ => ErrorCode::Unknown,
        }
    }

    pub fn as_wire_str(&self) -> &'static str {
        match self {
            ErrorCode::BlobUnknown => "BLOB_UNKNOWN",
            ErrorCode::BlobUploadInvalid => "BLOB_UPLOAD_INVALID",
            ErrorCode::BlobUploadUnknown => "BLOB_UPLOAD_UNKNOWN",
            ErrorCode::DigestInvalid => "DIGEST_INVALID",
            ErrorCode::ManifestBlobUnknown => "MANIFEST_BLOB_UNKNOWN",
            ErrorCode::ManifestInvalid => "MANIFEST_INVALID",
            ErrorCode::ManifestUnknown => "MANIFEST_UNKNOWN",
            ErrorCode::ManifestUnverified => "MANIFEST_UNVERIFIED",
            ErrorCode::NameInvalid => "NAME_INVALID",
            ErrorCode::NameUnknown => "NAME_UNKNOWN",
            ErrorCode::PaginationNumberInvalid => "PAGINATION_NUMBER_INVALID",
            ErrorCode::RangeInvalid => "RANGE_INVALID",
            ErrorCode::SizeInvalid => "SIZE_INVALID",
            ErrorCode::TagInvalid => "TAG_INVALID",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::Denied => "DENIED",
            ErrorCode::Unsupported => "UNSUPPORTED",
            ErrorCode::InternalError => "INTERNAL_ERROR",
            ErrorCode::Unknown => "UNKNOWN",
        }
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire_str())
    }
}

impl<'de> Deserialize<'de> for ErrorCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        // Tolerate absent values when the field itself is present but null.
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(match raw {
            Some(value) => ErrorCode::from_wire_str(&value),
            None => ErrorCode::Unknown,
        })
    }
}

impl Default for ErrorCode {
    fn default() -> Self {
        ErrorCode::Unknown
    }
}

/// One entry of the registry error envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiError {
    #[serde(default)]
    pub code: ErrorCode,
    #[serde(default, deserialize_with = "crate::models::null_to_default")]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<serde_json::Value>,
}

/// The top-level `{"errors": [...]}` envelope.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    #[serde(default, deserialize_with = "crate::models::null_to_default")]
    pub errors: Vec<ApiError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_standard_error_body() {
        let body = r#"{"errors":[{"code":"MANIFEST_UNKNOWN","message":"manifest unknown","detail":{"Tag":"latest"}}]}"#;
        let parsed: ErrorResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.errors[0].code, ErrorCode::ManifestUnknown);
        assert_eq!(parsed.errors[0].message, "manifest unknown");
        assert_eq!(
            parsed.errors[0].detail.as_ref().unwrap()["Tag"],
            serde_json::json!("latest")
        );
    }

    #[test]
    fn missing_code_maps_to_unknown() {
        let body = r#"{"errors":[{"message":"something odd"}]}"#;
        let parsed: ErrorResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.errors[0].code, ErrorCode::Unknown);
        assert_eq!(parsed.errors[0].message, "something odd");
    }

    #[test]
    fn nonstandard_code_maps_to_unknown() {
        let body = r#"{"errors":[{"code":"SOMETHING_CUSTOM","message":"?"}]}"#;
        let parsed: ErrorResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.errors[0].code, ErrorCode::Unknown);
    }

    #[test]
    fn null_code_maps_to_unknown() {
        let body = r#"{"errors":[{"code":null,"message":"?"}]}"#;
        let parsed: ErrorResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.errors[0].code, ErrorCode::Unknown);
    }

    #[test]
    fn empty_envelope_parses() {
        let parsed: ErrorResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.errors.is_empty());
    }

    #[test]
    fn preserves_error_order() {
        let body = r#"{"errors":[{"code":"BLOB_UNKNOWN","message":"a"},{"code":"NAME_INVALID","message":"b"}]}"#;
        let parsed: ErrorResponse = serde_json::from_str(body).unwrap();
        let codes: Vec<ErrorCode> = parsed.errors.iter().map(|e| e.code).collect();
        assert_eq!(codes, vec![ErrorCode::BlobUnknown, ErrorCode::NameInvalid]);
    }

    #[test]
    fn code_serializes_to_wire_string() {
        let err = ApiError {
            code: ErrorCode::BlobUploadInvalid,
            message: "x".to_string(),
            detail: None,
        };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "BLOB_UPLOAD_INVALID");
    }
}
