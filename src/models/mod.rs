//! Response body models for the Docker Registry HTTP API v2
//!
//! Every model is a passive value object deserialized once from a response
//! body (or headers) and handed to the caller. Optional fields that real
//! registries serialize as `null` fall back to their defaults instead of
//! failing, matching the behavior of the reference registries.

pub mod catalog;
pub mod errors;
pub mod manifest;
pub mod response;
pub mod tags;

pub use catalog::Catalog;
pub use errors::{ApiError, ErrorCode, ErrorResponse};
pub use manifest::{
    Descriptor, ImageManifest, Manifest, ManifestList, Platform, PlatformDescriptor,
};
pub use response::{PageLink, Pagination, ResponseHeaders};
pub use tags::Tags;

use serde::{Deserialize, Deserializer};

/// Deserialize a field that may be `null` into its default value.
pub(crate) fn null_to_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    let value = Option::<T>::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}
