//! Catalog listing model (`GET /v2/_catalog`)

use serde::{Deserialize, Serialize};

/// Repository names known to the registry, in server order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Catalog {
    #[serde(default, deserialize_with = "crate::models::null_to_default")]
    pub repositories: Vec<String>,
}
