//! Tag listing model (`GET /v2/<name>/tags/list`)

use serde::{Deserialize, Serialize};

/// Tags of one repository, in server order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Tags {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "crate::models::null_to_default")]
    pub tags: Vec<String>,
}
