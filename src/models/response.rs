//! Response header envelope
//!
//! The registry communicates a fair amount through headers rather than
//! bodies: the canonical digest of a manifest (`Docker-Content-Digest`), the
//! negotiated manifest media type (`Content-Type`), and pagination
//! (`Link: <...?n=10&last=python>; rel="next"`). This module parses the
//! headers this crate cares about into typed values.

use reqwest::header::{HeaderMap, CONTENT_LENGTH, CONTENT_TYPE, LINK};
use url::Url;

use crate::digest::Digest;
use crate::error::{RegistryError, Result};

pub const DOCKER_CONTENT_DIGEST: &str = "docker-content-digest";

/// Pagination query parameters for catalog and tag listings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pagination {
    /// Maximum number of entries to return (the `n` query parameter).
    pub n: Option<u32>,
    /// Entry to resume after (the `last` query parameter).
    pub last: Option<String>,
}

impl Pagination {
    pub fn size(n: u32) -> Self {
        Self {
            n: Some(n),
            last: None,
        }
    }

    pub fn with_last(mut self, last: impl Into<String>) -> Self {
        self.last = Some(last.into());
        self
    }

    pub(crate) fn query(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(n) = self.n {
            params.push(("n", n.to_string()));
        }
        if let Some(last) = &self.last {
            params.push(("last", last.clone()));
        }
        params
    }
}

/// Pagination target extracted from a `Link` response header.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLink {
    pub n: u32,
    pub last: String,
}

impl PageLink {
    /// Parse `<uri>; rel="next"` into its `n` and `last` query parameters.
    /// Returns None when the header does not carry both.
    fn parse(value: &str) -> Option<Self> {
        let start = value.find('<')?;
        let end = value[start..].find('>')? + start;
        let uri = &value[start + 1..end];

        // The URI may be relative; give it a dummy base so Url can parse it.
        let url = Url::parse(uri)
            .or_else(|_| Url::parse("http://registry.invalid")?.join(uri))
            .ok()?;

        let mut n = None;
        let mut last = None;
        for (key, val) in url.query_pairs() {
            match key.as_ref() {
                "n" => n = val.parse().ok(),
                "last" => last = Some(val.into_owned()),
                _ => {}
            }
        }
        Some(PageLink {
            n: n?,
            last: last?,
        })
    }

    /// The pagination parameters to request the next page.
    pub fn next_page(&self) -> Pagination {
        Pagination::size(self.n).with_last(self.last.clone())
    }
}

/// The registry response headers this crate interprets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseHeaders {
    pub content_type: Option<String>,
    pub docker_content_digest: Option<Digest>,
    pub content_length: Option<u64>,
    pub link: Option<PageLink>,
}

impl ResponseHeaders {
    /// Parse the headers of a registry response.
    ///
    /// A malformed `Docker-Content-Digest` is a hard validation error; the
    /// other headers are best-effort.
    pub fn parse(headers: &HeaderMap) -> Result<Self> {
        let docker_content_digest = headers
            .get(DOCKER_CONTENT_DIGEST)
            .map(|value| {
                let raw = value.to_str().map_err(|_| {
                    RegistryError::Validation(
                        "Docker-Content-Digest header is not valid UTF-8".to_string(),
                    )
                })?;
                Digest::parse(raw)
            })
            .transpose()?;

        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let content_length = headers
            .get(CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse().ok());

        let link = headers
            .get(LINK)
            .and_then(|value| value.to_str().ok())
            .and_then(PageLink::parse);

        Ok(Self {
            content_type,
            docker_content_digest,
            content_length,
            link,
        })
    }
}
