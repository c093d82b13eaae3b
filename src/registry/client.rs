//! Registry client for the Docker Registry HTTP API v2
//!
//! `RegistryClient` translates high-level operations (catalog and tag
//! listings, manifest get/put/delete, blob get/delete) into HTTP calls
//! against a registry, attaches the configured credentials, and maps
//! responses into typed models or typed errors. Every operation is a single
//! request/response pair; there is no retry, caching or upload session
//! handling here.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use tracing::{debug, trace};
use url::Url;

use crate::digest::Digest;
use crate::error::{RegistryError, Result};
use crate::models::manifest::media_types;
use crate::models::{Catalog, ErrorResponse, Manifest, PageLink, Pagination, ResponseHeaders, Tags};
use crate::registry::auth::RegistryAuth;

pub struct RegistryClientBuilder {
    base_url: String,
    auth: RegistryAuth,
    timeout: Option<Duration>,
    skip_tls_verify: bool,
}

impl RegistryClientBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth: RegistryAuth::Anonymous,
            timeout: None,
            skip_tls_verify: false,
        }
    }

    pub fn with_auth(mut self, auth: RegistryAuth) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_basic_auth(
        self,
        user_id: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.with_auth(RegistryAuth::basic(user_id, password))
    }

    pub fn with_bearer_token(self, token: impl Into<String>) -> Self {
        self.with_auth(RegistryAuth::bearer(token))
    }

    /// Per-request timeout, passed through to the HTTP transport.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Accept invalid TLS certificates. Only for registries with
    /// self-signed certificates on trusted networks.
    pub fn with_skip_tls_verify(mut self, skip: bool) -> Self {
        self.skip_tls_verify = skip;
        self
    }

    pub fn build(self) -> Result<RegistryClient> {
        let url = Url::parse(&self.base_url)?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(RegistryError::Configuration(format!(
                "unsupported registry URL scheme '{}'",
                url.scheme()
            )));
        }
        if let RegistryAuth::Basic { user_id, password } = &self.auth {
            if user_id.is_empty() || password.is_empty() {
                return Err(RegistryError::Configuration(
                    "basic auth credentials must not be empty".to_string(),
                ));
            }
        }

        let mut builder = Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if self.skip_tls_verify {
            builder = builder.danger_accept_invalid_certs(true);
        }
        let client = builder.build().map_err(RegistryError::Transport)?;

        Ok(RegistryClient {
            client,
            base_url: self.base_url.trim_end_matches('/').to_string(),
            auth: self.auth,
        })
    }
}

/// Client for one registry. Holds only immutable configuration; safe to
/// share across tasks.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    client: Client,
    base_url: String,
    auth: RegistryAuth,
}

impl RegistryClient {
    pub fn builder(base_url: impl Into<String>) -> RegistryClientBuilder {
        RegistryClientBuilder::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check that the registry speaks API v2 (`GET /v2/`).
    pub async fn check_version(&self) -> Result<()> {
        let url = format!("{}/v2/", self.base_url);
        debug!(%url, "checking registry API version");
        let response = self.request(Method::GET, &url).send().await?;
        self.expect_success(response).await?;
        Ok(())
    }

    /// List repositories (`GET /v2/_catalog`).
    pub async fn get_catalog(&self, pagination: Option<&Pagination>) -> Result<Catalog> {
        Ok(self.get_catalog_page(pagination).await?.0)
    }

    /// List repositories together with the next-page link, if the server
    /// truncated the result.
    pub async fn get_catalog_page(
        &self,
        pagination: Option<&Pagination>,
    ) -> Result<(Catalog, Option<PageLink>)> {
        let url = format!("{}/v2/_catalog", self.base_url);
        debug!(%url, "listing catalog");
        let mut request = self.request(Method::GET, &url);
        if let Some(pagination) = pagination {
            request = request.query(&pagination.query());
        }
        let response = self.expect_success(request.send().await?).await?;
        let link = ResponseHeaders::parse(response.headers())?.link;
        let catalog = serde_json::from_str(&response.text().await?)?;
        Ok((catalog, link))
    }

    /// List tags of a repository (`GET /v2/<name>/tags/list`).
    pub async fn get_tags(&self, name: &str, pagination: Option<&Pagination>) -> Result<Tags> {
        Ok(self.get_tags_page(name, pagination).await?.0)
    }

    /// List tags together with the next-page link, if any.
    pub async fn get_tags_page(
        &self,
        name: &str,
        pagination: Option<&Pagination>,
    ) -> Result<(Tags, Option<PageLink>)> {
        let url = format!("{}/v2/{}/tags/list", self.base_url, name);
        debug!(%url, "listing tags");
        let mut request = self.request(Method::GET, &url);
        if let Some(pagination) = pagination {
            request = request.query(&pagination.query());
        }
        let response = self.expect_success(request.send().await?).await?;
        let link = ResponseHeaders::parse(response.headers())?.link;
        let tags = serde_json::from_str(&response.text().await?)?;
        Ok((tags, link))
    }

    /// Fetch and parse a manifest (`GET /v2/<name>/manifests/<reference>`).
    ///
    /// The reference is a tag or a digest. The Accept header offers all four
    /// supported manifest media types so the server picks the best match.
    pub async fn get_manifest(&self, name: &str, reference: &str) -> Result<Manifest> {
        Ok(self.get_manifest_with_digest(name, reference).await?.0)
    }

    /// Fetch a manifest together with its canonical digest from the
    /// `Docker-Content-Digest` response header.
    pub async fn get_manifest_with_digest(
        &self,
        name: &str,
        reference: &str,
    ) -> Result<(Manifest, Option<Digest>)> {
        let url = format!("{}/v2/{}/manifests/{}", self.base_url, name, reference);
        debug!(%url, "fetching manifest");
        let response = self
            .request(Method::GET, &url)
            .header("Accept", media_types::ACCEPT_MANIFESTS)
            .send()
            .await?;
        let response = self.expect_success(response).await?;
        let digest = ResponseHeaders::parse(response.headers())?.docker_content_digest;
        let manifest = Manifest::from_slice(&response.bytes().await?)?;
        trace!(media_type = manifest.media_type(), "parsed manifest");
        Ok((manifest, digest))
    }

    /// Upload a manifest (`PUT /v2/<name>/manifests/<reference>`) and return
    /// the digest the registry assigned to it.
    pub async fn put_manifest(
        &self,
        name: &str,
        reference: &str,
        manifest: &Manifest,
    ) -> Result<Digest> {
        let url = format!("{}/v2/{}/manifests/{}", self.base_url, name, reference);
        debug!(%url, media_type = manifest.media_type(), "uploading manifest");
        let response = self
            .request(Method::PUT, &url)
            .header("Content-Type", manifest.media_type())
            .body(manifest.to_vec()?)
            .send()
            .await?;
        let response = self.expect_success(response).await?;
        ResponseHeaders::parse(response.headers())?
            .docker_content_digest
            .ok_or_else(|| {
                RegistryError::Validation(
                    "registry did not return a Docker-Content-Digest header".to_string(),
                )
            })
    }

    /// Delete a manifest (`DELETE /v2/<name>/manifests/<reference>`).
    pub async fn delete_manifest(&self, name: &str, reference: &str) -> Result<()> {
        let url = format!("{}/v2/{}/manifests/{}", self.base_url, name, reference);
        debug!(%url, "deleting manifest");
        let response = self.request(Method::DELETE, &url).send().await?;
        self.expect_success(response).await?;
        Ok(())
    }

    /// Check whether a manifest exists (`HEAD /v2/<name>/manifests/<reference>`).
    pub async fn manifest_exists(&self, name: &str, reference: &str) -> Result<bool> {
        let url = format!("{}/v2/{}/manifests/{}", self.base_url, name, reference);
        let response = self
            .request(Method::HEAD, &url)
            .header("Accept", media_types::ACCEPT_MANIFESTS)
            .send()
            .await?;
        self.exists_from_status(response).await
    }

    /// Download a blob (`GET /v2/<name>/blobs/<digest>`).
    ///
    /// For sha256 digests the downloaded content is re-hashed and compared
    /// against the requested digest; a mismatch is a validation error.
    pub async fn get_blob(&self, name: &str, digest: &Digest) -> Result<Vec<u8>> {
        let url = format!("{}/v2/{}/blobs/{}", self.base_url, name, digest);
        debug!(%url, "fetching blob");
        let response = self.request(Method::GET, &url).send().await?;
        let response = self.expect_success(response).await?;
        let data = response.bytes().await?.to_vec();

        if digest.algorithm() == "sha256" {
            let actual = Digest::sha256_of(&data);
            if actual != *digest {
                return Err(RegistryError::Validation(format!(
                    "blob digest mismatch: expected {}, got {}",
                    digest, actual
                )));
            }
        }
        Ok(data)
    }

    /// Check whether a blob exists (`HEAD /v2/<name>/blobs/<digest>`).
    pub async fn blob_exists(&self, name: &str, digest: &Digest) -> Result<bool> {
        let url = format!("{}/v2/{}/blobs/{}", self.base_url, name, digest);
        let response = self.request(Method::HEAD, &url).send().await?;
        self.exists_from_status(response).await
    }

    /// Delete a blob (`DELETE /v2/<name>/blobs/<digest>`).
    pub async fn delete_blob(&self, name: &str, digest: &Digest) -> Result<()> {
        let url = format!("{}/v2/{}/blobs/{}", self.base_url, name, digest);
        debug!(%url, "deleting blob");
        let response = self.request(Method::DELETE, &url).send().await?;
        self.expect_success(response).await?;
        Ok(())
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.auth.apply(self.client.request(method, url))
    }

    /// Pass 2xx responses through; turn anything else into a typed error.
    async fn expect_success(&self, response: Response) -> Result<Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        Err(Self::error_from_response(response).await)
    }

    /// Map a HEAD response status to existence.
    async fn exists_from_status(&self, response: Response) -> Result<bool> {
        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            _ => Err(Self::error_from_response(response).await),
        }
    }

    /// Build the typed error for a non-2xx response: parse the body as the
    /// registry error envelope when possible, otherwise keep it raw.
    async fn error_from_response(response: Response) -> RegistryError {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "failed to read error response".to_string());

        match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(parsed) if !parsed.errors.is_empty() => {
                debug!(%status, codes = ?parsed.errors.iter().map(|e| e.code.as_wire_str()).collect::<Vec<_>>(), "registry error");
                RegistryError::Api {
                    status,
                    errors: parsed.errors,
                }
            }
            _ => {
                debug!(%status, "non-registry error body");
                RegistryError::Http { status, body }
            }
        }
    }
}
