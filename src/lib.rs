//! Docker Registry HTTP API v2 client library
//!
//! This crate issues HTTP requests against an OCI/Docker-compatible registry
//! (catalog and tag listings, manifest get/put/delete, blob get/delete) and
//! parses the responses into typed models. Transport concerns such as
//! connection pooling, TLS and redirects are delegated to reqwest; the
//! library itself performs no retries, caching or concurrent requests.
//!
//! ```no_run
//! use docker_registry_client::{RegistryClient, Manifest};
//!
//! # async fn example() -> docker_registry_client::Result<()> {
//! let client = RegistryClient::builder("https://registry.example.com")
//!     .with_basic_auth("user", "secret")
//!     .build()?;
//!
//! let tags = client.get_tags("library/python", None).await?;
//! let manifest = client.get_manifest("library/python", "latest").await?;
//! if let Manifest::DockerV2(image) = &manifest {
//!     println!("{} layers, {} bytes", image.layers.len(), image.total_size());
//! }
//! # Ok(())
//! # }
//! ```

pub mod digest;
pub mod error;
pub mod models;
pub mod registry;

pub use digest::Digest;
pub use error::{RegistryError, Result};
pub use models::{
    ApiError, Catalog, Descriptor, ErrorCode, ErrorResponse, ImageManifest, Manifest,
    ManifestList, PageLink, Pagination, Platform, PlatformDescriptor, ResponseHeaders, Tags,
};
pub use registry::{RegistryAuth, RegistryClient, RegistryClientBuilder};
