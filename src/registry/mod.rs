//! Registry client for Docker Registry HTTP API v2 interactions
//!
//! This module provides the client and credential types for talking to an
//! OCI/Docker-compatible registry over HTTP.

pub mod auth;
pub mod client;

pub use auth::RegistryAuth;
pub use client::{RegistryClient, RegistryClientBuilder};
