//! HTTP content store
//!
//! Implements [`content_core::ContentStore`] against the remote data API:
//!
//! - `GET  /v{version}/data/doc/{dataset}/{id}` to fetch a document
//! - `POST /v{version}/data/actions/{dataset}` to perform a state transition
//! - `POST /v{version}/data/mutate/{dataset}` to create or patch a document

pub mod client;
pub mod wire;

pub use client::HttpStore;
pub use wire::Endpoints;
