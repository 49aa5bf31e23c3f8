//! HTTP transport for the infrastructure GraphQL API.
//!
//! One configured [`GraphqlClient`] issues every query and mutation to a
//! single endpoint with a bearer credential. Failures are never retried;
//! the first error is handed back to the caller as a [`ClientError`].
//!
//! [`LoaderClient`] reads the server-computed snapshots exposed by
//! `station-server`, used to hydrate caches before the first render.

mod error;
mod graphql;
mod loader;

pub use error::ClientError;
pub use graphql::{DEFAULT_ENDPOINT, GraphqlClient, GraphqlClientBuilder};
pub use loader::LoaderClient;

/// Result alias for transport operations.
pub type ClientResult<T> = Result<T, ClientError>;
