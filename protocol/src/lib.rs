//! Wire types for the infrastructure GraphQL API.
//!
//! Every operation the console issues is a fixed pair of request/response
//! records implementing [`Operation`]; nothing is typed at runtime.
//!
//! - [`envelope`]: the `{query, variables}` request and `{data, errors}`
//!   response envelopes shared by every operation.
//! - [`model`]: remote-owned entities (projects, services, environments).
//! - [`pagination`]: cursor connections (`edges` + `pageInfo`).
//! - [`operations`]: the six named documents and their variables/data.

pub mod envelope;
pub mod model;
pub mod operations;
pub mod pagination;

pub use envelope::{GraphqlError, GraphqlRequest, GraphqlResponse, Operation, OperationKind};
pub use model::{Environment, Project, ProjectDetail, Service, Team};
pub use pagination::{Connection, Edge, PageInfo};
