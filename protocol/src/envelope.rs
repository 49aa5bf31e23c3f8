//! Request/response envelopes for GraphQL over HTTP.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Whether a document reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Query,
    Mutation,
}

/// A named, parameterized GraphQL document with statically known
/// variable and response shapes.
pub trait Operation {
    /// Operation name as it appears in the document (`query ListProjects`).
    const NAME: &'static str;
    const KIND: OperationKind;
    /// Full document text sent as `query`.
    const DOCUMENT: &'static str;

    type Variables: Serialize + Send + Sync;
    type Data: DeserializeOwned + Send + Sync + 'static;
}

/// Body of a GraphQL POST.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphqlRequest {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<Value>,
    #[serde(
        rename = "operationName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub operation_name: Option<String>,
}

impl GraphqlRequest {
    /// Build an untyped request from raw document text.
    pub fn new(query: impl Into<String>, variables: Option<Value>) -> Self {
        Self {
            query: query.into(),
            variables,
            operation_name: None,
        }
    }

    /// Build the request for a typed operation.
    ///
    /// Operations without variables (`Variables = ()`) omit the field.
    pub fn for_operation<O: Operation>(variables: &O::Variables) -> serde_json::Result<Self> {
        let variables = match serde_json::to_value(variables)? {
            Value::Null => None,
            value => Some(value),
        };
        Ok(Self {
            query: O::DOCUMENT.to_string(),
            variables,
            operation_name: Some(O::NAME.to_string()),
        })
    }
}

/// A single entry of the `errors` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphqlError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

impl GraphqlError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: None,
            extensions: None,
        }
    }
}

/// Body of a GraphQL response: `{data}` or `{data, errors}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphqlResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<GraphqlError>>,
}

impl GraphqlResponse {
    /// Errors reported by the server, if any. An empty array counts as none.
    pub fn errors(&self) -> &[GraphqlError] {
        self.errors.as_deref().unwrap_or_default()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors().is_empty()
    }

    /// A response carrying neither `data` nor `errors` is not a GraphQL
    /// envelope at all (for example a proxy error page decoded as `{}`).
    pub fn is_envelope(&self) -> bool {
        self.data.is_some() || self.errors.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::{DeleteProject, IdVariables, ListProjects, ListProjectsVariables};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn operation_request_carries_name_and_variables() {
        let req = GraphqlRequest::for_operation::<DeleteProject>(&IdVariables::new("p1"))
            .unwrap_or_else(|e| panic!("serialize: {e}"));

        assert_eq!(req.operation_name.as_deref(), Some("DeleteProject"));
        assert_eq!(req.variables, Some(json!({ "id": "p1" })));
        assert!(req.query.contains("projectDelete(id: $id)"));
    }

    #[test]
    fn empty_list_variables_serialize_as_empty_object() {
        let req = GraphqlRequest::for_operation::<ListProjects>(&ListProjectsVariables::default())
            .unwrap_or_else(|e| panic!("serialize: {e}"));

        assert_eq!(req.variables, Some(json!({})));
    }

    #[test]
    fn response_with_null_errors_has_no_errors() {
        let resp: GraphqlResponse =
            serde_json::from_value(json!({ "data": { "ok": true }, "errors": null }))
                .unwrap_or_else(|e| panic!("decode: {e}"));

        assert!(!resp.has_errors());
        assert!(resp.is_envelope());
    }

    #[test]
    fn non_envelope_object_is_detected() {
        let resp: GraphqlResponse = serde_json::from_value(json!({ "message": "bad gateway" }))
            .unwrap_or_else(|e| panic!("decode: {e}"));

        assert!(!resp.is_envelope());
    }

    #[test]
    fn serialized_response_omits_absent_errors() {
        let resp = GraphqlResponse {
            data: Some(json!({ "projectDelete": true })),
            errors: None,
        };

        assert_eq!(
            serde_json::to_value(&resp).unwrap_or_default(),
            json!({ "data": { "projectDelete": true } })
        );
    }
}
