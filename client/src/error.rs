use serde_json::Value;
use station_protocol::GraphqlError;
use thiserror::Error;

/// Errors from the GraphQL transport.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network request failed before a response arrived.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx response that was not a GraphQL envelope.
    #[error("unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    /// The server answered with a GraphQL `errors` array. `data` holds the
    /// partial result when the server sent one.
    #[error("{}", join_messages(.errors))]
    Graphql {
        errors: Vec<GraphqlError>,
        data: Option<Value>,
    },

    /// Response body or `data` payload did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),
}

impl ClientError {
    /// Network failures and non-GraphQL HTTP errors. These are surfaced to
    /// users as a generic "try again later".
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Status { .. })
    }

    /// The structured GraphQL error list, when the server sent one.
    pub fn graphql_errors(&self) -> Option<&[GraphqlError]> {
        match self {
            Self::Graphql { errors, .. } => Some(errors),
            _ => None,
        }
    }

    /// True for GraphQL errors that came with a partial `data` payload.
    pub fn has_partial_data(&self) -> bool {
        matches!(self, Self::Graphql { data: Some(data), .. } if !data.is_null())
    }
}

fn join_messages(errors: &[GraphqlError]) -> String {
    if errors.is_empty() {
        return "GraphQL request failed".to_string();
    }
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn graphql_error_displays_all_messages() {
        let err = ClientError::Graphql {
            errors: vec![GraphqlError::new("not found"), GraphqlError::new("denied")],
            data: None,
        };

        assert_eq!(err.to_string(), "not found; denied");
        assert!(!err.is_transport());
        assert!(!err.has_partial_data());
    }

    #[test]
    fn null_data_is_not_partial() {
        let err = ClientError::Graphql {
            errors: vec![GraphqlError::new("boom")],
            data: Some(Value::Null),
        };
        assert!(!err.has_partial_data());
    }

    #[test]
    fn status_errors_are_transport_errors() {
        let err = ClientError::Status {
            status: 502,
            body: "bad gateway".to_string(),
        };
        assert!(err.is_transport());
        assert_eq!(err.graphql_errors(), None);
    }
}
