use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use station_client::ClientError;
use station_common::ConfigError;
use station_protocol::{GraphqlError, GraphqlResponse};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("upstream client: {0}")]
    Client(#[from] ClientError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failure of a single request, rendered as a GraphQL error envelope.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("malformed request body: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Upstream(#[from] ClientError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn errors(&self) -> Vec<GraphqlError> {
        match self {
            Self::Upstream(ClientError::Graphql { errors, .. }) if !errors.is_empty() => {
                errors.clone()
            }
            other => vec![GraphqlError::new(other.to_string())],
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = GraphqlResponse {
            data: None,
            errors: Some(self.errors()),
        };
        (self.status(), Json(body)).into_response()
    }
}
