use reqwest::StatusCode;
use reqwest::header::{
    ACCESS_CONTROL_ALLOW_ORIGIN, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT,
};
use station_protocol::{GraphqlRequest, GraphqlResponse, Operation};
use url::Url;

use crate::{ClientError, ClientResult};

/// Public GraphQL endpoint of the infrastructure API.
pub const DEFAULT_ENDPOINT: &str = "https://backboard.railway.app/graphql/v2";

/// Bodies of non-GraphQL error responses are truncated to this many bytes
/// before they end up in an error message.
const MAX_ERROR_BODY: usize = 512;

/// Configured handle for issuing GraphQL requests to one endpoint.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct GraphqlClient {
    http: reqwest::Client,
    endpoint: Url,
    headers: HeaderMap,
}

/// Builder for [`GraphqlClient`].
#[derive(Debug, Clone)]
pub struct GraphqlClientBuilder {
    endpoint: String,
    token: Option<String>,
    cors_header: bool,
    http: Option<reqwest::Client>,
}

impl Default for GraphqlClientBuilder {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            token: None,
            cors_header: false,
            http: None,
        }
    }
}

impl GraphqlClientBuilder {
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Bearer token sent as `Authorization: Bearer <token>`.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn maybe_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// Attach `Access-Control-Allow-Origin: *` to outgoing requests. Only
    /// wanted when the client runs on behalf of a browser page.
    pub fn with_cors_header(mut self, enabled: bool) -> Self {
        self.cors_header = enabled;
        self
    }

    /// Use a preconfigured HTTP client (custom timeouts, proxies, tests).
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    pub fn build(self) -> ClientResult<GraphqlClient> {
        let endpoint = Url::parse(&self.endpoint)
            .map_err(|e| ClientError::InvalidConfig(format!("endpoint {}: {e}", self.endpoint)))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("station/", env!("CARGO_PKG_VERSION"))),
        );

        match self.token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => {
                let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                    .map_err(|_| ClientError::InvalidConfig("invalid token".to_string()))?;
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
            _ => {
                tracing::warn!("no API token configured; requests to {endpoint} are unauthenticated");
            }
        }

        if self.cors_header {
            headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        }

        Ok(GraphqlClient {
            http: self.http.unwrap_or_default(),
            endpoint,
            headers,
        })
    }
}

impl GraphqlClient {
    pub fn builder() -> GraphqlClientBuilder {
        GraphqlClientBuilder::default()
    }

    /// Client for `endpoint` authenticated with `token`.
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>) -> ClientResult<Self> {
        Self::builder().endpoint(endpoint).token(token).build()
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Issue a typed operation and decode its `data` payload.
    pub async fn request<O: Operation>(&self, variables: &O::Variables) -> ClientResult<O::Data> {
        let request = GraphqlRequest::for_operation::<O>(variables)
            .map_err(|e| ClientError::Decode(format!("{} variables: {e}", O::NAME)))?;

        let response = self.raw_request(&request).await?;
        let data = response
            .data
            .ok_or_else(|| ClientError::Decode(format!("{}: response has no data", O::NAME)))?;

        serde_json::from_value(data).map_err(|e| ClientError::Decode(format!("{}: {e}", O::NAME)))
    }

    /// Forward an untyped request and return the whole envelope.
    ///
    /// An envelope carrying `errors` is returned as [`ClientError::Graphql`]
    /// together with any partial `data`.
    pub async fn raw_request(&self, request: &GraphqlRequest) -> ClientResult<GraphqlResponse> {
        let operation = request.operation_name.as_deref().unwrap_or("anonymous");
        tracing::debug!(operation, endpoint = %self.endpoint, "graphql request");

        let response = self
            .http
            .post(self.endpoint.clone())
            .headers(self.headers.clone())
            .json(request)
            .send()
            .await
            .inspect_err(|e| tracing::warn!(operation, "graphql transport failure: {e}"))?;

        let status = response.status();
        let body = response.bytes().await?;
        let envelope = decode_envelope(status, &body)?;

        if envelope.has_errors() {
            let GraphqlResponse { data, errors } = envelope;
            let errors = errors.unwrap_or_default();
            tracing::warn!(
                operation,
                count = errors.len(),
                "graphql errors: {}",
                errors
                    .iter()
                    .map(|e| e.message.as_str())
                    .collect::<Vec<_>>()
                    .join("; ")
            );
            return Err(ClientError::Graphql { errors, data });
        }

        Ok(envelope)
    }
}

/// Interpret a response body.
///
/// Non-2xx responses count as GraphQL errors only when the body is an
/// envelope; anything else is a transport error.
fn decode_envelope(status: StatusCode, body: &[u8]) -> ClientResult<GraphqlResponse> {
    let parsed = serde_json::from_slice::<GraphqlResponse>(body);

    if !status.is_success() {
        return match parsed {
            Ok(envelope) if envelope.has_errors() => Ok(envelope),
            _ => Err(ClientError::Status {
                status: status.as_u16(),
                body: truncate_body(body),
            }),
        };
    }

    match parsed {
        Ok(envelope) if envelope.is_envelope() => Ok(envelope),
        Ok(_) => Err(ClientError::Decode(
            "response is not a GraphQL envelope".to_string(),
        )),
        Err(e) => Err(ClientError::Decode(e.to_string())),
    }
}

fn truncate_body(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    match text.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}
