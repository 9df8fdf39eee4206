//! API client context with bearer injection and the shared exchange helper.
//!
//! `ApiClient` holds the resolved endpoints, the transport and the token
//! provider. It is built once and passed to every operation.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use super::error::ApiError;
use super::normalize::{Exchange, NormalizedResult};
use super::operation::{Endpoints, FailurePolicy, Operation};
use super::token::TokenProvider;
use super::transport::{ApiRequest, HttpTransport, RequestBody, Transport};
use crate::config::ClientConfig;

/// Client context for the story backend.
pub struct ApiClient<T = HttpTransport> {
    transport: T,
    endpoints: Endpoints,
    tokens: Arc<dyn TokenProvider>,
}

impl ApiClient<HttpTransport> {
    /// Create a reqwest-backed client from configuration.
    pub fn from_config(
        config: &ClientConfig,
        tokens: Arc<dyn TokenProvider>,
    ) -> Result<Self, ApiError> {
        let transport = HttpTransport::new(config.timeout, config.connect_timeout)?;
        Ok(Self::new(&config.base_url, transport, tokens))
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn new(base_url: &str, transport: T, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            transport,
            endpoints: Endpoints::new(base_url),
            tokens,
        }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Build the request for `op`, attaching bearer auth when the operation
    /// requires it. A missing token is sent as an empty bearer value.
    pub fn request(&self, op: Operation, url: String, body: RequestBody) -> ApiRequest {
        let bearer = if op.requires_auth() {
            Some(self.tokens.access_token().unwrap_or_default())
        } else {
            None
        };
        ApiRequest {
            method: op.method(),
            url,
            bearer,
            body,
        }
    }

    /// Issue a request and parse the response body as JSON.
    pub async fn exchange(&self, request: ApiRequest) -> Result<Exchange, ApiError> {
        let resp = self.transport.send(request).await?;
        let ok = resp.is_success();
        let body: Value = serde_json::from_slice(&resp.body)?;
        Ok(Exchange {
            status: resp.status,
            ok,
            body,
        })
    }

    /// Issue `request` for a `Capture` operation and shape it with `map`.
    ///
    /// Any failure, whether raised before the request is issued, by the
    /// transport, or by the mapper reading the body, is folded into a
    /// `NormalizedResult` with the operation's empty data.
    pub(crate) async fn captured(
        &self,
        op: Operation,
        request: Result<ApiRequest, ApiError>,
        map: fn(Exchange) -> Result<NormalizedResult, ApiError>,
    ) -> NormalizedResult {
        debug_assert_eq!(op.failure_policy(), FailurePolicy::Capture);
        let outcome = match request {
            Ok(request) => self.exchange(request).await.and_then(map),
            Err(e) => Err(e),
        };
        outcome.unwrap_or_else(|e| {
            log::error!("{} error: {}", op.label(), e);
            NormalizedResult::failure(op, e.to_string())
        })
    }

    /// Issue `request` for a `Propagate` operation; failures return `Err`.
    pub(crate) async fn propagated(
        &self,
        op: Operation,
        request: ApiRequest,
    ) -> Result<Exchange, ApiError> {
        debug_assert_eq!(op.failure_policy(), FailurePolicy::Propagate);
        self.exchange(request).await
    }
}

/// Serialize a request payload into a JSON body.
pub fn json_body<B: Serialize>(body: &B) -> Result<RequestBody, ApiError> {
    let value = serde_json::to_value(body)
        .map_err(|e| ApiError::InvalidRequest(format!("Failed to encode request body: {}", e)))?;
    Ok(RequestBody::Json(value))
}
