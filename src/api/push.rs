//! Web push subscription management.
//!
//! Responses are returned exactly as the backend sent them, without the
//! `NormalizedResult` wrapper. Failures are returned as `Err`.

use serde_json::Value;

use super::client::{json_body, ApiClient};
use super::error::ApiError;
use super::operation::Operation;
use super::transport::Transport;
use super::types::{PushSubscription, UnsubscribeRequest};

/// POST /notifications/subscribe with `{endpoint, keys: {p256dh, auth}}`.
pub async fn subscribe_push_notification<T: Transport>(
    client: &ApiClient<T>,
    subscription: &PushSubscription,
) -> Result<Value, ApiError> {
    let op = Operation::SubscribePush;
    let body = json_body(subscription)?;
    let request = client.request(op, client.endpoints().url(op), body);
    Ok(client.propagated(op, request).await?.body)
}

/// DELETE /notifications/subscribe with `{endpoint}`.
pub async fn unsubscribe_push_notification<T: Transport>(
    client: &ApiClient<T>,
    endpoint: &str,
) -> Result<Value, ApiError> {
    let op = Operation::UnsubscribePush;
    let body = json_body(&UnsubscribeRequest { endpoint })?;
    let request = client.request(op, client.endpoints().url(op), body);
    Ok(client.propagated(op, request).await?.body)
}
