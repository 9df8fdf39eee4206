//! Account operations: registration, login and the current user profile.

use super::client::{json_body, ApiClient};
use super::error::ApiError;
use super::normalize::{self, NormalizedResult, PassthroughResult};
use super::operation::Operation;
use super::transport::{RequestBody, Transport};
use super::types::Credentials;

/// Register a new account.
///
/// POST /register with `{name, email, password}`. The server's fields come
/// back as-is with `ok` from the transport status. Transport and decode
/// failures are returned as `Err`.
pub async fn register<T: Transport>(
    client: &ApiClient<T>,
    credentials: &Credentials,
) -> Result<PassthroughResult, ApiError> {
    let op = Operation::Register;
    let body = json_body(&credentials.register_body())?;
    let request = client.request(op, client.endpoints().url(op), body);
    let exchange = client.propagated(op, request).await?;
    Ok(normalize::passthrough(exchange))
}

/// Log in with email and password.
///
/// POST /login with `{email, password}`. Never fails: transport and decode
/// errors come back as `ok: false` with the error text as `message`.
pub async fn login<T: Transport>(
    client: &ApiClient<T>,
    credentials: &Credentials,
) -> NormalizedResult {
    let op = Operation::Login;
    let request = json_body(&credentials.login_body())
        .map(|body| client.request(op, client.endpoints().url(op), body));
    client.captured(op, request, normalize::login).await
}

/// Fetch the authenticated user's profile.
///
/// GET /users/me with bearer auth. Failures are returned as `Err`.
pub async fn my_user_info<T: Transport>(
    client: &ApiClient<T>,
) -> Result<PassthroughResult, ApiError> {
    let op = Operation::MyUserInfo;
    let request = client.request(op, client.endpoints().url(op), RequestBody::Empty);
    let exchange = client.propagated(op, request).await?;
    Ok(normalize::passthrough(exchange))
}
