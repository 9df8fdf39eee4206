//! Per-operation request table.
//!
//! Each backend operation declares its method, path, whether it needs bearer
//! auth, and how failures are handled. `Capture` operations never return an
//! error to the caller; they fold failures into a `NormalizedResult` carrying
//! the operation's empty default. `Propagate` operations return `Err`.

use reqwest::Method;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Register,
    Login,
    MyUserInfo,
    ListReports,
    StoreReport,
    SubscribePush,
    UnsubscribePush,
}

/// How a failed exchange (transport or decode) is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    Capture,
    Propagate,
}

impl Operation {
    pub const ALL: [Operation; 7] = [
        Operation::Register,
        Operation::Login,
        Operation::MyUserInfo,
        Operation::ListReports,
        Operation::StoreReport,
        Operation::SubscribePush,
        Operation::UnsubscribePush,
    ];

    pub fn method(self) -> Method {
        match self {
            Operation::Register
            | Operation::Login
            | Operation::StoreReport
            | Operation::SubscribePush => Method::POST,
            Operation::MyUserInfo | Operation::ListReports => Method::GET,
            Operation::UnsubscribePush => Method::DELETE,
        }
    }

    /// Path relative to the base URL.
    pub fn path(self) -> &'static str {
        match self {
            Operation::Register => "/register",
            Operation::Login => "/login",
            Operation::MyUserInfo => "/users/me",
            Operation::ListReports | Operation::StoreReport => "/stories",
            Operation::SubscribePush | Operation::UnsubscribePush => "/notifications/subscribe",
        }
    }

    pub fn requires_auth(self) -> bool {
        !matches!(self, Operation::Register | Operation::Login)
    }

    pub fn failure_policy(self) -> FailurePolicy {
        match self {
            Operation::Login | Operation::ListReports | Operation::StoreReport => {
                FailurePolicy::Capture
            }
            Operation::Register
            | Operation::MyUserInfo
            | Operation::SubscribePush
            | Operation::UnsubscribePush => FailurePolicy::Propagate,
        }
    }

    /// `data` value reported when a captured failure occurs.
    pub fn empty_data(self) -> Value {
        match self {
            Operation::ListReports => Value::Array(Vec::new()),
            _ => Value::Null,
        }
    }

    /// Label used in log lines.
    pub fn label(self) -> &'static str {
        match self {
            Operation::Register => "register",
            Operation::Login => "Login",
            Operation::MyUserInfo => "getMyUserInfo",
            Operation::ListReports => "getAllReports",
            Operation::StoreReport => "storeNewReport",
            Operation::SubscribePush => "subscribePushNotification",
            Operation::UnsubscribePush => "unsubscribePushNotification",
        }
    }
}

/// Endpoint URLs resolved once against the configured base address.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoints {
    base_url: String,
}

impl Endpoints {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, op: Operation) -> String {
        format!("{}{}", self.base_url, op.path())
    }

    /// URL with an encoded query string appended. No `?` when `pairs` is empty.
    pub fn url_with_query(&self, op: Operation, pairs: &[(&str, String)]) -> String {
        let url = self.url(op);
        if pairs.is_empty() {
            return url;
        }
        let query = pairs
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", url, query)
    }
}
