//! Remote access layer for the story backend.
//!
//! Builds authenticated requests, encodes JSON and multipart payloads, and
//! reshapes backend responses into `NormalizedResult`.

pub mod account;
pub mod auth;
pub mod client;
pub mod error;
pub mod normalize;
pub mod operation;
pub mod push;
pub mod stories;
pub mod token;
pub mod transport;
pub mod types;


pub use account::{login, my_user_info, register};
pub use client::ApiClient;
pub use error::ApiError;
pub use normalize::{NormalizedResult, PassthroughResult};
pub use push::{subscribe_push_notification, unsubscribe_push_notification};
pub use stories::{get_all_reports, store_new_report};
pub use token::{StaticToken, TokenProvider};
pub use transport::{HttpTransport, Transport};
