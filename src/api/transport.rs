//! Transport seam between the access layer and the network.
//!
//! Operations build a plain `ApiRequest`; a `Transport` turns it into an HTTP
//! exchange. `HttpTransport` is the reqwest-backed implementation used in
//! production. Tests substitute a recording mock.

use std::time::Duration;

use reqwest::{multipart, Client, Method};
use serde_json::Value;

use super::error::ApiError;

/// A fully described outbound request. Each call builds its own.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Absolute URL including any query string.
    pub url: String,
    /// Bearer token to attach. `Some("")` still sends the header.
    pub bearer: Option<String>,
    pub body: RequestBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Multipart(Vec<FormField>),
}

/// One multipart form field.
#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub name: String,
    pub value: FormValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    Text(String),
    File {
        bytes: Vec<u8>,
        file_name: String,
        mime_type: String,
    },
}

impl FormField {
    pub fn text(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            value: FormValue::Text(value.into()),
        }
    }
}

/// Raw result of a completed exchange, before the body is parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Mirrors the transport "ok" flag: any 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait abstracting the network exchange for testability.
///
/// Returns `Err` only when no response was obtained; HTTP error statuses are
/// ordinary responses.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn send(&self, request: ApiRequest) -> Result<TransportResponse, ApiError>;
}

/// reqwest-backed transport.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build a transport with request and connect timeouts.
    pub fn new(timeout: Duration, connect_timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()?;
        Ok(Self { client })
    }

    /// Wrap an existing reqwest client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl HttpTransport {
    /// Turn an `ApiRequest` into the reqwest request put on the wire.
    ///
    /// `Some("")` bearer yields `Authorization: Bearer ` rather than no header.
    pub fn build(&self, request: ApiRequest) -> Result<reqwest::Request, ApiError> {
        let mut builder = self.client.request(request.method, &request.url);

        if let Some(ref token) = request.bearer {
            builder = builder.bearer_auth(token);
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(fields) => builder.multipart(build_form(fields)?),
        };

        Ok(builder.build()?)
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<TransportResponse, ApiError> {
        log::debug!("{} {}", request.method, request.url);

        let request = self.build(request)?;
        let resp = self.client.execute(request).await?;
        let status = resp.status().as_u16();
        let body = resp.bytes().await?;

        Ok(TransportResponse {
            status,
            body: body.to_vec(),
        })
    }
}

fn build_form(fields: Vec<FormField>) -> Result<multipart::Form, ApiError> {
    let mut form = multipart::Form::new();
    for field in fields {
        form = match field.value {
            FormValue::Text(text) => form.text(field.name, text),
            FormValue::File {
                bytes,
                file_name,
                mime_type,
            } => {
                let part = multipart::Part::bytes(bytes)
                    .file_name(file_name)
                    .mime_str(&mime_type)
                    .map_err(|e| {
                        ApiError::InvalidRequest(format!("Invalid MIME type {}: {}", mime_type, e))
                    })?;
                form.part(field.name, part)
            }
        };
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_range() {
        let resp = |status| TransportResponse {
            status,
            body: Vec::new(),
        };
        assert!(resp(200).is_success());
        assert!(resp(201).is_success());
        assert!(resp(299).is_success());
        assert!(!resp(199).is_success());
        assert!(!resp(301).is_success());
        assert!(!resp(401).is_success());
        assert!(!resp(500).is_success());
    }

    #[test]
    fn test_build_form_rejects_bad_mime() {
        let fields = vec![FormField {
            name: "photo".to_string(),
            value: FormValue::File {
                bytes: vec![1, 2, 3],
                file_name: "a.jpg".to_string(),
                mime_type: "not a mime".to_string(),
            },
        }];
        let err = build_form(fields).unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
    }

    #[test]
    fn test_build_form_accepts_text_and_file() {
        let fields = vec![
            FormField::text("description", "hello"),
            FormField {
                name: "photo".to_string(),
                value: FormValue::File {
                    bytes: vec![1, 2, 3],
                    file_name: "a.png".to_string(),
                    mime_type: "image/png".to_string(),
                },
            },
        ];
        let form = build_form(fields).unwrap();
        assert!(!form.boundary().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let transport =
            HttpTransport::new(Duration::from_secs(2), Duration::from_secs(1)).unwrap();
        let request = ApiRequest {
            method: Method::GET,
            url: "http://127.0.0.1:1/stories".to_string(),
            bearer: Some(String::new()),
            body: RequestBody::Empty,
        };
        let err = transport.send(request).await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }

    // ── Wire encoding ────────────────────────────────────────────────────

    fn transport() -> HttpTransport {
        HttpTransport::new(Duration::from_secs(5), Duration::from_secs(2)).unwrap()
    }

    /// Accept one connection, capture the raw request, answer with `reply`.
    async fn capture_one(reply: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);
                if request_complete(&raw) {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                reply.len(),
                reply
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            let _ = stream.shutdown().await;
            String::from_utf8_lossy(&raw).into_owned()
        });
        (base, server)
    }

    fn request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw);
        let Some(split) = text.find("\r\n\r\n") else {
            return false;
        };
        let head = text[..split].to_ascii_lowercase();
        let body_len = text.len() - split - 4;
        if let Some(line) = head.lines().find(|l| l.starts_with("content-length:")) {
            let expected: usize = line["content-length:".len()..].trim().parse().unwrap();
            return body_len >= expected;
        }
        if head.contains("transfer-encoding: chunked") {
            return text.ends_with("0\r\n\r\n");
        }
        true
    }

    #[test]
    fn test_build_empty_bearer_header() {
        let request = transport()
            .build(ApiRequest {
                method: Method::GET,
                url: "http://localhost:3000/users/me".to_string(),
                bearer: Some(String::new()),
                body: RequestBody::Empty,
            })
            .unwrap();
        let auth = request.headers().get(reqwest::header::AUTHORIZATION).unwrap();
        assert_eq!(auth.as_bytes(), b"Bearer ");
        assert!(request.body().is_none());
    }

    #[test]
    fn test_build_json_without_bearer() {
        let request = transport()
            .build(ApiRequest {
                method: Method::POST,
                url: "http://localhost:3000/login".to_string(),
                bearer: None,
                body: RequestBody::Json(serde_json::json!({"email": "a@b.c", "password": "pw"})),
            })
            .unwrap();
        assert!(request.headers().get(reqwest::header::AUTHORIZATION).is_none());
        assert_eq!(
            request.headers().get(reqwest::header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        let sent: Value = serde_json::from_slice(body).unwrap();
        assert_eq!(sent, serde_json::json!({"email": "a@b.c", "password": "pw"}));
    }

    #[tokio::test]
    async fn test_wire_get_with_empty_bearer() {
        let (base, server) = capture_one(r#"{"listStory":[]}"#).await;
        let resp = transport()
            .send(ApiRequest {
                method: Method::GET,
                url: format!("{}/stories?page=2&size=10&location=1", base),
                bearer: Some(String::new()),
                body: RequestBody::Empty,
            })
            .await
            .unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body, br#"{"listStory":[]}"#.to_vec());

        let raw = server.await.unwrap().to_ascii_lowercase();
        assert!(raw.starts_with("get /stories?page=2&size=10&location=1 http/1.1\r\n"));
        assert!(raw.contains("\r\nauthorization: bearer \r\n"), "{}", raw);
    }

    #[tokio::test]
    async fn test_wire_delete_json_with_bearer() {
        let (base, server) = capture_one("{}").await;
        transport()
            .send(ApiRequest {
                method: Method::DELETE,
                url: format!("{}/notifications/subscribe", base),
                bearer: Some("tok-9".to_string()),
                body: RequestBody::Json(serde_json::json!({"endpoint": "https://push.test/e"})),
            })
            .await
            .unwrap();

        let raw = server.await.unwrap();
        let lower = raw.to_ascii_lowercase();
        assert!(lower.starts_with("delete /notifications/subscribe http/1.1\r\n"));
        assert!(lower.contains("\r\nauthorization: bearer tok-9\r\n"));
        assert!(lower.contains("\r\ncontent-type: application/json\r\n"));
        assert!(raw.ends_with(r#"{"endpoint":"https://push.test/e"}"#));
    }

    #[tokio::test]
    async fn test_wire_multipart_fields() {
        let (base, server) = capture_one(r#"{"error":false}"#).await;
        transport()
            .send(ApiRequest {
                method: Method::POST,
                url: format!("{}/stories", base),
                bearer: Some("tok-9".to_string()),
                body: RequestBody::Multipart(vec![
                    FormField::text("description", "Flooded road"),
                    FormField {
                        name: "photo".to_string(),
                        value: FormValue::File {
                            bytes: b"PNGDATA".to_vec(),
                            file_name: "road.png".to_string(),
                            mime_type: "image/png".to_string(),
                        },
                    },
                ]),
            })
            .await
            .unwrap();

        let raw = server.await.unwrap();
        let lower = raw.to_ascii_lowercase();
        assert!(lower.contains("\r\ncontent-type: multipart/form-data; boundary="));
        assert!(raw.contains("name=\"description\"\r\n\r\nFlooded road\r\n"));
        assert!(raw.contains("name=\"photo\"; filename=\"road.png\""));
        assert!(lower.contains("content-type: image/png\r\n\r\npngdata\r\n"));
        assert!(!raw.contains("name=\"lat\""));
        assert!(!raw.contains("name=\"lon\""));
    }
}
