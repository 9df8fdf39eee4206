//! Request payload types for the story backend API.
//!
//! JSON bodies serialize with the exact field names the backend expects.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Account credentials. `name` is only sent on registration.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub name: Option<String>,
    pub email: String,
    pub password: String,
}

/// Register request body sent to POST /register.
#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
    pub email: &'a str,
    pub password: &'a str,
}

/// Login request body sent to POST /login.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

impl Credentials {
    pub fn register_body(&self) -> RegisterRequest<'_> {
        RegisterRequest {
            name: self.name.as_deref(),
            email: &self.email,
            password: &self.password,
        }
    }

    pub fn login_body(&self) -> LoginRequest<'_> {
        LoginRequest {
            email: &self.email,
            password: &self.password,
        }
    }
}

/// Filter and pagination parameters for GET /stories. All optional.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReportQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
    /// `Some(true)` asks only for stories carrying a location.
    pub location: Option<bool>,
}

impl ReportQuery {
    /// Query pairs in wire order: page, size, location.
    ///
    /// Zero page/size are treated as unset. `location` is only sent when
    /// explicitly given, as `1` or `0`.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page.filter(|p| *p != 0) {
            pairs.push(("page", page.to_string()));
        }
        if let Some(size) = self.size.filter(|s| *s != 0) {
            pairs.push(("size", size.to_string()));
        }
        if let Some(location) = self.location {
            pairs.push(("location", if location { "1" } else { "0" }.to_string()));
        }
        pairs
    }
}

/// Binary photo attached to a new report.
#[derive(Debug, Clone, PartialEq)]
pub struct Photo {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime_type: String,
}

impl Photo {
    pub fn new(bytes: Vec<u8>, file_name: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            file_name: file_name.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Read a photo from disk, inferring the MIME type from the extension.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "photo".to_string());
        let mime_type = mime_for_extension(path);
        Ok(Self {
            bytes,
            file_name,
            mime_type: mime_type.to_string(),
        })
    }
}

fn mime_for_extension(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

/// A new story report. The server assigns id and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReport {
    pub description: String,
    pub photo: Photo,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

/// Web push subscription as produced by the browser push manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushSubscription {
    pub endpoint: String,
    pub keys: PushKeys,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushKeys {
    pub p256dh: String,
    pub auth: String,
}

/// Unsubscribe request body sent to DELETE /notifications/subscribe.
#[derive(Debug, Serialize)]
pub struct UnsubscribeRequest<'a> {
    pub endpoint: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_query_pairs_full() {
        let query = ReportQuery {
            page: Some(2),
            size: Some(10),
            location: Some(true),
        };
        let pairs = query.to_pairs();
        assert_eq!(
            pairs,
            vec![
                ("page", "2".to_string()),
                ("size", "10".to_string()),
                ("location", "1".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_pairs_skip_zero_and_unset() {
        let query = ReportQuery {
            page: Some(0),
            size: None,
            location: None,
        };
        assert!(query.to_pairs().is_empty());
    }

    #[test]
    fn test_query_location_false_is_sent() {
        let query = ReportQuery {
            location: Some(false),
            ..Default::default()
        };
        assert_eq!(query.to_pairs(), vec![("location", "0".to_string())]);
    }

    #[test]
    fn test_register_body_omits_missing_name() {
        let creds = Credentials {
            name: None,
            email: "a@b.c".into(),
            password: "secret".into(),
        };
        let json = serde_json::to_value(creds.register_body()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"email": "a@b.c", "password": "secret"})
        );
    }

    #[test]
    fn test_login_body_omits_name() {
        let creds = Credentials {
            name: Some("Ann".into()),
            email: "a@b.c".into(),
            password: "secret".into(),
        };
        let json = serde_json::to_value(creds.login_body()).unwrap();
        assert_eq!(json, serde_json::json!({"email": "a@b.c", "password": "secret"}));
    }

    #[test]
    fn test_photo_from_path_infers_mime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Sunset.JPG");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(&[0xFF, 0xD8, 0xFF]).unwrap();

        let photo = Photo::from_path(&path).unwrap();
        assert_eq!(photo.file_name, "Sunset.JPG");
        assert_eq!(photo.mime_type, "image/jpeg");
        assert_eq!(photo.bytes, vec![0xFF, 0xD8, 0xFF]);
    }

    #[test]
    fn test_photo_unknown_extension_is_octet_stream() {
        assert_eq!(
            mime_for_extension(Path::new("scan.heic")),
            "application/octet-stream"
        );
        assert_eq!(mime_for_extension(Path::new("noext")), "application/octet-stream");
    }
}
