use crate::config::EnvConfig;
use crate::models::{ProfileDocument, UploadKind};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// 401 from the backend; the session is gone and the user must log in again.
    Unauthorized,
    Network,
    Http,
    Parse,
}

#[derive(Clone, Debug, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl ApiError {
    fn network(e: reqwest::Error) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            message: e.to_string(),
        }
    }

    pub(crate) fn parse(e: impl std::fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Parse,
            message: e.to_string(),
        }
    }

    pub(crate) fn unauthorized() -> Self {
        Self {
            kind: ApiErrorKind::Unauthorized,
            message: "Unauthorized".to_string(),
        }
    }

    pub(crate) fn http(status: impl std::fmt::Display, body: String, ctx: &str) -> Self {
        Self {
            kind: ApiErrorKind::Http,
            message: format!("{ctx} ({status}): {body}"),
        }
    }

    /// Error for a non-success HTTP status. 401 means the session is gone.
    pub(crate) fn from_status(status: u16, body: String, ctx: &str) -> Self {
        match status {
            401 => Self::unauthorized(),
            _ => Self::http(status, body, ctx),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind == ApiErrorKind::Unauthorized
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Body of `POST /api/upload`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct UploadResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub thumb: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// List the backend appended to (`certificates`, ...) or `profile`.
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// A file picked in the admin panel, already read into memory.
#[derive(Clone, Debug, PartialEq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// The remote copy of the profile document.
///
/// `ApiClient` talks to the real backend; tests use an in-memory store.
#[allow(async_fn_in_trait)]
pub trait RemoteStore {
    /// Fetches the authoritative document. The caller swaps it in.
    async fn pull(&self) -> ApiResult<ProfileDocument>;

    /// Overwrites the remote document with `doc`.
    async fn push(&self, doc: &ProfileDocument) -> ApiResult<()>;

    /// Asks the backend to restore its default document. Does not touch the
    /// local copy; pull afterwards.
    async fn reset_remote(&self) -> ApiResult<()>;

    /// Sends an attachment. The backend appends the matching list entry itself.
    async fn upload(&self, kind: UploadKind, file: UploadFile) -> ApiResult<UploadResponse>;
}

pub(crate) fn parse_document(text: &str) -> ApiResult<ProfileDocument> {
    serde_json::from_str(text).map_err(ApiError::parse)
}

/// A 2xx upload body still fails when the backend reports `ok: false`.
pub(crate) fn parse_upload_response(text: &str) -> ApiResult<UploadResponse> {
    let body: UploadResponse = serde_json::from_str(text).map_err(ApiError::parse)?;
    if !body.ok {
        return Err(ApiError::http(
            "ok=false",
            body.error.unwrap_or_default(),
            "Upload error",
        ));
    }
    Ok(body)
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    pub(crate) config: EnvConfig,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(config: EnvConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(EnvConfig::new())
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    fn data_url(&self) -> String {
        self.config.url(&self.config.data_path)
    }

    fn upload_url(&self) -> String {
        self.config.url(&self.config.upload_path)
    }

    async fn check(res: reqwest::Response, ctx: &str) -> ApiResult<reqwest::Response> {
        if res.status().is_success() {
            return Ok(res);
        }
        let status = res.status().as_u16();
        let body = res.text().await.unwrap_or_default();
        Err(ApiError::from_status(status, body, ctx))
    }
}

impl RemoteStore for ApiClient {
    async fn pull(&self) -> ApiResult<ProfileDocument> {
        let res = self
            .http
            .get(self.data_url())
            .send()
            .await
            .map_err(ApiError::network)?;
        let res = Self::check(res, "Load failed").await?;
        let text = res.text().await.map_err(ApiError::network)?;
        let doc = parse_document(&text)?;
        tracing::debug!(bytes = text.len(), "pulled profile document");
        Ok(doc)
    }

    async fn push(&self, doc: &ProfileDocument) -> ApiResult<()> {
        let res = self
            .http
            .put(self.data_url())
            .json(doc)
            .send()
            .await
            .map_err(ApiError::network)?;
        Self::check(res, "Save failed").await?;
        Ok(())
    }

    async fn reset_remote(&self) -> ApiResult<()> {
        let res = self
            .http
            .delete(self.data_url())
            .send()
            .await
            .map_err(ApiError::network)?;
        Self::check(res, "Reset failed").await?;
        Ok(())
    }

    async fn upload(&self, kind: UploadKind, file: UploadFile) -> ApiResult<UploadResponse> {
        let part = reqwest::multipart::Part::bytes(file.bytes).file_name(file.file_name);
        let form = reqwest::multipart::Form::new()
            .text("kind", kind.as_ref().to_string())
            .part("file", part);

        let res = self
            .http
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await
            .map_err(ApiError::network)?;
        let res = Self::check(res, "Upload error").await?;
        let text = res.text().await.map_err(ApiError::network)?;
        parse_upload_response(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_response_contract_deserialize() {
        // Contract based on the backend: POST /api/upload
        let json = r#"{
            "ok": true,
            "url": "/static/uploads/x.png",
            "thumb": "/static/uploads/thumbs/x.png",
            "kind": "certificates"
        }"#;
        let parsed: UploadResponse = serde_json::from_str(json).expect("upload response should parse");
        assert!(parsed.ok);
        assert_eq!(parsed.url.as_deref(), Some("/static/uploads/x.png"));
        assert_eq!(parsed.kind.as_deref(), Some("certificates"));
        assert!(parsed.name.is_none());
    }

    #[test]
    fn test_upload_error_contract_deserialize() {
        let parsed: UploadResponse =
            serde_json::from_str(r#"{"ok": false, "error": "Invalid file"}"#).expect("should parse");
        assert!(!parsed.ok);
        assert_eq!(parsed.error.as_deref(), Some("Invalid file"));
    }

    #[test]
    fn test_api_error_display_and_kind() {
        let e = ApiError::http(500, "boom".to_string(), "Save failed");
        assert_eq!(e.kind, ApiErrorKind::Http);
        assert_eq!(e.to_string(), "Save failed (500): boom");
        assert!(ApiError::unauthorized().is_unauthorized());
        assert_eq!(ApiError::parse("eof").kind, ApiErrorKind::Parse);
    }

    #[test]
    fn test_error_status_mapping() {
        assert!(ApiError::from_status(401, "login required".to_string(), "Save failed").is_unauthorized());

        let server = ApiError::from_status(500, "boom".to_string(), "Save failed");
        assert_eq!(server.kind, ApiErrorKind::Http);
        assert_eq!(server.to_string(), "Save failed (500): boom");

        assert_eq!(
            ApiError::from_status(403, String::new(), "Upload error").kind,
            ApiErrorKind::Http
        );
    }

    #[test]
    fn test_upload_body_classification() {
        let ok = parse_upload_response(r#"{"ok": true, "url": "/static/uploads/x.png"}"#)
            .expect("ok body should pass");
        assert_eq!(ok.url.as_deref(), Some("/static/uploads/x.png"));

        let rejected = parse_upload_response(r#"{"ok": false, "error": "Invalid file"}"#)
            .expect_err("ok=false should fail");
        assert_eq!(rejected.kind, ApiErrorKind::Http);
        assert!(rejected.to_string().contains("Invalid file"));

        let garbled = parse_upload_response("<html>502</html>").expect_err("not json");
        assert_eq!(garbled.kind, ApiErrorKind::Parse);
    }

    #[test]
    fn test_unparseable_document_is_a_parse_error() {
        assert_eq!(
            parse_document("{\"skills\": ").expect_err("truncated").kind,
            ApiErrorKind::Parse
        );
        let doc = parse_document(r#"{"name": "Ada", "skills": ["rust"]}"#).expect("valid document");
        assert_eq!(doc.name, "Ada");
    }

    #[test]
    fn test_api_client_urls() {
        let client = ApiClient::new(EnvConfig::with_api_url("http://localhost:5000"));
        assert_eq!(client.data_url(), "http://localhost:5000/api/data");
        assert_eq!(client.upload_url(), "http://localhost:5000/api/upload");
        assert_eq!(client.config().login_path, "/admin/login");
    }
}
