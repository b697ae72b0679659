//! Backend API client
//!
//! Public endpoints (galleries, settings, single photo) need no session.
//! Dashboard endpoints send the session token as a bearer token.

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::models::{
    ClientConfig, Collection, MessageResponse, PhotoRecord, PhotoSummary, PhotoUploadRequest,
    SessionExchange, SimpleUploadRequest, SiteSettings, UploadReceipt, UserProfile,
};
use crate::utils::error::{AppError, AppResult};

/// Header carrying the identity provider's one-time session id.
pub const SESSION_ID_HEADER: &str = "X-Session-ID";

/// Anything that can produce the current photo list of one gallery.
#[async_trait]
pub trait PhotoSource: Send + Sync {
    async fn fetch(&self) -> AppResult<Vec<PhotoRecord>>;
}

/// HTTP client for the showcase backend.
pub struct ShowcaseClient {
    base_url: String,
    timeout: Duration,
    token: RwLock<Option<String>>,
    http: reqwest::Client,
}

impl ShowcaseClient {
    pub fn new(base_url: &str, timeout: Duration) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            token: RwLock::new(None),
            http,
        })
    }

    pub fn from_config(config: &ClientConfig) -> AppResult<Self> {
        Self::new(config.base_url(), config.fetch_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Attach or clear the session token used for dashboard calls.
    pub fn set_token(&self, token: Option<String>) {
        if let Ok(mut slot) = self.token.write() {
            *slot = token;
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.read().map(|t| t.is_some()).unwrap_or(false)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// URL of one item below `parent`. The id is percent-encoded as a single
    /// path segment, so `/`, `?` and `#` stay part of it.
    fn item_url(&self, parent: &str, id: &str) -> AppResult<Url> {
        let mut url = Url::parse(&self.url(parent))
            .map_err(|e| AppError::Config(format!("invalid backend URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| AppError::Config(format!("backend URL cannot take a path: {}", self.base_url)))?
            .push(id);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> AppResult<RequestBuilder> {
        let token = self
            .token
            .read()
            .ok()
            .and_then(|t| t.clone())
            .ok_or(AppError::Unauthorized)?;
        Ok(request.bearer_auth(token))
    }

    async fn send(&self, request: RequestBuilder) -> AppResult<Response> {
        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        check_status(response).await
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> AppResult<T> {
        let response = self.send(request).await?;
        let body = response.bytes().await.map_err(|e| self.transport_error(e))?;
        Ok(serde_json::from_slice(&body)?)
    }

    fn transport_error(&self, err: reqwest::Error) -> AppError {
        if err.is_timeout() {
            AppError::Timeout(self.timeout)
        } else {
            AppError::from(err)
        }
    }

    /// Current photo list of a collection, validated.
    pub async fn fetch_collection(&self, collection: Collection) -> AppResult<Vec<PhotoRecord>> {
        let records: Vec<PhotoRecord> = self
            .send_json(self.http.get(self.url(collection.endpoint())))
            .await?;
        PhotoRecord::validate_collection(records)
    }

    pub async fn get_photo(&self, photo_id: &str) -> AppResult<PhotoRecord> {
        let url = self.item_url(Collection::GuestPhotos.item_endpoint(), photo_id)?;
        self.send_json(self.http.get(url)).await
    }

    /// Photos uploaded by the signed-in photographer, without image data.
    pub async fn list_own_photos(&self) -> AppResult<Vec<PhotoSummary>> {
        let request = self.authorized(self.http.get(self.url("/api/photos/list")))?;
        self.send_json(request).await
    }

    pub async fn get_settings(&self) -> AppResult<SiteSettings> {
        self.send_json(self.http.get(self.url("/api/settings"))).await
    }

    pub async fn save_settings(&self, settings: &SiteSettings) -> AppResult<()> {
        let settings = settings.normalized();
        settings.validate()?;

        let request = self.authorized(self.http.post(self.url("/api/settings")).json(&settings))?;
        let _: MessageResponse = self.send_json(request).await?;
        Ok(())
    }

    /// Trade the identity provider's session id for a session token.
    pub async fn exchange_session(&self, session_id: &str) -> AppResult<SessionExchange> {
        let request = self
            .http
            .post(self.url("/api/auth/session"))
            .header(SESSION_ID_HEADER, session_id);
        self.send_json(request).await
    }

    pub async fn current_user(&self) -> AppResult<UserProfile> {
        let request = self.authorized(self.http.get(self.url("/api/auth/me")))?;
        self.send_json(request).await
    }

    pub async fn logout(&self) -> AppResult<()> {
        let request = self.authorized(self.http.post(self.url("/api/auth/logout")))?;
        let _: MessageResponse = self.send_json(request).await?;
        Ok(())
    }

    pub async fn upload_photo(&self, upload: &PhotoUploadRequest) -> AppResult<UploadReceipt> {
        let path = Collection::GuestPhotos.upload_endpoint();
        let request = self.authorized(self.http.post(self.url(path)).json(upload))?;
        self.send_json(request).await
    }

    pub async fn upload_wall_photo(&self, upload: &SimpleUploadRequest) -> AppResult<UploadReceipt> {
        let path = Collection::WallPhotos.upload_endpoint();
        let request = self.authorized(self.http.post(self.url(path)).json(upload))?;
        self.send_json(request).await
    }

    pub async fn upload_background_image(
        &self,
        upload: &SimpleUploadRequest,
    ) -> AppResult<UploadReceipt> {
        let path = Collection::BackgroundImages.upload_endpoint();
        let request = self.authorized(self.http.post(self.url(path)).json(upload))?;
        self.send_json(request).await
    }

    pub async fn delete_from(&self, collection: Collection, photo_id: &str) -> AppResult<()> {
        let url = self.item_url(collection.item_endpoint(), photo_id)?;
        let request = self.authorized(self.http.delete(url))?;
        let _: MessageResponse = self.send_json(request).await?;
        Ok(())
    }
}

/// Map a non-success status to an error, keeping FastAPI's `detail` text.
async fn check_status(response: Response) -> AppResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = extract_detail(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    });

    Err(match status {
        StatusCode::UNAUTHORIZED => AppError::Unauthorized,
        StatusCode::FORBIDDEN => AppError::Forbidden(message),
        StatusCode::NOT_FOUND => AppError::NotFound(message),
        _ => AppError::Server {
            status: status.as_u16(),
            message,
        },
    })
}

fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(detail) => Some(detail.clone()),
        other => Some(other.to_string()),
    }
}

/// One collection of one backend, as a [`PhotoSource`].
#[derive(Clone)]
pub struct CollectionSource {
    client: Arc<ShowcaseClient>,
    collection: Collection,
}

impl CollectionSource {
    pub fn new(client: Arc<ShowcaseClient>, collection: Collection) -> Self {
        Self { client, collection }
    }
}

#[async_trait]
impl PhotoSource for CollectionSource {
    async fn fetch(&self) -> AppResult<Vec<PhotoRecord>> {
        self.client.fetch_collection(self.collection).await
    }
}
