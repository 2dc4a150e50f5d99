//! reqwest-backed `DeviceService`.

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Annotation, Device, DeviceId},
    protocol::{NewAnnotationRequest, UpdateDeviceRequest},
};
use tracing::{debug, warn};
use url::Url;

use crate::{error::ServiceError, DeviceService};

/// Every request carries `Content-Type: application/json` and, when the API
/// key is non-empty, `Authorization: Bearer {api_key}`. An empty key sends
/// no `Authorization` header at all.
pub struct HttpDeviceService {
    http: Client,
    base_url: String,
    api_key: String,
}

impl HttpDeviceService {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url, api_key)
    }

    pub fn with_client(
        http: Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Appends percent-encoded `segments` to the base url, keeping any path
    /// prefix the base already carries.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ServiceError> {
        let invalid = |message: String| ServiceError::InvalidUrl {
            url: self.base_url.clone(),
            message,
        };

        let mut url = Url::parse(self.base_url.trim()).map_err(|err| invalid(err.to_string()))?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| invalid("url cannot be a base".to_string()))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self
            .http
            .request(method, url)
            .header(CONTENT_TYPE, "application/json");
        if self.api_key.is_empty() {
            builder
        } else {
            builder.bearer_auth(&self.api_key)
        }
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        method: &Method,
        url: &Url,
    ) -> Result<T, ServiceError> {
        debug!(%method, %url, "device service request");

        let response = builder.send().await.map_err(|err| ServiceError::Transport {
            url: url.to_string(),
            message: err.to_string(),
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|err| ServiceError::Transport {
            url: url.to_string(),
            message: format!("failed to read response body: {err}"),
        })?;

        if !status.is_success() {
            warn!(%method, %url, status = status.as_u16(), "device service request failed");
            return Err(ServiceError::Service {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                body,
            });
        }

        debug!(%method, %url, status = status.as_u16(), "device service response");
        serde_json::from_str(&body).map_err(|err| ServiceError::Decode {
            status: status.as_u16(),
            message: err.to_string(),
        })
    }
}

#[async_trait]
impl DeviceService for HttpDeviceService {
    async fn get_device(&self, name: &str) -> Result<Device, ServiceError> {
        let url = self.endpoint(&["devices", name])?;
        let builder = self.request(Method::GET, url.clone());
        self.execute(builder, &Method::GET, &url).await
    }

    async fn create_annotation(
        &self,
        device_id: &DeviceId,
        request: &NewAnnotationRequest,
    ) -> Result<Annotation, ServiceError> {
        let url = self.endpoint(&["devices", device_id.as_str(), "annotations"])?;
        let builder = self.request(Method::POST, url.clone()).json(request);
        self.execute(builder, &Method::POST, &url).await
    }

    async fn update_device(
        &self,
        device_id: &DeviceId,
        request: &UpdateDeviceRequest,
    ) -> Result<Device, ServiceError> {
        let url = self.endpoint(&["devices", device_id.as_str()])?;
        let builder = self.request(Method::PUT, url.clone()).json(request);
        self.execute(builder, &Method::PUT, &url).await
    }
}

#[cfg(test)]
#[path = "tests/http_tests.rs"]
mod tests;
