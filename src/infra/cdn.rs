//! HTTP client for a Fastly-style surrogate-key purge API.

use async_trait::async_trait;
use reqwest::{
    Client, StatusCode, Url,
    header::{HeaderMap, HeaderName, HeaderValue},
};
use tracing::debug;

use crate::application::cdn::{PurgeApiError, SurrogatePurger};
use crate::config::CdnSettings;
use crate::purge::SurrogateKey;

use super::error::InfraError;

const SOFT_PURGE_HEADER: &str = "fastly-soft-purge";
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Purges keys with `POST {api_base}/service/{service_id}/purge/{key}`.
#[derive(Clone, Debug)]
pub struct HttpPurger {
    client: Client,
    service_url: Url,
}

impl HttpPurger {
    pub fn new(settings: &CdnSettings) -> Result<Self, InfraError> {
        let mut headers = HeaderMap::new();

        let name = HeaderName::from_bytes(settings.auth_header.as_bytes())
            .map_err(|err| InfraError::configuration(format!("cdn.auth_header: {err}")))?;
        let mut token = HeaderValue::from_str(&settings.api_token)
            .map_err(|err| InfraError::configuration(format!("cdn.api_token: {err}")))?;
        token.set_sensitive(true);
        headers.insert(name, token);

        if settings.soft_purge {
            headers.insert(SOFT_PURGE_HEADER, HeaderValue::from_static("1"));
        }

        let client = Client::builder()
            .user_agent(user_agent())
            .default_headers(headers)
            .build()
            .map_err(|err| InfraError::http_client(err.to_string()))?;

        let mut service_url = settings.api_base.clone();
        service_url
            .path_segments_mut()
            .map_err(|()| InfraError::configuration("cdn.api_base cannot be a base URL"))?
            .pop_if_empty()
            .extend(["service", settings.service_id.as_str()]);

        Ok(Self {
            client,
            service_url,
        })
    }

    /// Endpoint that purges `key`.
    pub fn purge_url(&self, key: &SurrogateKey) -> Url {
        let mut url = self.service_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.extend(["purge", key.as_str()]);
        }
        url
    }
}

#[async_trait]
impl SurrogatePurger for HttpPurger {
    async fn purge_surrogate_key(&self, key: &SurrogateKey) -> Result<(), PurgeApiError> {
        let url = self.purge_url(key);
        debug!(url = %url, "Sending surrogate key purge");

        let response = self
            .client
            .post(url)
            .send()
            .await
            .map_err(PurgeApiError::transport)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(PurgeApiError::Unauthorized {
                status: status.as_u16(),
            }),
            StatusCode::TOO_MANY_REQUESTS => Err(PurgeApiError::RateLimited),
            _ => {
                let body = response.text().await.unwrap_or_default();
                Err(PurgeApiError::Rejected {
                    status: status.as_u16(),
                    body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
                })
            }
        }
    }
}

pub(crate) fn user_agent() -> &'static str {
    concat!("purgewire/", env!("CARGO_PKG_VERSION"))
}
