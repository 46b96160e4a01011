//! REST adapter for the CMS content and comment stores.

use async_trait::async_trait;
use reqwest::{
    Client, StatusCode, Url,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::application::repos::{CommentStore, ContentStore, RepoError};
use crate::config::ContentStoreSettings;
use crate::domain::ids::{CommentId, ContentId, NegativeIdPolicy, RawContentId};
use crate::domain::types::ContentStatus;

use super::cdn::user_agent;
use super::error::InfraError;

const ID_PLACEHOLDER: &str = "{id}";

/// Reads post status and comment parents from a WordPress-style REST API.
#[derive(Clone, Debug)]
pub struct RestContentStore {
    client: Client,
    base: Url,
    status_path: String,
    comment_path: String,
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    status: String,
}

#[derive(Debug, Deserialize)]
struct CommentBody {
    post: RawContentId,
}

impl RestContentStore {
    pub fn new(settings: &ContentStoreSettings) -> Result<Self, InfraError> {
        let mut headers = HeaderMap::new();
        if let Some(value) = settings.authorization.as_deref() {
            let mut value = HeaderValue::from_str(value).map_err(|err| {
                InfraError::configuration(format!("content_store.authorization: {err}"))
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .user_agent(user_agent())
            .default_headers(headers)
            .build()
            .map_err(|err| InfraError::http_client(err.to_string()))?;

        Ok(Self {
            client,
            base: settings.base_url.clone(),
            status_path: settings.status_path.clone(),
            comment_path: settings.comment_path.clone(),
        })
    }

    fn resolve(&self, template: &str, id: u64) -> Result<Url, RepoError> {
        let path = template.replace(ID_PLACEHOLDER, &id.to_string());
        self.base
            .join(&path)
            .map_err(|err| RepoError::from_request(format!("invalid lookup URL: {err}")))
    }

    /// GET `url` and decode it; `Ok(None)` on 404.
    async fn fetch<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>, RepoError> {
        debug!(url = %url, "Querying content store");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(RepoError::from_request)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(RepoError::unavailable(format!(
                "content store returned status {status}"
            )));
        }

        response
            .json::<T>()
            .await
            .map(Some)
            .map_err(|err| RepoError::invalid_response(err.to_string()))
    }
}

#[async_trait]
impl ContentStore for RestContentStore {
    async fn status(&self, id: ContentId) -> Result<Option<ContentStatus>, RepoError> {
        let url = self.resolve(&self.status_path, id.get())?;
        let body = self.fetch::<StatusBody>(url).await?;
        Ok(body.map(|body| ContentStatus::parse(&body.status)))
    }
}

#[async_trait]
impl CommentStore for RestContentStore {
    async fn parent_content_id(&self, comment_id: CommentId) -> Result<ContentId, RepoError> {
        let url = self.resolve(&self.comment_path, comment_id.get())?;
        let body = self
            .fetch::<CommentBody>(url)
            .await?
            .ok_or(RepoError::NotFound)?;

        ContentId::from_raw(&body.post, NegativeIdPolicy::Reject)
            .map_err(|err| RepoError::invalid_response(err.to_string()))
    }
}
