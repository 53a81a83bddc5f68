//! HTTP client for the remote entity API

use crate::error::{ClientError, ClientResult};
use crate::store::{EntityStore, Relations, ResourceDeleter};
use async_trait::async_trait;
use http::StatusCode;
use pizza_admin_core::config::ApiConfig;
use pizza_admin_core::{Entity, EntityId, EntityKind};
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Longest error body kept in a [`ClientError::Status`]
const MAX_ERROR_BODY: usize = 512;

/// API client for the entity REST endpoints
///
/// Paths follow `/{entities}` and `/{entities}/{id}` below the base URL, with
/// relation expansion requested as repeated `relations` query pairs.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
}

/// Collection bodies arrive bare or wrapped in a paging envelope
#[derive(Deserialize)]
#[serde(untagged)]
enum ListBody<E> {
    Bare(Vec<E>),
    Paged { data: Vec<E> },
}

impl<E> ListBody<E> {
    fn into_records(self) -> Vec<E> {
        match self {
            Self::Bare(records) | Self::Paged { data: records } => records,
        }
    }
}

impl ApiClient {
    /// Create a new API client with default transport settings
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidBaseUrl`] if `base_url` cannot be parsed
    /// or cannot carry path segments.
    pub fn new(base_url: &str) -> ClientResult<Self> {
        Ok(Self {
            client: Client::new(),
            base_url: parse_base_url(base_url)?,
            api_key: None,
        })
    }

    /// Create a client from the `[api]` configuration section
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client cannot
    /// be built.
    pub fn from_config(config: &ApiConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: parse_base_url(&config.base_url)?,
            api_key: config.api_key.clone(),
        })
    }

    /// Set the API key for authentication
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Base URL the entity paths are appended to
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL of the collection of `kind`
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidBaseUrl`] if the base URL cannot carry paths.
    pub fn collection_url(&self, kind: EntityKind) -> ClientResult<Url> {
        self.url_with_segments(&[kind.path()])
    }

    /// URL of record `id` of `kind`
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidBaseUrl`] if the base URL cannot carry paths.
    pub fn record_url(&self, kind: EntityKind, id: &EntityId) -> ClientResult<Url> {
        self.url_with_segments(&[kind.path(), id.as_str()])
    }

    fn url_with_segments(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                message: "URL cannot be a base".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url, relations: &Relations) -> RequestBuilder {
        let mut request = self.client.request(method, url);

        if !relations.is_empty() {
            let pairs: Vec<(&str, &str)> = relations.iter().map(|r| ("relations", r)).collect();
            request = request.query(&pairs);
        }

        if let Some(ref api_key) = self.api_key {
            request = request.header(API_KEY_HEADER, api_key);
        }

        request
    }

    /// Send a request and return the successful response
    #[instrument(skip(self, request, id), fields(entity = %kind))]
    async fn execute(
        &self,
        request: RequestBuilder,
        kind: EntityKind,
        id: Option<&EntityId>,
    ) -> ClientResult<reqwest::Response> {
        let request = request.build()?;
        let method = request.method().clone();
        let url = request.url().clone();

        let response = self.client.execute(request).await?;
        let status = response.status();
        debug!(%method, %url, status = status.as_u16(), "entity API response");

        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::NOT_FOUND {
            if let Some(id) = id {
                return Err(ClientError::NotFound {
                    kind,
                    id: id.clone(),
                });
            }
        }

        let mut message = response.text().await.unwrap_or_default();
        if message.len() > MAX_ERROR_BODY {
            let mut cut = MAX_ERROR_BODY;
            while !message.is_char_boundary(cut) {
                cut -= 1;
            }
            message.truncate(cut);
        }
        if message.is_empty() {
            message = status.canonical_reason().unwrap_or("request failed").to_string();
        }
        warn!(%method, %url, status = status.as_u16(), "entity API returned an error");
        Err(ClientError::status(status, message))
    }

    async fn execute_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        kind: EntityKind,
        id: Option<&EntityId>,
    ) -> ClientResult<T> {
        let response = self.execute(request, kind, id).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

fn parse_base_url(base_url: &str) -> ClientResult<Url> {
    let url = Url::parse(base_url).map_err(|e| ClientError::InvalidBaseUrl {
        url: base_url.to_string(),
        message: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(ClientError::InvalidBaseUrl {
            url: base_url.to_string(),
            message: "URL cannot be a base".to_string(),
        });
    }
    Ok(url)
}

#[async_trait]
impl<E: Entity> EntityStore<E> for ApiClient {
    async fn list(&self, relations: &Relations) -> ClientResult<Vec<E>> {
        let url = self.collection_url(E::KIND)?;
        let request = self.request(Method::GET, url, relations);
        let body: ListBody<E> = self.execute_json(request, E::KIND, None).await?;
        Ok(body.into_records())
    }

    async fn get(&self, id: &EntityId, relations: &Relations) -> ClientResult<E> {
        let url = self.record_url(E::KIND, id)?;
        let request = self.request(Method::GET, url, relations);
        self.execute_json(request, E::KIND, Some(id)).await
    }

    async fn create(&self, draft: &E::Draft) -> ClientResult<E> {
        let url = self.collection_url(E::KIND)?;
        let request = self.request(Method::POST, url, &Relations::none()).json(draft);
        self.execute_json(request, E::KIND, None).await
    }

    async fn update(&self, id: &EntityId, draft: &E::Draft) -> ClientResult<E> {
        let url = self.record_url(E::KIND, id)?;
        let request = self.request(Method::PUT, url, &Relations::none()).json(draft);
        self.execute_json(request, E::KIND, Some(id)).await
    }

    async fn delete(&self, id: &EntityId) -> ClientResult<()> {
        self.delete_resource(E::KIND, id).await
    }
}

#[async_trait]
impl ResourceDeleter for ApiClient {
    async fn delete_resource(&self, kind: EntityKind, id: &EntityId) -> ClientResult<()> {
        let url = self.record_url(kind, id)?;
        let request = self.request(Method::DELETE, url, &Relations::none());
        self.execute(request, kind, Some(id)).await?;
        Ok(())
    }
}
