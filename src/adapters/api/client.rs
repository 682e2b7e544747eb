use super::dto::PageDto;
use crate::domain::{FieldErrors, Page};
use crate::ports::{RepositoryError, RepositoryResult};
use reqwest::{multipart::Form, Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Resource endpoints, relative to the API base url.
pub mod endpoints {
    pub const TASKS: &str = "/tasks/";
    pub const TASK_PREVIEWS: &str = "/tasks/previews/";
    pub const TASK_MEMBERS: &str = "/tasks/members/";
    pub const TASK_FILES: &str = "/tasks/files/";
    pub const TASK_SKILLS: &str = "/tasks/skills/";
    pub const PROJECTS: &str = "/projects/";
    pub const CURRENT_USER: &str = "/users/current/";
}

#[derive(Clone)]
pub struct BluebottleClient {
    client: Client,
    base_url: String,
    api_token: Option<String>,
}

impl BluebottleClient {
    pub fn new(base_url: impl Into<String>, api_token: Option<String>) -> RepositoryResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("bluebottle-tasks/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RepositoryError::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> RepositoryResult<Response> {
        self.authorize(request)
            .send()
            .await
            .map_err(|e| RepositoryError::Network(e.to_string()))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> RepositoryResult<T> {
        self.get_url(&self.url(path)).await
    }

    async fn get_url<T: DeserializeOwned>(&self, url: &str) -> RepositoryResult<T> {
        let response = self.send(self.client.get(url)).await?;
        self.handle_response(response).await
    }

    /// Fetches one page of a paged collection.
    pub async fn get_page<T: DeserializeOwned>(&self, path: &str) -> RepositoryResult<Page<T>> {
        let page: PageDto<T> = self.get(path).await?;
        Ok(Page {
            items: page.results,
            total: page.count,
        })
    }

    /// Fetches every page of a collection by following the `next` links.
    pub async fn get_list<T: DeserializeOwned>(&self, path: &str) -> RepositoryResult<Vec<T>> {
        let mut page: PageDto<T> = self.get(path).await?;
        let total = page.count;
        let mut items = Vec::with_capacity(total as usize);

        loop {
            let fetched = page.results.len();
            items.extend(page.results);

            let next = match page.next {
                Some(next) if fetched > 0 && (items.len() as u64) < total => next,
                _ => break,
            };
            tracing::debug!("Fetching next page {} ({}/{})", next, items.len(), total);
            page = self.get_url(&next).await?;
        }

        if (items.len() as u64) < total {
            tracing::warn!("{} returned {} of {} items", path, items.len(), total);
        }
        Ok(items)
    }

    pub async fn post<T: DeserializeOwned, R: serde::Serialize>(
        &self,
        path: &str,
        body: &R,
    ) -> RepositoryResult<T> {
        let response = self.send(self.client.post(self.url(path)).json(body)).await?;
        self.handle_response(response).await
    }

    pub async fn put<T: DeserializeOwned, R: serde::Serialize>(
        &self,
        path: &str,
        body: &R,
    ) -> RepositoryResult<T> {
        let response = self.send(self.client.put(self.url(path)).json(body)).await?;
        self.handle_response(response).await
    }

    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
    ) -> RepositoryResult<T> {
        let response = self
            .send(self.client.post(self.url(path)).multipart(form))
            .await?;
        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> RepositoryResult<T> {
        let status = response.status();

        match status.as_u16() {
            200..=299 => {
                let response_text = response
                    .text()
                    .await
                    .map_err(|e| RepositoryError::Network(e.to_string()))?;

                tracing::debug!("API Response: {}", response_text);

                serde_json::from_str(&response_text).map_err(|e| {
                    RepositoryError::Serialization(format!(
                        "Failed to parse response: {}. Response was: {}",
                        e, response_text
                    ))
                })
            }
            400 => {
                let body = response.text().await.unwrap_or_default();
                Err(RepositoryError::Validation(parse_field_errors(&body)))
            }
            401 | 403 => Err(RepositoryError::Authentication(
                "Invalid or missing API token".to_string(),
            )),
            404 => Err(RepositoryError::NotFound("Resource not found".to_string())),
            429 => {
                // Extract retry-after header if available
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60);
                Err(RepositoryError::RateLimit(retry_after))
            }
            _ => {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                Err(RepositoryError::Api(format!("HTTP {}: {}", status, error_text)))
            }
        }
    }
}

/// Reads a 400 body of the form `{"field": ["message", ...]}`. Bodies that
/// are not an object end up under `non_field_errors`.
pub fn parse_field_errors(body: &str) -> FieldErrors {
    let mut errors = FieldErrors::new();

    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(fields)) => {
            for (field, value) in fields {
                match value {
                    serde_json::Value::Array(messages) => {
                        for message in messages {
                            match message {
                                serde_json::Value::String(text) => errors.add(field.clone(), text),
                                other => errors.add(field.clone(), other.to_string()),
                            }
                        }
                    }
                    serde_json::Value::String(text) => errors.add(field, text),
                    other => errors.add(field, other.to_string()),
                }
            }
        }
        _ => errors.add("non_field_errors", body.trim()),
    }

    errors
}
