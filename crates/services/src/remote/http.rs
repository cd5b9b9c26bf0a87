use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracker_core::model::{
    Chapter, ChapterId, ChapterPatch, Config, ConfigPatch, Subject, SubjectId,
};

use super::RemoteStore;
use crate::error::RemoteError;

/// REST client for a store served over HTTP.
#[derive(Clone, Debug)]
pub struct HttpRemoteStore {
    client: Client,
    base_url: Url,
}

#[derive(Serialize)]
struct NameBody<'a> {
    name: &'a str,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Deserialize)]
struct Ack {
    #[allow(dead_code)]
    success: bool,
}

impl HttpRemoteStore {
    /// # Errors
    ///
    /// Returns `RemoteError::InvalidUrl` if `base_url` is not an absolute URL.
    pub fn new(base_url: &str) -> Result<Self, RemoteError> {
        let base_url =
            Url::parse(base_url.trim()).map_err(|e| RemoteError::InvalidUrl(e.to_string()))?;
        Ok(Self {
            client: Client::new(),
            base_url,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.as_str().trim_end_matches('/'))
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, RemoteError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }
        let message = response.json::<ErrorBody>().await.ok().map(|b| b.error);
        Err(classify_failure(status, message))
    }
}

/// Map a non-success status, plus the server's `{error}` text if any.
fn classify_failure(status: StatusCode, message: Option<String>) -> RemoteError {
    match status {
        StatusCode::BAD_REQUEST => {
            RemoteError::Validation(message.unwrap_or_else(|| "Invalid request.".to_string()))
        }
        StatusCode::NOT_FOUND => {
            RemoteError::NotFound(message.unwrap_or_else(|| "Not found.".to_string()))
        }
        _ => RemoteError::HttpStatus(status),
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn list_subjects(&self) -> Result<Vec<Subject>, RemoteError> {
        let response = self.client.get(self.url("/subjects")).send().await?;
        Self::decode(response).await
    }

    async fn create_subject(&self, name: &str) -> Result<Subject, RemoteError> {
        let response = self
            .client
            .post(self.url("/subjects"))
            .json(&NameBody { name })
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn rename_subject(&self, id: SubjectId, name: &str) -> Result<Subject, RemoteError> {
        let response = self
            .client
            .put(self.url(&format!("/subjects/{id}")))
            .json(&NameBody { name })
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn delete_subject(&self, id: SubjectId) -> Result<(), RemoteError> {
        let response = self
            .client
            .delete(self.url(&format!("/subjects/{id}")))
            .send()
            .await?;
        Self::decode::<Ack>(response).await.map(|_| ())
    }

    async fn list_chapters(&self, subject_id: SubjectId) -> Result<Vec<Chapter>, RemoteError> {
        let response = self
            .client
            .get(self.url(&format!("/subjects/{subject_id}/chapters")))
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn add_chapter(
        &self,
        subject_id: SubjectId,
        name: &str,
    ) -> Result<Chapter, RemoteError> {
        let response = self
            .client
            .post(self.url(&format!("/subjects/{subject_id}/chapters")))
            .json(&NameBody { name })
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn update_chapter(
        &self,
        subject_id: SubjectId,
        chapter_id: ChapterId,
        patch: &ChapterPatch,
    ) -> Result<Chapter, RemoteError> {
        let response = self
            .client
            .put(self.url(&format!("/subjects/{subject_id}/chapters/{chapter_id}")))
            .json(patch)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn delete_chapter(
        &self,
        subject_id: SubjectId,
        chapter_id: ChapterId,
    ) -> Result<(), RemoteError> {
        let response = self
            .client
            .delete(self.url(&format!("/subjects/{subject_id}/chapters/{chapter_id}")))
            .send()
            .await?;
        Self::decode::<Ack>(response).await.map(|_| ())
    }

    async fn get_config(&self) -> Result<Config, RemoteError> {
        let response = self.client.get(self.url("/config")).send().await?;
        Self::decode(response).await
    }

    async fn update_config(&self, patch: &ConfigPatch) -> Result<Config, RemoteError> {
        let response = self
            .client
            .put(self.url("/config"))
            .json(patch)
            .send()
            .await?;
        Self::decode(response).await
    }
}
