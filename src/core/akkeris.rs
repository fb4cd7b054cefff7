//! Read-only client for the Akkeris management API.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{ChatOpsError, ChatOpsResult};
use crate::types::{AppRecord, CommandMeta, DynoRecord, FormationRecord};

#[async_trait]
pub trait PlatformApi: Send + Sync {
    async fn list_apps(&self, meta: &CommandMeta) -> ChatOpsResult<Vec<AppRecord>>;

    async fn get_app(&self, meta: &CommandMeta, app_name: &str) -> ChatOpsResult<AppRecord>;

    async fn get_formation(
        &self,
        meta: &CommandMeta,
        app_name: &str,
    ) -> ChatOpsResult<Vec<FormationRecord>>;

    async fn get_dynos(&self, meta: &CommandMeta, app_name: &str)
        -> ChatOpsResult<Vec<DynoRecord>>;
}

pub struct AkkerisClient {
    client: Client,
    api_url: String,
}

impl AkkerisClient {
    pub fn new(client: Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
        }
    }

    async fn get<T: DeserializeOwned>(&self, meta: &CommandMeta, path: &str) -> ChatOpsResult<T> {
        let token = meta
            .credential
            .as_deref()
            .ok_or(ChatOpsError::MissingCredential)?;

        debug!(path, "GET management API");

        let response = self
            .client
            .get(format!("{}{}", self.api_url, path))
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ChatOpsError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatOpsError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl PlatformApi for AkkerisClient {
    async fn list_apps(&self, meta: &CommandMeta) -> ChatOpsResult<Vec<AppRecord>> {
        self.get(meta, "/apps").await
    }

    async fn get_app(&self, meta: &CommandMeta, app_name: &str) -> ChatOpsResult<AppRecord> {
        self.get(meta, &format!("/apps/{}", app_name)).await
    }

    async fn get_formation(
        &self,
        meta: &CommandMeta,
        app_name: &str,
    ) -> ChatOpsResult<Vec<FormationRecord>> {
        self.get(meta, &format!("/apps/{}/formation", app_name)).await
    }

    async fn get_dynos(
        &self,
        meta: &CommandMeta,
        app_name: &str,
    ) -> ChatOpsResult<Vec<DynoRecord>> {
        self.get(meta, &format!("/apps/{}/dynos", app_name)).await
    }
}
