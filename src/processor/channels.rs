//! Keeps the membership store in step with the channels the bot has joined.

use std::sync::Arc;
use std::time::Duration;

use aka_chatops::{ChatOpsError, ChatOpsResult, InMemoryMembershipStore, MembershipRecord};
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

const PAGE_LIMIT: &str = "200";
/// Guards against a cursor that never runs out.
const MAX_PAGES: usize = 100;

#[derive(Debug, Deserialize)]
struct ConversationsPage {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    channels: Vec<Channel>,
    #[serde(default)]
    response_metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Deserialize)]
struct Channel {
    id: String,
    #[serde(default)]
    is_member: bool,
}

#[derive(Debug, Deserialize)]
struct ResponseMetadata {
    #[serde(default)]
    next_cursor: String,
}

pub struct ChannelRefresher {
    client: Client,
    api_url: String,
    bot_token: String,
    store: Arc<InMemoryMembershipStore>,
}

impl ChannelRefresher {
    pub fn new(
        client: Client,
        api_url: impl Into<String>,
        bot_token: impl Into<String>,
        store: Arc<InMemoryMembershipStore>,
    ) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            bot_token: bot_token.into(),
            store,
        }
    }

    /// Refresh when the store is older than `max_age`. A failed refresh
    /// leaves the previous snapshot in place.
    pub async fn refresh_if_stale(&self, max_age: Duration) {
        if !self.store.is_stale(max_age).await {
            return;
        }
        if let Err(e) = self.refresh().await {
            warn!("Channel membership refresh failed, keeping previous snapshot: {}", e);
        }
    }

    /// Rebuild the store from `conversations.list`. Returns the number of
    /// channels seen.
    pub async fn refresh(&self) -> ChatOpsResult<usize> {
        let mut records = Vec::new();
        let mut cursor = String::new();

        for _ in 0..MAX_PAGES {
            let page = self.fetch_page(&cursor).await?;
            let now = Utc::now();
            records.extend(page.channels.into_iter().map(|c| MembershipRecord {
                channel_id: c.id,
                is_member: c.is_member,
                updated_at: now,
            }));

            cursor = page
                .response_metadata
                .map(|m| m.next_cursor)
                .unwrap_or_default();
            if cursor.is_empty() {
                break;
            }
        }

        let count = records.len();
        let joined = records.iter().filter(|r| r.is_member).count();
        self.store.replace_all(records).await;
        info!(channels = count, joined, "Channel membership refreshed");
        Ok(count)
    }

    async fn fetch_page(&self, cursor: &str) -> ChatOpsResult<ConversationsPage> {
        debug!(cursor, "Fetching conversations page");

        let mut query = vec![
            ("types", "public_channel"),
            ("exclude_archived", "true"),
            ("limit", PAGE_LIMIT),
        ];
        if !cursor.is_empty() {
            query.push(("cursor", cursor));
        }

        let response = self
            .client
            .get(format!("{}/conversations.list", self.api_url))
            .bearer_auth(&self.bot_token)
            .query(&query)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ChatOpsError::Http { status, body });
        }

        let page: ConversationsPage = response.json().await?;
        if !page.ok {
            return Err(ChatOpsError::Api(
                page.error.unwrap_or_else(|| "unknown_error".to_string()),
            ));
        }
        Ok(page)
    }
}
