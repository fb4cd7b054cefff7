//! "Did you mean …?" for app names that the platform does not know.

use std::sync::Arc;

use tracing::{error, info};

use crate::akkeris::PlatformApi;
use crate::blocks::{Block, ButtonElement, ChatMessage};
use crate::delivery::{DeliveryTarget, ResponseDelivery};
use crate::types::CommandMeta;

pub const APP_INFO_ERROR: &str = "Error retrieving app info. Please try again later.";
pub const SUGGESTION_POST_ERROR: &str = "Oops! Something went wrong. Please try again later";

/// Action id carried by the "Get info for …" button.
pub const APP_INFO_ACTION: &str = "app_info";

/// Candidates scoring below this are not worth proposing.
const MIN_SCORE: f32 = 0.5;
/// Score granted when one name contains the other.
const CONTAINMENT_SCORE: f32 = 0.75;

pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Similarity in 0.0..=1.0, case-insensitive.
pub fn similarity(query: &str, candidate: &str) -> f32 {
    let query = query.to_lowercase();
    let candidate = candidate.to_lowercase();

    let max_len = query.chars().count().max(candidate.chars().count());
    if max_len == 0 {
        return 1.0;
    }

    let ratio = 1.0 - levenshtein_distance(&query, &candidate) as f32 / max_len as f32;
    if !query.is_empty() && (candidate.contains(&query) || query.contains(&candidate)) {
        ratio.max(CONTAINMENT_SCORE)
    } else {
        ratio
    }
}

/// Names similar enough to `query`, best match first.
pub fn rank<'a, I>(query: &str, names: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut scored: Vec<(f32, &str)> = names
        .into_iter()
        .map(|name| (similarity(query, name), name))
        .filter(|(score, _)| *score >= MIN_SCORE)
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    scored.into_iter().map(|(_, name)| name).collect()
}

pub fn suggestion_message(app_name: &str) -> ChatMessage {
    ChatMessage::in_channel_blocks(vec![
        Block::section(format!("Did you mean _{}_?", app_name)),
        Block::Actions {
            elements: vec![
                ButtonElement::new(format!("Get info for {}", app_name), APP_INFO_ACTION)
                    .with_value(app_name),
            ],
        },
    ])
    .with_fallback_text(format!("Did you mean {}?", app_name))
}

pub struct SuggestionEngine {
    api: Arc<dyn PlatformApi>,
    delivery: Arc<dyn ResponseDelivery>,
}

impl SuggestionEngine {
    pub fn new(api: Arc<dyn PlatformApi>, delivery: Arc<dyn ResponseDelivery>) -> Self {
        Self { api, delivery }
    }

    /// Propose the closest known app to `queried_name`. With nothing to
    /// propose, the requester gets the same error as a failed lookup.
    pub async fn suggest(&self, meta: &CommandMeta, queried_name: &str) {
        let reply = DeliveryTarget::ReplyUrl(meta.reply_url.clone());

        let apps = match self.api.list_apps(meta).await {
            Ok(apps) => apps,
            Err(e) => {
                error!(app = queried_name, "Failed to list apps for suggestion: {}", e);
                send_error(self.delivery.as_ref(), &reply, APP_INFO_ERROR).await;
                return;
            }
        };

        let ranked = rank(queried_name, apps.iter().map(|app| app.name.as_str()));
        let Some(best) = ranked.first() else {
            info!(app = queried_name, "No app resembles the requested name");
            send_error(self.delivery.as_ref(), &reply, APP_INFO_ERROR).await;
            return;
        };

        info!(app = queried_name, suggestion = *best, "Suggesting app");
        if let Err(e) = self
            .delivery
            .post_message(&reply, &suggestion_message(best))
            .await
        {
            error!("Failed to send suggestion: {}", e);
            send_error(self.delivery.as_ref(), &reply, SUGGESTION_POST_ERROR).await;
        }
    }
}

/// Post an ephemeral notice. Failures are logged and swallowed so that a
/// broken reply URL never produces another error notice.
pub async fn send_error(delivery: &dyn ResponseDelivery, target: &DeliveryTarget, text: &str) {
    if let Err(e) = delivery
        .post_message(target, &ChatMessage::ephemeral(text))
        .await
    {
        error!("Failed to send error notice: {}", e);
    }
}
