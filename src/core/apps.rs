//! `apps` and `apps:info` handlers.

use std::fmt::Write as _;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use tracing::{error, info};

use crate::akkeris::PlatformApi;
use crate::blocks::{Block, ChatMessage, FileUpload};
use crate::delivery::{DeliveryTarget, ResponseDelivery};
use crate::dyno::{column_padding, format_local, normalize};
use crate::suggest::{send_error, SuggestionEngine, APP_INFO_ERROR};
use crate::types::{AppRecord, CommandMeta, DynoRecord, FormationRecord};

pub const LIST_APPS_ERROR: &str = "Error retrieving list of apps. Please try again later.";

/// Lines per section block when the app list is posted inline.
pub const CHUNK_LINES: usize = 100;
/// Section text limit enforced by the chat platform, minus the code fence.
const SECTION_TEXT_LIMIT: usize = 3000 - 8;

const WARNING: &str = ":warning:";

pub struct AppsQueryService {
    api: Arc<dyn PlatformApi>,
    delivery: Arc<dyn ResponseDelivery>,
    suggestions: SuggestionEngine,
    ui_url: String,
    inline_text_limit: usize,
}

impl AppsQueryService {
    pub fn new(
        api: Arc<dyn PlatformApi>,
        delivery: Arc<dyn ResponseDelivery>,
        ui_url: impl Into<String>,
        inline_text_limit: usize,
    ) -> Self {
        Self {
            suggestions: SuggestionEngine::new(api.clone(), delivery.clone()),
            api,
            delivery,
            ui_url: ui_url.into(),
            inline_text_limit,
        }
    }

    /// List every app visible to the requester. Long lists are uploaded as
    /// a file, short ones are posted into the channel.
    pub async fn list_apps(&self, meta: &CommandMeta) {
        let reply = DeliveryTarget::ReplyUrl(meta.reply_url.clone());

        let apps = match self.api.list_apps(meta).await {
            Ok(apps) => apps,
            Err(e) => {
                error!(channel = %meta.channel_id, "Failed to list apps: {}", e);
                send_error(self.delivery.as_ref(), &reply, LIST_APPS_ERROR).await;
                return;
            }
        };

        let text = render_app_list(&apps);
        let title = format!("*Result of* `aka apps` ({})", apps.len());

        let delivered = if text.chars().count() > self.inline_text_limit {
            info!(apps = apps.len(), "App list too long for a message, uploading");
            self.delivery
                .upload_file(FileUpload {
                    channel_id: meta.channel_id.clone(),
                    content: text,
                    filename: format!("aka-apps_{}.txt", Utc::now().timestamp()),
                    filetype: "text".to_string(),
                    title,
                })
                .await
        } else {
            let mut blocks = vec![Block::section(title.clone())];
            blocks.extend(
                chunk_lines(&text, CHUNK_LINES, SECTION_TEXT_LIMIT)
                    .into_iter()
                    .map(|chunk| Block::section(format!("```\n{}\n```", chunk))),
            );
            let message = ChatMessage::in_channel_blocks(blocks).with_fallback_text(title);
            self.delivery
                .post_message(&DeliveryTarget::Channel(meta.channel_id.clone()), &message)
                .await
        };

        if let Err(e) = delivered {
            error!(channel = %meta.channel_id, "Failed to deliver app list: {}", e);
            send_error(self.delivery.as_ref(), &reply, LIST_APPS_ERROR).await;
        }
    }

    /// Summarize one app: formation, live dynos, repository, last release.
    pub async fn get_app_info(&self, meta: &CommandMeta, app_name: &str) {
        let reply = DeliveryTarget::ReplyUrl(meta.reply_url.clone());

        let (app, formation, dynos) = tokio::join!(
            self.api.get_app(meta, app_name),
            self.api.get_formation(meta, app_name),
            self.api.get_dynos(meta, app_name),
        );

        let app = match app {
            Ok(app) => app,
            Err(e) if e.is_not_found() => {
                info!(app = app_name, "App not found, looking for a suggestion");
                self.suggestions.suggest(meta, app_name).await;
                return;
            }
            Err(e) => {
                error!(app = app_name, "Failed to fetch app: {}", e);
                send_error(self.delivery.as_ref(), &reply, APP_INFO_ERROR).await;
                return;
            }
        };

        let (formation, dynos) = match (formation, dynos) {
            (Ok(formation), Ok(dynos)) => (formation, dynos),
            (Err(e), _) | (_, Err(e)) => {
                error!(app = app_name, "Failed to fetch formation or dynos: {}", e);
                send_error(self.delivery.as_ref(), &reply, APP_INFO_ERROR).await;
                return;
            }
        };

        let message = render_app_info(
            &app,
            &formation,
            &dynos,
            Utc::now(),
            &meta.timezone,
            &self.ui_url,
        );

        if let Err(e) = self.delivery.post_message(&reply, &message).await {
            error!(app = app_name, "Failed to send app info: {}", e);
            send_error(self.delivery.as_ref(), &reply, APP_INFO_ERROR).await;
        }
    }
}

pub fn render_app_list(apps: &[AppRecord]) -> String {
    let mut out = String::new();
    for app in apps {
        let preview = if app.preview { " - preview" } else { "" };
        let _ = writeln!(out, "⬢ {}{}", app.name, preview);
        let _ = writeln!(out, "\tUrl: {}", app.web_url);
        if let Some(git_url) = app.git_url.as_deref().filter(|u| !u.is_empty()) {
            let _ = writeln!(out, "\tGitHub: {}", git_url);
        }
        out.push('\n');
    }
    out
}

/// Split `text` on line boundaries into pieces of at most `max_lines`
/// lines and (unless a single line is longer) `max_chars` characters.
pub fn chunk_lines(text: &str, max_lines: usize, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_chars = 0;

    for line in text.trim_end().lines() {
        let line_chars = line.chars().count() + 1;
        if !current.is_empty()
            && (current.len() == max_lines || current_chars + line_chars > max_chars)
        {
            chunks.push(current.join("\n"));
            current.clear();
            current_chars = 0;
        }
        current.push(line);
        current_chars += line_chars;
    }

    if !current.is_empty() {
        chunks.push(current.join("\n"));
    }
    chunks
}

/// Formation lines with their dynos, and whether any dyno warns.
pub fn render_formations(
    formations: &[FormationRecord],
    dynos: &[DynoRecord],
    now: DateTime<Utc>,
    tz: &FixedOffset,
) -> (String, bool) {
    let mut out = String::new();
    let mut any_warning = false;

    for formation in formations {
        let displays: Vec<_> = dynos
            .iter()
            .filter(|d| d.process_type == formation.process_type)
            .map(|d| normalize(d, now, tz))
            .collect();
        let warning = displays.iter().any(|d| d.warning);
        any_warning |= warning;

        let _ = writeln!(
            out,
            "{} [{}] ({}): {}",
            formation.process_type,
            formation.quantity,
            formation.size,
            if warning { WARNING } else { "" }
        );
        for dyno in &displays {
            let _ = writeln!(
                out,
                "\t- {}{}:{}{} ({})",
                if dyno.warning { ":warning: " } else { "" },
                dyno.dyno_name,
                column_padding(&dyno.dyno_name),
                dyno.display_state,
                dyno.updated_at_local
            );
        }
    }

    (out, any_warning)
}

pub fn render_app_info(
    app: &AppRecord,
    formations: &[FormationRecord],
    dynos: &[DynoRecord],
    now: DateTime<Utc>,
    tz: &FixedOffset,
    ui_url: &str,
) -> ChatMessage {
    let (formation_info, warning) = render_formations(formations, dynos, now, tz);

    let repo = match (app.git_url.as_deref(), app.git_branch.as_deref()) {
        (Some(url), Some(branch)) => format!("{}#{}", url, branch),
        (Some(url), None) => url.to_string(),
        (None, _) => "_not connected_".to_string(),
    };

    ChatMessage::in_channel_blocks(vec![
        Block::section(format!("Info for *{}*", app.name)),
        Block::section(format!(
            ":cpu: *Dynos* {}\n{}",
            if warning { WARNING } else { "" },
            formation_info
        )),
        Block::section(format!(":github: *Git Repo*\t{}", repo)),
        Block::Divider {},
        Block::context(format!(
            "Last Release: {}\nMore Info: {}/apps/{}/info",
            format_local(app.released_at, tz),
            ui_url,
            app.name
        )),
    ])
    .with_fallback_text(format!("Info for {}", app.name))
}
