//! Entry point for `/aka` commands.
//!
//! The chat platform gives a slash command about three seconds to answer,
//! which the management API cannot be trusted to meet. [`handle`] therefore
//! answers with a fixed acknowledgment and hands the command to a
//! [`CommandQueue`]; whoever drains the queue calls
//! [`CommandRouter::dispatch`], which reports back only through the
//! command's reply URL.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::FixedOffset;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::akkeris::PlatformApi;
use crate::apps::AppsQueryService;
use crate::blocks::ResponseType;
use crate::config::ChatOpsConfig;
use crate::delivery::{DeliveryTarget, ResponseDelivery};
use crate::error::ChatOpsResult;
use crate::grammar::{self, Command};
use crate::logs;
use crate::membership::{MembershipGate, MembershipLookup};
use crate::suggest::send_error;
use crate::types::{CommandMeta, InboundCommand};

/// Synchronous answer to the slash command request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Acknowledgment {
    pub response_type: ResponseType,
}

pub fn acknowledgment() -> Acknowledgment {
    Acknowledgment {
        response_type: ResponseType::InChannel,
    }
}

/// Where acknowledged commands wait to be dispatched. Nothing taken from
/// the queue may reach the management API before the acknowledgment has
/// been sent.
#[async_trait]
pub trait CommandQueue: Send + Sync {
    async fn enqueue(&self, command: InboundCommand) -> ChatOpsResult<()>;
}

/// Schedule `command` and acknowledge it. The acknowledgment does not
/// depend on whether scheduling worked.
pub async fn handle(queue: &dyn CommandQueue, command: InboundCommand) -> Acknowledgment {
    let channel_id = command.channel_id.clone();
    let user_id = command.user_id.clone();

    if let Err(e) = queue.enqueue(command).await {
        error!(channel = %channel_id, user = %user_id, "Failed to schedule command: {}", e);
    }

    acknowledgment()
}

pub struct CommandRouter {
    gate: MembershipGate<dyn MembershipLookup>,
    apps: AppsQueryService,
    delivery: Arc<dyn ResponseDelivery>,
    fallback_tz: FixedOffset,
}

impl CommandRouter {
    pub fn new(
        config: &ChatOpsConfig,
        api: Arc<dyn PlatformApi>,
        delivery: Arc<dyn ResponseDelivery>,
        membership: Arc<dyn MembershipLookup>,
    ) -> Self {
        Self {
            gate: MembershipGate::new(membership),
            apps: AppsQueryService::new(
                api,
                delivery.clone(),
                config.akkeris_ui.clone(),
                config.inline_text_limit,
            ),
            delivery,
            fallback_tz: config.fallback_tz,
        }
    }

    /// Run one acknowledged command to completion. Every outcome, including
    /// failures, is reported through the reply URL; nothing is returned.
    pub async fn dispatch(&self, command: InboundCommand) {
        let meta = CommandMeta::from_inbound(&command, self.fallback_tz);
        let reply = DeliveryTarget::ReplyUrl(meta.reply_url.clone());

        info!(
            channel = %meta.channel_id,
            user = %meta.user_name,
            text = %command.text,
            "Dispatching command"
        );

        if meta.credential.is_none() {
            warn!(user = %meta.user_name, "Command arrived without a credential");
        }

        if !self.gate.check(&meta.channel_id).await {
            info!(channel = %meta.channel_id, "Bot is not a member of the channel");
            send_error(
                self.delivery.as_ref(),
                &reply,
                &not_a_member_notice(&meta.channel_name),
            )
            .await;
            return;
        }

        match grammar::parse(&command.text) {
            Command::ListApps => self.apps.list_apps(&meta).await,
            Command::AppInfo { app_name } => self.apps.get_app_info(&meta, &app_name).await,
            Command::Logs { options } => {
                logs::get_logs(self.delivery.as_ref(), &meta, &options).await
            }
            Command::Unrecognized { text } => {
                info!(text = %text, "Unrecognized command");
                send_error(
                    self.delivery.as_ref(),
                    &reply,
                    &format!("Unrecognized Command: {}", text),
                )
                .await;
            }
        }
    }
}

pub fn not_a_member_notice(channel_name: &str) -> String {
    format!(
        "Please add the bot to channel #{} and try again (`/invite @aka`).",
        channel_name
    )
}
