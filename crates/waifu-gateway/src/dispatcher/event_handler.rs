//! Event handler
//!
//! Routes host events to the membership listeners and the pairing commands,
//! and sends the rendered replies back through the host.

use std::sync::Arc;

use tracing::instrument;
use waifu_core::MemberListSource;
use waifu_service::{MembershipListener, Requester, ServiceContext, WaifuService};

use crate::client::SatoriClient;
use crate::commands::{Command, CommandParser};
use crate::protocol::{Event, EventType};
use crate::render::{render_error, render_marriage};

/// Event dispatcher, cloned into every event task
#[derive(Clone)]
pub struct Dispatcher {
    ctx: ServiceContext,
    client: SatoriClient,
    parser: Arc<CommandParser>,
}

impl Dispatcher {
    pub fn new(ctx: ServiceContext, client: SatoriClient, parser: CommandParser) -> Self {
        Self {
            ctx,
            client,
            parser: Arc::new(parser),
        }
    }

    pub fn context(&self) -> &ServiceContext {
        &self.ctx
    }

    /// Handle one event
    #[instrument(skip_all, fields(kind = %event.kind, sn = ?event.sn))]
    pub async fn handle(&self, event: Event) {
        match event.kind {
            EventType::MessageCreated => self.on_message(&event).await,
            EventType::GuildMemberAdded => self.on_member_added(&event),
            EventType::GuildMemberRemoved => self.on_member_removed(&event).await,
            EventType::Other(_) => {
                tracing::trace!("Ignoring event");
            }
        }
    }

    async fn on_message(&self, event: &Event) {
        if event.user_id() == Some(event.self_id.as_str()) {
            return;
        }

        if let (Some(guild), Some(member)) = (event.guild_key(), event.member_snapshot()) {
            MembershipListener::new(&self.ctx)
                .on_message(&guild, &member)
                .await;
        }

        let Some(command) = self.parser.parse(event.content()) else {
            return;
        };
        let Some(requester) = event.requester() else {
            tracing::debug!("Command without a sender");
            return;
        };

        let bot = self.client.bot(event.platform.clone(), event.self_id.clone());
        let Some(reply) = self
            .execute(&requester, command, event.message_id(), &bot)
            .await
        else {
            return;
        };
        let Some(channel_id) = event.channel_id() else {
            tracing::debug!("Nowhere to reply");
            return;
        };

        if let Err(e) = bot.send_message(channel_id, &reply).await {
            tracing::warn!(channel_id = %channel_id, error = %e, "Failed to send reply");
        }
    }

    fn on_member_added(&self, event: &Event) {
        let (Some(guild), Some(member)) = (event.guild_key(), event.member_snapshot()) else {
            return;
        };
        MembershipListener::new(&self.ctx).on_member_added(&guild, member);
    }

    async fn on_member_removed(&self, event: &Event) {
        let (Some(guild), Some(user_id)) = (event.guild_key(), event.user_id()) else {
            return;
        };
        MembershipListener::new(&self.ctx)
            .on_member_removed(&guild, user_id)
            .await;
    }

    /// Run a command and render its reply
    ///
    /// Returns `None` when nothing should be sent back.
    pub async fn execute(
        &self,
        requester: &Requester,
        command: Command,
        message_id: Option<&str>,
        host: &dyn MemberListSource,
    ) -> Option<String> {
        let service = WaifuService::new(&self.ctx);
        let (result, forced) = match command {
            Command::Waifu => (service.marry(requester, host).await, false),
            Command::ForceMarry { target } => (
                service
                    .force_marry(requester, target.as_deref(), host)
                    .await,
                true,
            ),
        };

        match result {
            Ok(marriage) => Some(render_marriage(message_id, &marriage, forced)),
            Err(e) if e.is_user_visible() => {
                tracing::debug!(code = e.error_code(), "Command rejected");
                render_error(message_id, &e)
            }
            Err(e) => {
                tracing::error!(code = e.error_code(), error = %e, "Command failed");
                None
            }
        }
    }
}
