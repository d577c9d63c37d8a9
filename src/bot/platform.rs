//! serenity implementations of the widget ports.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serenity::all::{
    ChannelId, ComponentInteraction, CreateInteractionResponse, CreateInteractionResponseFollowup,
    CreateInteractionResponseMessage, Message, MessageId,
};
use serenity::async_trait;
use serenity::collector::MessageCollector;
use serenity::gateway::ShardMessenger;
use serenity::http::{Http, HttpError};

use crate::bot::helpers::components;
use crate::widgets::ports::TextFilter;
use crate::widgets::{
    CollectedText, InteractionHandle, MessageHandle, MessageTransport, RenderProps, TextCollector,
    TransportError,
};

/// Discord's "Unknown Message" JSON error code.
const UNKNOWN_MESSAGE: isize = 10008;

fn transport_error(error: serenity::Error) -> TransportError {
    match &error {
        serenity::Error::Http(HttpError::UnsuccessfulRequest(response))
            if response.error.code == UNKNOWN_MESSAGE =>
        {
            TransportError::MessageGone
        }
        _ => TransportError::Request(error.to_string()),
    }
}

/// First millisecond of 2015, where Discord snowflakes start counting.
const DISCORD_EPOCH_MS: u64 = 1_420_070_400_000;

/// Creation time of a snowflake id, to the millisecond.
fn snowflake_time(id: u64) -> DateTime<Utc> {
    i64::try_from((id >> 22) + DISCORD_EPOCH_MS)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or_else(Utc::now)
}

pub struct SerenityTransport {
    http: Arc<Http>,
}

impl SerenityTransport {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl MessageTransport for SerenityTransport {
    async fn send(
        &self,
        channel_id: u64,
        props: RenderProps,
    ) -> Result<MessageHandle, TransportError> {
        let message = ChannelId::new(channel_id)
            .send_message(&self.http, components::create_message(&props))
            .await
            .map_err(transport_error)?;

        Ok(MessageHandle::new(message.channel_id.get(), message.id.get()))
    }

    async fn edit(&self, handle: MessageHandle, props: RenderProps) -> Result<(), TransportError> {
        ChannelId::new(handle.channel_id)
            .edit_message(
                &self.http,
                MessageId::new(handle.message_id),
                components::edit_message(&props),
            )
            .await
            .map_err(transport_error)?;

        Ok(())
    }

    async fn delete(&self, handle: MessageHandle) -> Result<(), TransportError> {
        ChannelId::new(handle.channel_id)
            .delete_message(&self.http, MessageId::new(handle.message_id))
            .await
            .map_err(transport_error)
    }
}

/// A button click. Remembers whether the interaction was already answered so
/// later replies turn into follow-ups.
pub struct SerenityInteraction {
    http: Arc<Http>,
    interaction: ComponentInteraction,
    responded: AtomicBool,
}

impl SerenityInteraction {
    pub fn new(http: Arc<Http>, interaction: ComponentInteraction) -> Self {
        Self {
            http,
            interaction,
            responded: AtomicBool::new(false),
        }
    }

    fn claim_response(&self) -> bool {
        !self.responded.swap(true, Ordering::SeqCst)
    }
}

#[async_trait]
impl InteractionHandle for SerenityInteraction {
    fn user_id(&self) -> u64 {
        self.interaction.user.id.get()
    }

    fn custom_id(&self) -> &str {
        &self.interaction.data.custom_id
    }

    fn channel_id(&self) -> u64 {
        self.interaction.channel_id.get()
    }

    fn created_at(&self) -> DateTime<Utc> {
        snowflake_time(self.interaction.id.get())
    }

    async fn reply(&self, content: String, ephemeral: bool) -> Result<(), TransportError> {
        if self.claim_response() {
            let message = CreateInteractionResponseMessage::new()
                .content(content)
                .ephemeral(ephemeral);
            self.interaction
                .create_response(&self.http, CreateInteractionResponse::Message(message))
                .await
                .map_err(transport_error)
        } else {
            let followup = CreateInteractionResponseFollowup::new()
                .content(content)
                .ephemeral(ephemeral);
            self.interaction
                .create_followup(&self.http, followup)
                .await
                .map(|_| ())
                .map_err(transport_error)
        }
    }

    async fn acknowledge(&self) -> Result<(), TransportError> {
        if !self.claim_response() {
            return Ok(());
        }

        self.interaction
            .create_response(&self.http, CreateInteractionResponse::Acknowledge)
            .await
            .map_err(transport_error)
    }

    async fn update_message(&self, props: RenderProps) -> Result<(), TransportError> {
        if self.claim_response() {
            return self
                .interaction
                .create_response(
                    &self.http,
                    CreateInteractionResponse::UpdateMessage(components::response_message(&props)),
                )
                .await
                .map_err(transport_error);
        }

        self.interaction
            .channel_id
            .edit_message(
                &self.http,
                self.interaction.message.id,
                components::edit_message(&props),
            )
            .await
            .map(|_| ())
            .map_err(transport_error)
    }
}

/// Collects text messages through the gateway.
pub struct SerenityCollector {
    shard: ShardMessenger,
}

impl SerenityCollector {
    pub fn new(shard: ShardMessenger) -> Self {
        Self { shard }
    }
}

fn collected(message: &Message) -> CollectedText {
    CollectedText {
        author_id: message.author.id.get(),
        content: message.content.clone(),
        created_at: snowflake_time(message.id.get()),
        message: Some(MessageHandle::new(message.channel_id.get(), message.id.get())),
    }
}

#[async_trait]
impl TextCollector for SerenityCollector {
    async fn next_text(
        &self,
        channel_id: u64,
        filter: TextFilter,
        timeout: Duration,
    ) -> Option<CollectedText> {
        MessageCollector::new(&self.shard)
            .channel_id(ChannelId::new(channel_id))
            .timeout(timeout)
            .filter(move |message: &Message| !message.author.bot && filter(&collected(message)))
            .next()
            .await
            .map(|message| collected(&message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn snowflake_at(time: DateTime<Utc>, low_bits: u64) -> u64 {
        let ms = u64::try_from(time.timestamp_millis()).unwrap() - DISCORD_EPOCH_MS;
        (ms << 22) | low_bits
    }

    #[test]
    fn test_snowflake_time_keeps_milliseconds() {
        let minted = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 30).unwrap()
            + chrono::Duration::milliseconds(900);

        assert_eq!(snowflake_time(snowflake_at(minted, 0)), minted);
        assert_eq!(snowflake_time(snowflake_at(minted, 0x3f_ffff)), minted);
    }

    #[test]
    fn test_snowflake_time_matches_known_id() {
        // 175928847299117063 is the example snowflake in Discord's docs.
        let expected = Utc.with_ymd_and_hms(2016, 4, 30, 11, 18, 25).unwrap()
            + chrono::Duration::milliseconds(796);
        assert_eq!(snowflake_time(175_928_847_299_117_063), expected);
    }

    #[test]
    fn test_window_opens_on_the_millisecond() {
        use crate::widgets::{AccessRule, PermissionWindow};

        let created = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
            + chrono::Duration::milliseconds(500);
        let window = PermissionWindow::new(1, AccessRule::OpensAfter(Duration::from_secs(30)), created);

        let early = created + chrono::Duration::milliseconds(29_999);
        let late = created + chrono::Duration::milliseconds(30_400);
        assert!(!window.allowed(2, snowflake_time(snowflake_at(early, 7))));
        assert!(window.allowed(2, snowflake_time(snowflake_at(late, 7))));
    }
}
