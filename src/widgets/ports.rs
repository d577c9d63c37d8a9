//! The narrow interfaces widgets consume. The bot layer implements them on top
//! of serenity; tests implement them with in-memory fakes.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serenity::async_trait;

use crate::widgets::error::TransportError;
use crate::widgets::view::RenderProps;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct MessageHandle {
    pub channel_id: u64,
    pub message_id: u64,
}

impl MessageHandle {
    pub fn new(channel_id: u64, message_id: u64) -> Self {
        Self {
            channel_id,
            message_id,
        }
    }
}

#[async_trait]
pub trait MessageTransport: Send + Sync {
    async fn send(&self, channel_id: u64, props: RenderProps)
    -> Result<MessageHandle, TransportError>;

    /// Safe to retry; editing to the same props twice is harmless.
    async fn edit(&self, handle: MessageHandle, props: RenderProps) -> Result<(), TransportError>;

    async fn delete(&self, handle: MessageHandle) -> Result<(), TransportError>;
}

/// A button click as delivered by the platform.
#[async_trait]
pub trait InteractionHandle: Send + Sync {
    fn user_id(&self) -> u64;

    fn custom_id(&self) -> &str;

    fn channel_id(&self) -> u64;

    fn created_at(&self) -> DateTime<Utc>;

    /// Send a text reply. The first call answers the interaction, later calls
    /// become follow-ups.
    async fn reply(&self, content: String, ephemeral: bool) -> Result<(), TransportError>;

    /// Answer the interaction without changing anything.
    async fn acknowledge(&self) -> Result<(), TransportError>;

    /// Answer the interaction by editing the message the button sits on.
    async fn update_message(&self, props: RenderProps) -> Result<(), TransportError>;
}

#[derive(Clone, Debug, PartialEq)]
pub struct CollectedText {
    pub author_id: u64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub message: Option<MessageHandle>,
}

pub type TextFilter = Arc<dyn Fn(&CollectedText) -> bool + Send + Sync>;

#[async_trait]
pub trait TextCollector: Send + Sync {
    /// Wait for the next text message in `channel_id` accepted by `filter`,
    /// giving up after `timeout`.
    async fn next_text(
        &self,
        channel_id: u64,
        filter: TextFilter,
        timeout: Duration,
    ) -> Option<CollectedText>;
}
