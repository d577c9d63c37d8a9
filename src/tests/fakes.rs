//! In-memory stand-ins for the platform collaborators.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serenity::async_trait;
use tokio::sync::mpsc;

use crate::widgets::ports::TextFilter;
use crate::widgets::{
    CollectedText, ComponentRegistry, InteractionHandle, MessageHandle, MessageTransport,
    RenderProps, TextCollector, TransportError, WidgetServices,
};

pub const CHANNEL: u64 = 500;

#[derive(Default)]
pub struct FakeTransport {
    next_message: AtomicU64,
    pub sent: Mutex<Vec<(u64, RenderProps)>>,
    pub edits: Mutex<Vec<(MessageHandle, RenderProps)>>,
    pub deleted: Mutex<Vec<MessageHandle>>,
    pub fail_edits: AtomicBool,
    /// Each edit pops one delay and waits that long before it lands.
    pub edit_delays: Mutex<VecDeque<Duration>>,
}

impl FakeTransport {
    pub fn edit_count(&self) -> usize {
        self.edits.lock().unwrap().len()
    }

    pub fn last_edit(&self) -> Option<RenderProps> {
        self.edits.lock().unwrap().last().map(|(_, props)| props.clone())
    }
}

#[async_trait]
impl MessageTransport for FakeTransport {
    async fn send(&self, channel_id: u64, props: RenderProps) -> Result<MessageHandle, TransportError> {
        let id = self.next_message.fetch_add(1, Ordering::SeqCst) + 1;
        self.sent.lock().unwrap().push((channel_id, props));
        Ok(MessageHandle::new(channel_id, id))
    }

    async fn edit(&self, handle: MessageHandle, props: RenderProps) -> Result<(), TransportError> {
        let delay = self.edit_delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_edits.load(Ordering::SeqCst) {
            return Err(TransportError::MessageGone);
        }
        self.edits.lock().unwrap().push((handle, props));
        Ok(())
    }

    async fn delete(&self, handle: MessageHandle) -> Result<(), TransportError> {
        self.deleted.lock().unwrap().push(handle);
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Reply {
    pub content: String,
    pub ephemeral: bool,
}

pub struct FakeInteraction {
    user_id: u64,
    custom_id: String,
    created_at: DateTime<Utc>,
    pub replies: Mutex<Vec<Reply>>,
    pub updates: Mutex<Vec<RenderProps>>,
    pub acknowledged: AtomicBool,
}

impl FakeInteraction {
    pub fn new(user_id: u64, custom_id: impl Into<String>) -> Self {
        Self::at(user_id, custom_id, Utc::now())
    }

    pub fn at(user_id: u64, custom_id: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            custom_id: custom_id.into(),
            created_at,
            replies: Mutex::new(Vec::new()),
            updates: Mutex::new(Vec::new()),
            acknowledged: AtomicBool::new(false),
        }
    }

    pub fn replies(&self) -> Vec<Reply> {
        self.replies.lock().unwrap().clone()
    }

    pub fn updates(&self) -> Vec<RenderProps> {
        self.updates.lock().unwrap().clone()
    }

    pub fn touched(&self) -> bool {
        !self.replies().is_empty()
            || !self.updates().is_empty()
            || self.acknowledged.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InteractionHandle for FakeInteraction {
    fn user_id(&self) -> u64 {
        self.user_id
    }

    fn custom_id(&self) -> &str {
        &self.custom_id
    }

    fn channel_id(&self) -> u64 {
        CHANNEL
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    async fn reply(&self, content: String, ephemeral: bool) -> Result<(), TransportError> {
        self.replies.lock().unwrap().push(Reply { content, ephemeral });
        Ok(())
    }

    async fn acknowledge(&self) -> Result<(), TransportError> {
        self.acknowledged.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn update_message(&self, props: RenderProps) -> Result<(), TransportError> {
        self.updates.lock().unwrap().push(props);
        Ok(())
    }
}

/// Hands out texts pushed by the test, in order, subject to the filter.
pub struct FakeCollector {
    tx: mpsc::UnboundedSender<CollectedText>,
    rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<CollectedText>>,
}

impl FakeCollector {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: tokio::sync::Mutex::new(rx),
        }
    }

    pub fn push(&self, author_id: u64, content: &str) {
        self.tx
            .send(CollectedText {
                author_id,
                content: content.to_string(),
                created_at: Utc::now(),
                message: Some(MessageHandle::new(CHANNEL, 9_000)),
            })
            .unwrap();
    }
}

#[async_trait]
impl TextCollector for FakeCollector {
    async fn next_text(
        &self,
        _channel_id: u64,
        filter: TextFilter,
        timeout: Duration,
    ) -> Option<CollectedText> {
        tokio::time::timeout(timeout, async {
            let mut rx = self.rx.lock().await;
            loop {
                let text = rx.recv().await?;
                if filter(&text) {
                    return Some(text);
                }
            }
        })
        .await
        .ok()
        .flatten()
    }
}

pub struct Fixture {
    pub registry: Arc<ComponentRegistry>,
    pub transport: Arc<FakeTransport>,
    pub collector: Arc<FakeCollector>,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(ComponentRegistry::new()),
            transport: Arc::new(FakeTransport::default()),
            collector: Arc::new(FakeCollector::new()),
        }
    }

    pub fn services(&self) -> WidgetServices {
        WidgetServices {
            registry: Arc::clone(&self.registry),
            transport: self.transport.clone(),
            collector: self.collector.clone(),
        }
    }

    /// Deliver a click through the registry, like the router does.
    pub async fn click(&self, user_id: u64, custom_id: &str) -> (bool, Arc<FakeInteraction>) {
        self.click_at(user_id, custom_id, Utc::now()).await
    }

    pub async fn click_at(
        &self,
        user_id: u64,
        custom_id: &str,
        at: DateTime<Utc>,
    ) -> (bool, Arc<FakeInteraction>) {
        let interaction = Arc::new(FakeInteraction::at(user_id, custom_id, at));
        let routed = self
            .registry
            .dispatch(custom_id, interaction.clone())
            .await;
        (routed, interaction)
    }
}

/// Let spawned tasks run. With a paused clock this also lets them reach
/// their next timer.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
