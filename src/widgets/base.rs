use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use tokio::sync::mpsc;

use crate::widgets::error::TransportError;
use crate::widgets::ids::{ComponentId, WidgetId};
use crate::widgets::lifecycle::{Lifecycle, WidgetEvent};
use crate::widgets::lock;
use crate::widgets::ports::{InteractionHandle, MessageHandle, MessageTransport};
use crate::widgets::registry::{ComponentRegistry, Pressable};
use crate::widgets::timer::WidgetTimer;
use crate::widgets::view::RenderProps;
use crate::widgets::WidgetServices;

/// State shared by every widget kind: identity, registration, subscribers,
/// the expiry timer and the message the widget lives on.
pub(crate) struct WidgetBase {
    id: WidgetId,
    registry: Arc<ComponentRegistry>,
    transport: Arc<dyn MessageTransport>,
    lifecycle: Lifecycle<WidgetEvent>,
    timer: WidgetTimer,
    message: Mutex<Option<MessageHandle>>,
    /// Held across every write to the message. Destroy queues the final
    /// strip behind it, so no re-render can land after the controls are gone.
    writes: Arc<tokio::sync::Mutex<()>>,
}

impl WidgetBase {
    /// `on_expire` runs once when the timeout elapses.
    pub fn new(
        services: &WidgetServices,
        timeout: Option<Duration>,
        on_expire: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: services.registry.mint_id(),
            registry: Arc::clone(&services.registry),
            transport: Arc::clone(&services.transport),
            lifecycle: Lifecycle::new(),
            timer: WidgetTimer::new(timeout, on_expire),
            message: Mutex::new(None),
            writes: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    pub fn id(&self) -> WidgetId {
        self.id
    }

    pub fn component_id(&self, slot: usize) -> ComponentId {
        ComponentId::new(self.id, slot)
    }

    pub fn transport(&self) -> &Arc<dyn MessageTransport> {
        &self.transport
    }

    pub fn register(&self, widget: Weak<dyn Pressable>, slots: &[usize]) -> bool {
        if self.is_destroyed() {
            return false;
        }
        self.registry.register(self.id, widget, slots)
    }

    pub fn unregister(&self) -> bool {
        self.registry.unregister(self.id)
    }

    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<WidgetEvent> {
        self.lifecycle.subscribe()
    }

    pub fn emit(&self, event: WidgetEvent) {
        self.lifecycle.emit(event);
    }

    pub fn is_destroyed(&self) -> bool {
        self.lifecycle.is_destroyed()
    }

    pub fn start_timer(&self) {
        self.timer.start();
    }

    pub fn reset_timeout(&self) {
        if !self.is_destroyed() {
            self.timer.reset();
        }
    }

    pub fn message(&self) -> Option<MessageHandle> {
        *lock(&self.message)
    }

    pub fn attach(&self, handle: MessageHandle) {
        if !self.is_destroyed() {
            *lock(&self.message) = Some(handle);
        }
    }

    pub async fn send_in(
        &self,
        channel_id: u64,
        props: RenderProps,
    ) -> Result<Option<MessageHandle>, TransportError> {
        if self.is_destroyed() {
            return Ok(None);
        }

        let handle = self.transport.send(channel_id, props).await?;
        self.attach(handle);

        Ok(Some(handle))
    }

    /// Edit the attached message, if there is one.
    pub async fn edit(&self, props: RenderProps) -> Result<(), TransportError> {
        let _write = self.writes.lock().await;

        match self.message() {
            Some(handle) if !self.is_destroyed() => self.transport.edit(handle, props).await,
            _ => Ok(()),
        }
    }

    /// Like [`Self::edit`] but failures only get logged.
    pub async fn edit_or_log(&self, props: RenderProps) {
        if let Err(e) = self.edit(props).await {
            tracing::warn!("[WIDGET] failed to re-render {}: {}", self.id, e);
        }
    }

    /// Answer a click on the widget's own message with `props`. Once the
    /// widget is destroyed the click is only acknowledged.
    pub async fn respond(
        &self,
        interaction: &dyn InteractionHandle,
        props: RenderProps,
    ) -> Result<(), TransportError> {
        let _write = self.writes.lock().await;

        if self.is_destroyed() {
            return interaction.acknowledge().await;
        }
        interaction.update_message(props).await
    }

    /// Tear the widget down. Unregisters first so no click can reach it while
    /// subscribers are being told, then strips the controls off the message in
    /// the background. Returns `false` if it was already destroyed.
    pub fn destroy(&self, final_props: RenderProps) -> bool {
        self.unregister();
        self.timer.cancel();

        if !self.lifecycle.destroy(WidgetEvent::Destroy) {
            return false;
        }

        tracing::debug!("[WIDGET] destroyed {}", self.id);

        if let Some(handle) = self.message() {
            let transport = Arc::clone(&self.transport);
            let writes = Arc::clone(&self.writes);
            let id = self.id;

            match tokio::runtime::Handle::try_current() {
                Ok(runtime) => {
                    runtime.spawn(async move {
                        let _write = writes.lock().await;
                        if let Err(e) = transport.edit(handle, final_props).await {
                            tracing::debug!("[WIDGET] could not strip controls of {}: {}", id, e);
                        }
                    });
                }
                Err(_) => {
                    tracing::debug!("[WIDGET] no runtime to strip controls of {}", id);
                }
            }
        }

        true
    }

    /// Used when the owner drops a widget without destroying it.
    pub fn release(&self) {
        self.unregister();
        self.timer.cancel();
    }
}
