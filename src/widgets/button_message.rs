//! A message with a fixed set of buttons whose clicks are forwarded to the
//! feature that created it.

use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use chrono::Utc;
use serenity::async_trait;
use tokio::sync::mpsc;

use crate::widgets::base::WidgetBase;
use crate::widgets::error::{TransportError, WidgetError};
use crate::widgets::ids::{ComponentId, WidgetId};
use crate::widgets::lifecycle::{Press, WidgetEvent};
use crate::widgets::lock;
use crate::widgets::permission::{AccessRule, PermissionWindow};
use crate::widgets::ports::{InteractionHandle, MessageHandle};
use crate::widgets::registry::Pressable;
use crate::widgets::view::{Control, MAX_CONTROLS, Page, RenderProps, RenderedControl};
use crate::widgets::WidgetServices;

#[derive(Clone, Debug)]
pub struct ButtonMessageOptions {
    /// `None` keeps the widget alive until destroyed explicitly.
    pub timeout: Option<Duration>,
    pub access: AccessRule,
}

impl Default for ButtonMessageOptions {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(300)),
            access: AccessRule::OwnerOnly,
        }
    }
}

struct View {
    page: Page,
    controls: Vec<Control>,
}

struct Inner {
    base: WidgetBase,
    window: PermissionWindow,
    view: Mutex<View>,
}

/// Cheap to clone; every clone is the same widget.
#[derive(Clone)]
pub struct ButtonMessage {
    inner: Arc<Inner>,
}

impl ButtonMessage {
    /// Must be called inside a tokio runtime when a timeout is set.
    /// Presses from anyone `options.access` turns away never reach
    /// subscribers; they get the denial notice instead.
    pub fn new(
        services: &WidgetServices,
        page: Page,
        controls: Vec<Control>,
        owner_id: u64,
        options: ButtonMessageOptions,
    ) -> Result<Self, WidgetError> {
        if controls.is_empty() || controls.len() > MAX_CONTROLS {
            return Err(WidgetError::InvalidControlCount(controls.len()));
        }

        let routable: Vec<usize> = controls
            .iter()
            .enumerate()
            .filter(|(_, control)| !control.is_link())
            .map(|(slot, _)| slot)
            .collect();

        let inner = Arc::new_cyclic(|weak: &Weak<Inner>| {
            let weak = weak.clone();
            Inner {
                base: WidgetBase::new(services, options.timeout, move || {
                    if let Some(inner) = weak.upgrade() {
                        inner.expire();
                    }
                }),
                window: PermissionWindow::new(owner_id, options.access, Utc::now()),
                view: Mutex::new(View { page, controls }),
            }
        });

        if !routable.is_empty() {
            let weak: Weak<dyn Pressable> = Arc::downgrade(&inner) as Weak<dyn Pressable>;
            inner.base.register(weak, &routable);
        }
        inner.base.start_timer();

        tracing::debug!(
            "[WIDGET] button message {} created with {} routable controls",
            inner.base.id(),
            routable.len()
        );

        Ok(Self { inner })
    }

    pub fn id(&self) -> WidgetId {
        self.inner.base.id()
    }

    pub fn owner_id(&self) -> u64 {
        self.inner.window.owner_id()
    }

    /// The routing id of `slot`, or `None` for links and unknown slots.
    pub fn component_id(&self, slot: usize) -> Option<ComponentId> {
        let view = lock(&self.inner.view);
        match view.controls.get(slot) {
            Some(control) if !control.is_link() => Some(self.inner.base.component_id(slot)),
            _ => None,
        }
    }

    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<WidgetEvent> {
        self.inner.base.subscribe()
    }

    /// Resolves once the widget is destroyed.
    pub async fn closed(&self) {
        let mut events = self.subscribe();
        while let Some(event) = events.recv().await {
            if matches!(event, WidgetEvent::Destroy) {
                break;
            }
        }
    }

    pub fn reset_timeout(&self) {
        self.inner.base.reset_timeout();
    }

    pub fn destroy(&self) -> bool {
        self.inner.destroy()
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.base.is_destroyed()
    }

    pub fn render_props(&self) -> RenderProps {
        self.inner.render_props()
    }

    pub fn set_payload(&self, page: Page) {
        if !self.is_destroyed() {
            lock(&self.inner.view).page = page;
        }
    }

    pub fn set_disabled(&self, slot: usize, disabled: bool) {
        if self.is_destroyed() {
            return;
        }
        if let Some(control) = lock(&self.inner.view).controls.get_mut(slot) {
            control.disabled = disabled;
        }
    }

    pub fn disable_all(&self) {
        if self.is_destroyed() {
            return;
        }
        for control in lock(&self.inner.view).controls.iter_mut() {
            if !control.is_link() {
                control.disabled = true;
            }
        }
    }

    /// Answer `interaction`, a press on this widget, with the current state.
    pub async fn respond(&self, interaction: &dyn InteractionHandle) -> Result<(), TransportError> {
        self.inner
            .base
            .respond(interaction, self.render_props())
            .await
    }

    /// Push the current state to the attached message.
    pub async fn refresh(&self) {
        self.inner.base.edit_or_log(self.render_props()).await;
    }

    pub async fn send_in(&self, channel_id: u64) -> Result<(), WidgetError> {
        self.inner
            .base
            .send_in(channel_id, self.render_props())
            .await?;
        Ok(())
    }

    pub fn attach_to(&self, handle: MessageHandle) {
        self.inner.base.attach(handle);
    }

    pub fn message(&self) -> Option<MessageHandle> {
        self.inner.base.message()
    }
}

impl Inner {
    fn render_props(&self) -> RenderProps {
        let view = lock(&self.view);

        RenderProps {
            page: view.page.clone(),
            controls: view
                .controls
                .iter()
                .enumerate()
                .map(|(slot, control)| RenderedControl {
                    custom_id: (!control.is_link())
                        .then(|| self.base.component_id(slot).to_string()),
                    control: control.clone(),
                })
                .collect(),
        }
    }

    fn destroy(&self) -> bool {
        let page = lock(&self.view).page.clone();
        self.base.destroy(RenderProps::bare(page))
    }

    fn expire(&self) {
        tracing::debug!("[WIDGET] button message {} timed out", self.base.id());
        self.base.emit(WidgetEvent::Timeout);
        self.destroy();
    }
}

#[async_trait]
impl Pressable for Inner {
    fn is_destroyed(&self) -> bool {
        self.base.is_destroyed()
    }

    async fn on_press(self: Arc<Self>, slot: usize, interaction: Arc<dyn InteractionHandle>) {
        if self.base.is_destroyed() {
            return;
        }

        let control = lock(&self.view).controls.get(slot).cloned();
        let Some(control) = control else {
            return;
        };

        let now = interaction.created_at();
        if !self.window.allowed(interaction.user_id(), now) {
            let notice = self.window.denial_notice(now);
            if let Err(e) = interaction.reply(notice, true).await {
                tracing::warn!("[WIDGET] failed to send permission notice: {}", e);
            }
            return;
        }

        self.base.emit(WidgetEvent::Press(Press {
            slot,
            control,
            interaction,
        }));
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.base.release();
    }
}
