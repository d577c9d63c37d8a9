//! Multi-page message navigated with first / previous / go-to / next / last
//! buttons.

mod go_to;
pub mod nav;

use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use chrono::Utc;
use serenity::all::ButtonStyle;
use serenity::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::widgets::base::WidgetBase;
use crate::widgets::error::WidgetError;
use crate::widgets::ids::{ComponentId, WidgetId};
use crate::widgets::lifecycle::{Press, WidgetEvent};
use crate::widgets::lock;
use crate::widgets::permission::{AccessRule, PermissionWindow};
use crate::widgets::ports::{InteractionHandle, MessageHandle, TextCollector};
use crate::widgets::registry::Pressable;
use crate::widgets::view::{Control, Page, RenderProps, RenderedControl};
use crate::widgets::WidgetServices;

pub use go_to::parse_page_number;
pub use nav::NavAction;

#[derive(Clone, Debug)]
pub struct PaginatorOptions {
    pub first_last_buttons: bool,
    pub go_to_page_button: bool,
    /// `None` keeps the paginator alive until destroyed explicitly.
    pub timeout: Option<Duration>,
    /// Wrap around at either end instead of stopping.
    pub overflow: bool,
    pub access: AccessRule,
    /// How long the "go to page" prompt waits for an answer.
    pub go_to_timeout: Duration,
    /// Restart the timeout whenever someone navigates.
    pub reset_on_navigate: bool,
}

impl Default for PaginatorOptions {
    fn default() -> Self {
        Self {
            first_last_buttons: true,
            go_to_page_button: true,
            timeout: Some(Duration::from_secs(300)),
            overflow: true,
            access: AccessRule::OwnerOnly,
            go_to_timeout: Duration::from_secs(30),
            reset_on_navigate: true,
        }
    }
}

struct GoToDialog {
    token: u64,
    task: JoinHandle<()>,
}

struct PagerState {
    pages: Vec<Page>,
    index: Option<usize>,
    go_to: Option<GoToDialog>,
    dialogs_opened: u64,
    registered: bool,
    closed: bool,
}

struct Inner {
    base: WidgetBase,
    options: PaginatorOptions,
    layout: Vec<NavAction>,
    window: PermissionWindow,
    collector: Arc<dyn TextCollector>,
    state: Mutex<PagerState>,
    /// Serializes presses so clicks on this widget are handled in order.
    press_lock: tokio::sync::Mutex<()>,
    weak_self: Weak<Inner>,
}

/// Cheap to clone; every clone is the same widget.
#[derive(Clone)]
pub struct Paginator {
    inner: Arc<Inner>,
}

impl Paginator {
    /// Must be called inside a tokio runtime when a timeout is set.
    pub fn new(
        services: &WidgetServices,
        pages: Vec<Page>,
        owner_id: u64,
        options: PaginatorOptions,
    ) -> Self {
        let layout = nav::layout(options.first_last_buttons, options.go_to_page_button);
        let window = PermissionWindow::new(owner_id, options.access, Utc::now());
        let index = nav::refit(None, pages.len());
        let page_count = pages.len();

        let inner = Arc::new_cyclic(|weak: &Weak<Inner>| {
            let expiring = weak.clone();
            Inner {
                base: WidgetBase::new(services, options.timeout, move || {
                    if let Some(inner) = expiring.upgrade() {
                        inner.expire();
                    }
                }),
                options,
                layout,
                window,
                collector: Arc::clone(&services.collector),
                state: Mutex::new(PagerState {
                    pages,
                    index,
                    go_to: None,
                    dialogs_opened: 0,
                    registered: false,
                    closed: false,
                }),
                press_lock: tokio::sync::Mutex::new(()),
                weak_self: weak.clone(),
            }
        });

        inner.sync_registration(&mut lock(&inner.state));
        inner.base.start_timer();

        tracing::debug!(
            "[PAGER] {} created for owner {} with {} pages",
            inner.base.id(),
            owner_id,
            page_count
        );

        Self { inner }
    }

    pub fn id(&self) -> WidgetId {
        self.inner.base.id()
    }

    pub fn owner_id(&self) -> u64 {
        self.inner.window.owner_id()
    }

    pub fn page_count(&self) -> usize {
        self.inner.page_count()
    }

    /// `None` when there are no pages.
    pub fn page_index(&self) -> Option<usize> {
        lock(&self.inner.state).index
    }

    /// Routing id of the control for `action`, while navigation is shown.
    pub fn component_id(&self, action: NavAction) -> Option<ComponentId> {
        let state = lock(&self.inner.state);
        if !state.registered {
            return None;
        }

        self.inner
            .layout
            .iter()
            .position(|a| *a == action)
            .map(|slot| self.inner.base.component_id(slot))
    }

    pub async fn set_pages(&self, pages: Vec<Page>) {
        let props = {
            let mut state = lock(&self.inner.state);
            if state.closed {
                return;
            }

            state.index = nav::refit(state.index, pages.len());
            state.pages = pages;
            self.inner.sync_registration(&mut state);
            self.inner.render_locked(&state)
        };

        self.inner.show(props).await;
    }

    pub async fn set_page_index(&self, index: usize) {
        self.inner
            .update_and_render(|_, len| nav::clamp(index, len))
            .await;
    }

    pub async fn first(&self) {
        self.navigate(NavAction::First).await;
    }

    pub async fn prev(&self) {
        self.navigate(NavAction::Previous).await;
    }

    pub async fn next(&self) {
        self.navigate(NavAction::Next).await;
    }

    pub async fn last(&self) {
        self.navigate(NavAction::Last).await;
    }

    async fn navigate(&self, action: NavAction) {
        let overflow = self.inner.options.overflow;
        self.inner
            .update_and_render(|index, len| nav::step(index, len, action, overflow))
            .await;
    }

    /// The current page plus navigation, or the bare page when there is
    /// nothing to navigate.
    pub fn render_props(&self) -> Result<RenderProps, WidgetError> {
        let state = lock(&self.inner.state);
        self.inner.render_locked(&state)
    }

    /// Ask for a page number in chat and jump there.
    pub async fn ask_go_to_page(&self, interaction: Arc<dyn InteractionHandle>) {
        Arc::clone(&self.inner).open_go_to(interaction).await;
    }

    /// Whether a "go to page" prompt is currently waiting for an answer.
    #[cfg(test)]
    pub fn go_to_open(&self) -> bool {
        lock(&self.inner.state).go_to.is_some()
    }

    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<WidgetEvent> {
        self.inner.base.subscribe()
    }

    /// Resolves once the paginator is destroyed.
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

    pub async fn send_in(&self, channel_id: u64) -> Result<(), WidgetError> {
        let props = self.render_props()?;
        self.inner.base.send_in(channel_id, props).await?;
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
    fn page_count(&self) -> usize {
        lock(&self.state).pages.len()
    }

    /// Navigation controls are routable only while there is more than one page.
    fn sync_registration(&self, state: &mut PagerState) {
        let wanted = !state.closed && state.pages.len() > 1;

        if wanted && !state.registered {
            let slots: Vec<usize> = (0..self.layout.len()).collect();
            let weak: Weak<dyn Pressable> = self.weak_self.clone();
            state.registered = self.base.register(weak, &slots);
        } else if !wanted && state.registered {
            self.base.unregister();
            state.registered = false;
        }
    }

    fn render_locked(&self, state: &PagerState) -> Result<RenderProps, WidgetError> {
        let len = state.pages.len();

        let index = match state.index {
            None if len == 0 => return Ok(RenderProps::default()),
            Some(index) if index < len => index,
            other => {
                return Err(WidgetError::IndexOutOfRange {
                    index: other.map_or(-1, |i| i as i64),
                    len,
                });
            }
        };

        let page = state.pages[index].clone();
        if len == 1 {
            return Ok(RenderProps::bare(page));
        }

        let controls = self
            .layout
            .iter()
            .enumerate()
            .map(|(slot, action)| RenderedControl {
                custom_id: Some(self.base.component_id(slot).to_string()),
                control: self.nav_control(*action, index, len),
            })
            .collect();

        Ok(RenderProps { page, controls })
    }

    fn nav_control(&self, action: NavAction, index: usize, len: usize) -> Control {
        let at_start = index == 0;
        let at_end = index + 1 == len;
        let overflow = self.options.overflow;

        match action {
            NavAction::First => Control::emoji_only("⏮").disabled(at_start),
            NavAction::Previous => Control::emoji_only("◀").disabled(at_start && !overflow),
            NavAction::GoTo => {
                Control::button(format!("{}/{}", index + 1, len)).style(ButtonStyle::Primary)
            }
            NavAction::Next => Control::emoji_only("▶").disabled(at_end && !overflow),
            NavAction::Last => Control::emoji_only("⏭").disabled(at_end),
        }
    }

    async fn show(&self, props: Result<RenderProps, WidgetError>) {
        match props {
            Ok(props) => self.base.edit_or_log(props).await,
            Err(e) => tracing::error!("[PAGER] {} cannot render: {}", self.base.id(), e),
        }
    }

    async fn update_and_render(&self, update: impl FnOnce(Option<usize>, usize) -> Option<usize>) {
        let props = {
            let mut state = lock(&self.state);
            if state.closed {
                return;
            }

            let len = state.pages.len();
            state.index = update(state.index, len);
            self.render_locked(&state)
        };

        self.show(props).await;
    }

    fn destroy(&self) -> bool {
        let (dialog, page) = {
            let mut state = lock(&self.state);
            state.closed = true;
            state.registered = false;

            let page = state
                .index
                .and_then(|i| state.pages.get(i))
                .cloned()
                .unwrap_or_default();

            (state.go_to.take(), page)
        };

        if let Some(dialog) = dialog {
            dialog.task.abort();
        }

        self.base.destroy(RenderProps::bare(page))
    }

    fn expire(&self) {
        tracing::debug!("[PAGER] {} timed out", self.base.id());
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
        let _turn = self.press_lock.lock().await;

        if self.base.is_destroyed() {
            return;
        }

        let Some(&action) = self.layout.get(slot) else {
            return;
        };

        let now = interaction.created_at();
        if !self.window.allowed(interaction.user_id(), now) {
            let notice = self.window.denial_notice(now);
            if let Err(e) = interaction.reply(notice, true).await {
                tracing::warn!("[PAGER] failed to send permission notice: {}", e);
            }
            return;
        }

        if self.options.reset_on_navigate {
            self.base.reset_timeout();
        }

        if action == NavAction::GoTo {
            self.emit_press(slot, action, &interaction);
            Arc::clone(&self).open_go_to(interaction).await;
            return;
        }

        let props = {
            let mut state = lock(&self.state);
            if state.closed {
                return;
            }

            let len = state.pages.len();
            state.index = nav::step(state.index, len, action, self.options.overflow);
            self.render_locked(&state)
        };

        self.emit_press(slot, action, &interaction);

        match props {
            Ok(props) => {
                if let Err(e) = self.base.respond(interaction.as_ref(), props).await {
                    tracing::warn!("[PAGER] failed to update {}: {}", self.base.id(), e);
                }
            }
            Err(e) => {
                tracing::error!("[PAGER] {} cannot render: {}", self.base.id(), e);
                if let Err(e) = interaction.acknowledge().await {
                    tracing::warn!("[PAGER] failed to acknowledge press on {}: {}", self.base.id(), e);
                }
            }
        }
    }
}

impl Inner {
    fn emit_press(&self, slot: usize, action: NavAction, interaction: &Arc<dyn InteractionHandle>) {
        let control = {
            let state = lock(&self.state);
            let len = state.pages.len();
            self.nav_control(action, state.index.unwrap_or(0), len.max(1))
        };

        self.base.emit(WidgetEvent::Press(Press {
            slot,
            control,
            interaction: Arc::clone(interaction),
        }));
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.base.release();
    }
}
