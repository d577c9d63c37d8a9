//! Interactive widgets: messages with buttons that route clicks back to the
//! in-memory object that owns them, expire on their own and clean up after
//! themselves.
//!
//! Nothing in here talks to Discord directly. The bot layer supplies the
//! collaborators in [`ports`] and renders [`view::RenderProps`].

mod base;
pub mod button_message;
pub mod error;
pub mod ids;
pub mod lifecycle;
pub mod paginator;
pub mod permission;
pub mod ports;
pub mod registry;
pub mod timer;
pub mod view;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub use button_message::{ButtonMessage, ButtonMessageOptions};
pub use error::{TransportError, WidgetError};
pub use ids::{ComponentId, WidgetId};
pub use lifecycle::{Press, WidgetEvent};
pub use paginator::{Paginator, PaginatorOptions};
pub use permission::{AccessRule, PermissionWindow};
pub use ports::{CollectedText, InteractionHandle, MessageHandle, MessageTransport, TextCollector};
pub use registry::ComponentRegistry;
pub use view::{Control, Page, RenderProps};

/// Everything a widget needs from the outside world.
#[derive(Clone)]
pub struct WidgetServices {
    pub registry: Arc<ComponentRegistry>,
    pub transport: Arc<dyn MessageTransport>,
    pub collector: Arc<dyn TextCollector>,
}

/// Widget state stays usable after a panicking handler; the data behind these
/// locks is never left half-written.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
