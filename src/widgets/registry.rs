use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, Weak};

use serenity::async_trait;

use crate::widgets::ids::{ComponentId, WidgetId};
use crate::widgets::lock;
use crate::widgets::ports::InteractionHandle;

/// The side of a widget the registry gets to see.
#[async_trait]
pub trait Pressable: Send + Sync {
    fn is_destroyed(&self) -> bool;

    /// Handle a click on `slot`. Called outside the registry lock.
    async fn on_press(self: Arc<Self>, slot: usize, interaction: Arc<dyn InteractionHandle>);
}

struct Entry {
    widget: Weak<dyn Pressable>,
    slots: Vec<usize>,
}

/// Maps live widget ids to the widgets that own them and routes clicks.
///
/// Holds only weak references: the feature that created a widget owns it.
pub struct ComponentRegistry {
    epoch: u32,
    next_sequence: AtomicU32,
    entries: Mutex<HashMap<WidgetId, Entry>>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::with_epoch(rand::random())
    }

    pub fn with_epoch(epoch: u32) -> Self {
        Self {
            epoch,
            next_sequence: AtomicU32::new(0),
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// A widget id never handed out before by this registry.
    pub fn mint_id(&self) -> WidgetId {
        let sequence = self.next_sequence.fetch_add(1, Ordering::Relaxed);
        WidgetId::from_parts(self.epoch, sequence)
    }

    /// Make `slots` of `id` routable. Returns `false` and changes nothing if
    /// the widget is already registered.
    pub fn register(&self, id: WidgetId, widget: Weak<dyn Pressable>, slots: &[usize]) -> bool {
        let mut entries = lock(&self.entries);

        if entries.contains_key(&id) {
            return false;
        }

        entries.insert(
            id,
            Entry {
                widget,
                slots: slots.to_vec(),
            },
        );
        tracing::trace!("[WIDGET] registered {} with {} slots", id, slots.len());

        true
    }

    pub fn unregister(&self, id: WidgetId) -> bool {
        let removed = lock(&self.entries).remove(&id).is_some();
        if removed {
            tracing::trace!("[WIDGET] unregistered {}", id);
        }
        removed
    }

    #[cfg(test)]
    pub fn is_registered(&self, id: WidgetId) -> bool {
        lock(&self.entries).contains_key(&id)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver a click to whichever live widget owns `raw_id`.
    ///
    /// Returns `false` when the click was dropped: malformed id, unknown or
    /// destroyed widget, or a slot the widget does not route. Never fails.
    pub async fn dispatch(&self, raw_id: &str, interaction: Arc<dyn InteractionHandle>) -> bool {
        let Some(component) = ComponentId::parse(raw_id) else {
            tracing::debug!("[WIDGET] ignoring foreign component id {}", raw_id);
            return false;
        };

        let widget = {
            let mut entries = lock(&self.entries);

            match entries.get(&component.widget) {
                Some(entry) if entry.slots.contains(&component.slot) => {
                    match entry.widget.upgrade() {
                        Some(widget) if !widget.is_destroyed() => Some(widget),
                        Some(_) => None,
                        None => {
                            entries.remove(&component.widget);
                            None
                        }
                    }
                }
                _ => None,
            }
        };

        match widget {
            Some(widget) => {
                widget.on_press(component.slot, interaction).await;
                true
            }
            None => {
                tracing::debug!("[WIDGET] dropped stale click on {}", raw_id);
                false
            }
        }
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::fakes::FakeInteraction;
    use std::sync::atomic::{AtomicBool, AtomicUsize};

    #[derive(Default)]
    struct Probe {
        presses: AtomicUsize,
        last_slot: AtomicUsize,
        destroyed: AtomicBool,
    }

    #[async_trait]
    impl Pressable for Probe {
        fn is_destroyed(&self) -> bool {
            self.destroyed.load(Ordering::SeqCst)
        }

        async fn on_press(self: Arc<Self>, slot: usize, _interaction: Arc<dyn InteractionHandle>) {
            self.presses.fetch_add(1, Ordering::SeqCst);
            self.last_slot.store(slot, Ordering::SeqCst);
        }
    }

    fn click(id: ComponentId) -> Arc<dyn InteractionHandle> {
        Arc::new(FakeInteraction::new(7, id.to_string()))
    }

    #[test]
    fn test_minted_ids_are_unique() {
        let registry = ComponentRegistry::with_epoch(9);
        let a = registry.mint_id();
        let b = registry.mint_id();
        assert_ne!(a, b);
        assert_eq!(a.raw() >> 32, 9);
    }

    #[tokio::test]
    async fn test_dispatch_routes_to_slot() {
        let registry = ComponentRegistry::new();
        let probe = Arc::new(Probe::default());
        let id = registry.mint_id();
        let weak: Weak<dyn Pressable> = Arc::downgrade(&probe) as Weak<dyn Pressable>;

        assert!(registry.register(id, weak.clone(), &[0, 2]));
        assert!(!registry.register(id, weak, &[5]));

        let target = ComponentId::new(id, 2);
        assert!(registry.dispatch(&target.to_string(), click(target)).await);
        assert_eq!(probe.presses.load(Ordering::SeqCst), 1);
        assert_eq!(probe.last_slot.load(Ordering::SeqCst), 2);

        // Slot 1 (a link, say) and slot 5 (the ignored re-registration) are not routed.
        for slot in [1, 5] {
            let other = ComponentId::new(id, slot);
            assert!(!registry.dispatch(&other.to_string(), click(other)).await);
        }
        assert_eq!(probe.presses.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dispatch_drops_unknown_and_malformed() {
        let registry = ComponentRegistry::new();
        let stranger = ComponentId::new(registry.mint_id(), 0);

        assert!(!registry.dispatch(&stranger.to_string(), click(stranger)).await);
        assert!(!registry.dispatch("help_page_2", click(stranger)).await);
    }

    #[tokio::test]
    async fn test_dispatch_skips_destroyed_and_dropped_widgets() {
        let registry = ComponentRegistry::new();

        let destroyed = Arc::new(Probe::default());
        destroyed.destroyed.store(true, Ordering::SeqCst);
        let destroyed_id = registry.mint_id();
        registry.register(destroyed_id, Arc::downgrade(&destroyed) as Weak<dyn Pressable>, &[0]);

        let dropped_id = registry.mint_id();
        {
            let dropped = Arc::new(Probe::default());
            registry.register(dropped_id, Arc::downgrade(&dropped) as Weak<dyn Pressable>, &[0]);
        }

        let a = ComponentId::new(destroyed_id, 0);
        let b = ComponentId::new(dropped_id, 0);
        assert!(!registry.dispatch(&a.to_string(), click(a)).await);
        assert!(!registry.dispatch(&b.to_string(), click(b)).await);

        assert_eq!(destroyed.presses.load(Ordering::SeqCst), 0);
        assert!(!registry.is_registered(dropped_id));
        assert!(registry.is_registered(destroyed_id));
    }

    #[test]
    fn test_unregister_reports_removal_once() {
        let registry = ComponentRegistry::new();
        let probe = Arc::new(Probe::default());
        let id = registry.mint_id();
        registry.register(id, Arc::downgrade(&probe) as Weak<dyn Pressable>, &[0]);

        assert_eq!(registry.len(), 1);
        assert!(registry.unregister(id));
        assert!(!registry.unregister(id));
        assert!(registry.is_empty());
    }
}
