use std::fmt;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use crate::widgets::lock;
use crate::widgets::ports::InteractionHandle;
use crate::widgets::view::Control;

/// Everything a widget tells its subscribers.
#[derive(Clone)]
pub enum WidgetEvent {
    Press(Press),
    /// The widget ran out of time. Always followed by [`WidgetEvent::Destroy`].
    Timeout,
    /// Last event a subscriber ever sees.
    Destroy,
}

impl fmt::Debug for WidgetEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Press(press) => f
                .debug_struct("Press")
                .field("slot", &press.slot)
                .field("user_id", &press.interaction.user_id())
                .finish(),
            Self::Timeout => f.write_str("Timeout"),
            Self::Destroy => f.write_str("Destroy"),
        }
    }
}

/// A click on one of the widget's own controls.
#[derive(Clone)]
pub struct Press {
    pub slot: usize,
    pub control: Control,
    pub interaction: Arc<dyn InteractionHandle>,
}

struct Listeners<E> {
    destroyed: bool,
    senders: Vec<mpsc::UnboundedSender<E>>,
}

/// Destroy-once semantics plus a list of event subscribers.
pub struct Lifecycle<E> {
    listeners: Mutex<Listeners<E>>,
}

impl<E: Clone> Lifecycle<E> {
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(Listeners {
                destroyed: false,
                senders: Vec::new(),
            }),
        }
    }

    /// A receiver for every event emitted from now on. After destroy the
    /// receiver is already closed.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<E> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut listeners = lock(&self.listeners);

        if !listeners.destroyed {
            listeners.senders.push(tx);
        }

        rx
    }

    pub fn emit(&self, event: E) {
        let mut listeners = lock(&self.listeners);

        if listeners.destroyed {
            return;
        }

        listeners
            .senders
            .retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Deliver `event` to the current subscribers, then drop all of them.
    /// Returns `false` if this was already destroyed.
    pub fn destroy(&self, event: E) -> bool {
        let senders = {
            let mut listeners = lock(&self.listeners);

            if listeners.destroyed {
                return false;
            }

            listeners.destroyed = true;
            std::mem::take(&mut listeners.senders)
        };

        for tx in senders {
            let _ = tx.send(event.clone());
        }

        true
    }

    pub fn is_destroyed(&self) -> bool {
        lock(&self.listeners).destroyed
    }

    #[cfg(test)]
    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).senders.len()
    }
}

impl<E: Clone> Default for Lifecycle<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    enum Event {
        Ping,
        Gone,
    }

    #[test]
    fn test_destroy_is_delivered_once_then_stream_ends() {
        let lifecycle = Lifecycle::new();
        let mut rx = lifecycle.subscribe();

        lifecycle.emit(Event::Ping);
        assert!(lifecycle.destroy(Event::Gone));
        assert!(!lifecycle.destroy(Event::Gone));
        assert!(!lifecycle.destroy(Event::Gone));

        assert_eq!(rx.try_recv(), Ok(Event::Ping));
        assert_eq!(rx.try_recv(), Ok(Event::Gone));
        assert!(matches!(
            rx.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        ));
    }

    #[test]
    fn test_late_subscribers_are_also_dropped() {
        let lifecycle = Lifecycle::new();
        let _early = lifecycle.subscribe();
        let mut late = lifecycle.subscribe();
        assert_eq!(lifecycle.listener_count(), 2);

        lifecycle.destroy(Event::Gone);

        assert_eq!(lifecycle.listener_count(), 0);
        assert_eq!(late.try_recv(), Ok(Event::Gone));
    }

    #[test]
    fn test_subscribe_after_destroy_is_closed() {
        let lifecycle = Lifecycle::new();
        lifecycle.destroy(Event::Gone);
        lifecycle.emit(Event::Ping);

        let mut rx = lifecycle.subscribe();
        assert!(matches!(
            rx.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        ));
    }

    #[test]
    fn test_emit_forgets_dropped_receivers() {
        let lifecycle = Lifecycle::new();
        let rx = lifecycle.subscribe();
        drop(rx);

        lifecycle.emit(Event::Ping);
        assert_eq!(lifecycle.listener_count(), 0);
    }
}
