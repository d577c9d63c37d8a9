use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::widgets::lock;

type OnFire = Arc<dyn Fn() + Send + Sync>;

struct TimerState {
    generation: u64,
    task: Option<JoinHandle<()>>,
    stopped: bool,
}

/// The single auto-destroy deadline of a widget.
///
/// Every (re)schedule bumps a generation number under the lock; a sleeping
/// task only fires if its generation is still current, so a reset racing with
/// expiry can never produce two firings.
pub struct WidgetTimer {
    duration: Option<Duration>,
    state: Arc<Mutex<TimerState>>,
    on_fire: OnFire,
}

impl WidgetTimer {
    /// A timer that is not running yet. `None` never expires.
    pub fn new(duration: Option<Duration>, on_fire: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            duration,
            state: Arc::new(Mutex::new(TimerState {
                generation: 0,
                task: None,
                stopped: false,
            })),
            on_fire: Arc::new(on_fire),
        }
    }

    pub fn start(&self) {
        self.reset();
    }

    /// Cancel the pending deadline and schedule a new one from now.
    /// Does nothing once the timer fired or was cancelled.
    pub fn reset(&self) {
        let Some(duration) = self.duration else {
            return;
        };

        let mut state = lock(&self.state);

        if state.stopped {
            return;
        }

        if let Some(task) = state.task.take() {
            task.abort();
        }

        state.generation += 1;
        let generation = state.generation;
        let shared = Arc::clone(&self.state);
        let on_fire = Arc::clone(&self.on_fire);

        state.task = Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;

            let fire = {
                let mut state = lock(&shared);
                if state.stopped || state.generation != generation {
                    false
                } else {
                    state.stopped = true;
                    state.task = None;
                    true
                }
            };

            if fire {
                on_fire();
            }
        }));
    }

    /// Stop for good.
    pub fn cancel(&self) {
        let mut state = lock(&self.state);
        state.stopped = true;

        if let Some(task) = state.task.take() {
            task.abort();
        }
    }

    #[cfg(test)]
    pub fn is_armed(&self) -> bool {
        let state = lock(&self.state);
        !state.stopped && state.task.is_some()
    }
}
