use std::sync::Arc;

use serenity::all::Context;

use crate::bot::platform::{SerenityCollector, SerenityTransport};
use crate::config::Config;
use crate::widgets::{ComponentRegistry, WidgetServices};

pub struct Handler {
    pub registry: Arc<ComponentRegistry>,
    pub config: Config,
}

impl Handler {
    pub fn new(config: Config) -> Self {
        Handler {
            registry: Arc::new(ComponentRegistry::new()),
            config,
        }
    }

    /// Collaborators for widgets created while handling an event on `context`.
    pub fn widgets(&self, context: &Context) -> WidgetServices {
        WidgetServices {
            registry: Arc::clone(&self.registry),
            transport: Arc::new(SerenityTransport::new(Arc::clone(&context.http))),
            collector: Arc::new(SerenityCollector::new(context.shard.clone())),
        }
    }
}
