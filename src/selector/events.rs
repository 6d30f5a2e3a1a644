//! Change-notification events for the selector.
//!
//! Services emit events when shared selector state changes; registered
//! handlers react independently. Handler failures are logged and never stop
//! the remaining handlers.

use crate::store::types::{DeriveType, SelectorError};
use std::sync::Arc;

/// Events emitted by the selector services.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorEvent {
    /// The network-scoped global derive type was written with a new value.
    GlobalDeriveTypeChanged {
        network_id: String,
        derive_type: DeriveType,
    },
}

/// Trait for reacting to selector events.
#[async_trait::async_trait]
pub trait SelectorEventHandler: Send + Sync {
    async fn handle(&self, event: &SelectorEvent) -> Result<(), SelectorError>;

    /// Name used for logging and diagnostics.
    fn name(&self) -> &'static str;
}

/// Dispatcher fanning events out to all registered handlers.
#[derive(Default)]
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn SelectorEventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handlers are called in registration order.
    pub fn register_handler(&mut self, handler: Arc<dyn SelectorEventHandler>) {
        self.handlers.push(handler);
    }

    /// Dispatch an event to all handlers. Errors from one handler do not stop
    /// the others.
    pub async fn dispatch(&self, event: &SelectorEvent) {
        for handler in &self.handlers {
            if let Err(e) = handler.handle(event).await {
                tracing::error!("Handler {} failed to process event: {}", handler.name(), e);
            }
        }
    }
}
