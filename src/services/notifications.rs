use std::sync::{Mutex, PoisonError};
use tracing::warn;

/// Message sent when adding a product fails
pub const ADD_PRODUCT_FAILED: &str = "Failed to add product";
/// Message sent when removing a product fails
pub const REMOVE_PRODUCT_FAILED: &str = "Failed to remove product";
/// Message sent when changing a quantity fails
pub const UPDATE_AMOUNT_FAILED: &str = "Failed to change product quantity";
/// Message sent when the requested quantity is above the available stock
pub const OUT_OF_STOCK: &str = "Requested quantity out of stock";

/// User-facing error display, fire and forget
pub trait NotificationSink: Send + Sync {
    fn error(&self, message: &str);
}

/// Sink that writes notifications to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotificationSink;

impl NotificationSink for TracingNotificationSink {
    fn error(&self, message: &str) {
        warn!(target: "shoecart_rs::notification", "{}", message);
    }
}

/// Sink that keeps every message, newest last
#[derive(Debug, Default)]
pub struct RecordingNotificationSink {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages received so far
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drain and return the messages received so far
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.messages.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl NotificationSink for RecordingNotificationSink {
    fn error(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }
}
