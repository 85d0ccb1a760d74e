// Services module - business logic layer

pub mod cart_store;
pub mod notifications;
pub mod subscribers;

pub use cart_store::CartStore;
pub use notifications::{NotificationSink, RecordingNotificationSink, TracingNotificationSink};
pub use subscribers::{SubscriptionId, Subscribers};
