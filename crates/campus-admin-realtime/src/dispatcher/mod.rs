//! Event dispatcher: multiplexes push-channel events to local listeners.

pub mod listener;
pub mod registry;
pub mod subscription;

pub use listener::Listener;
pub use registry::EventDispatcher;
pub use subscription::Subscription;
