mod channel;
mod event_types;
mod hooks;

pub use channel::{EventHandler, EventProducer, Handler, PublishError};
pub use event_types::*;
pub use hooks::{EventHandlers, EventHooks, EventProducers};
