pub mod bus;
pub mod event;
pub mod sinks;

pub use bus::EventBus;
pub use event::{Event, Severity, FIELD_ACT, FIELD_REQUEST, FIELD_SRC};
pub use sinks::{build_sinks, cef_line, DebugLog, Sink, SinkConfig};
