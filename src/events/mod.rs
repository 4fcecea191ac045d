//! Game event logging
//!
//! Provides a compact text format for logging match events, an in-memory
//! EventBus that systems emit into, and the SQLite logger that stores them.

mod bus;
mod format;
mod sqlite_logger;
mod types;

pub use bus::{BusEvent, EventBus, update_event_bus_time};
pub use format::{parse_event, serialize_event};
pub use sqlite_logger::{SqliteEventLogger, flush_events_to_sqlite};
pub use types::{GameConfig, GameEvent};
