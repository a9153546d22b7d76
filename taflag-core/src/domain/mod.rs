//! Domain types for the signal-derivation and trade-matching engine.

pub mod bar;
pub mod signal;
pub mod timestamp;
pub mod trade;

pub use bar::{format_timestamp, Bar, TIMESTAMP_FORMAT};
pub use signal::{IndicatorName, SignalAction, SignalEvent};
pub use trade::{realized_profit, ClosedTrade, OpenPosition};
