//! pump-history: a pure-rust decoder for insulin pump history pages.
//!
//! A pump keeps its event history as a sequence of fixed-size pages. This
//! library splits such a page into [`HistoryRecord`]s (in the [`history`]
//! module) and decodes their timestamps ([`timestamp`]), quantities
//! ([`units`]) and the settings schedules some records carry ([`schedule`]).
//!
//! ```
//! use pump_history::{decode_page, Generation};
//!
//! let mut page = vec![0x21, 0x00, 0x2D, 0xDE, 0x0A, 0x0F, 0x10];
//! page.resize(1024, 0);
//!
//! let (history, error) = decode_page(&page, Generation::Older);
//! assert!(error.is_none());
//! assert_eq!(history.len(), 1);
//! assert_eq!(history[0].time.unwrap().to_string(), "2016-03-15 10:30:45");
//! ```

mod error;
pub use error::DecodeError;

pub mod history;
pub use history::{
    decode_page, decode_record, reverse_history, Generation, History, HistoryRecord, Info,
    RecordType,
};

pub mod schedule;

pub mod timestamp;
pub use timestamp::Timestamp;

pub mod units;

#[macro_use]
mod fmt;
#[cfg(test)]
mod tests;

pub use fmt::{LogItem, LogOutput, Loggable, Logger};
