//! `milelog` - Guided business mileage logging
//!
//! This library walks a driver through recording one business journey at a
//! time (start location, purpose, odometer readings, end location), keeps
//! completed journeys in a persistent store, and renders them as plain text
//! for sharing or saving.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod export;
pub mod journey;
pub mod location;
pub mod logging;
pub mod machine;
pub mod session;
pub mod storage;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use error::{Error, Result};
pub use export::{ExportVariant, FileSink, ShareChain, ShareOutcome};
pub use journey::{JourneyDraft, JourneyId, JourneyRecord};
pub use location::Locator;
pub use logging::init_logging;
pub use machine::{JourneyMachine, JourneyStep};
pub use session::Session;
pub use storage::{JourneyStore, MemoryStore, SqliteStore};
