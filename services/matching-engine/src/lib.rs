//! Matching Engine Service
//!
//! Pairs users who want a live practice session. Requests wait in one
//! bucket per difficulty; a partner must share at least one topic and sit
//! within a skill threshold that widens the longer a request waits. A
//! tentative pair becomes a session only after both sides confirm.
//!
//! **Key Invariants:**
//! - A user is in at most one bucket or one pending confirmation
//! - Never match across difficulties or without a common topic
//! - Deterministic given the same inputs and timestamps
//! - Every pending confirmation and queued request has a live timer

pub mod config;
pub mod confirmation;
pub mod engine;
pub mod events;
pub mod intake;
pub mod matching;
pub mod notifier;
pub mod queue;
pub mod scoring;
pub mod session;
pub mod supervisor;

pub use config::{ConfigError, MatchConfig};
pub use engine::{ConfirmOutcome, ConfirmStatus, EngineStats, MatchingEngine, SubmitOutcome, TickReport};
pub use events::{MatchEvent, SessionHandoff};
pub use notifier::{MemoryNotifier, Notifier};
