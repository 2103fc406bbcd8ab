//! Match queue infrastructure module
//!
//! Contains the per-difficulty bucket and the book holding all buckets.

pub mod bucket;
pub mod book;

pub use bucket::MatchQueue;
pub use book::QueueBook;
