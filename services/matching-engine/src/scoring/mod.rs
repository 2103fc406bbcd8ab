//! Pure scoring functions used as matching inputs

pub mod skill;
pub mod topics;

pub use topics::{common_topics, has_common_topic, normalize_topics};
