//! Types library for the match-making service
//!
//! Shared vocabulary between the matching engine and the gateway.
//!
//! # Modules
//! - `ids`: Identifiers (UserId, SessionId)
//! - `difficulty`: Question difficulty / queue bucket key
//! - `request`: Inbound submissions and validated match requests
//! - `session`: Finalized sessions and match quality tags
//! - `errors`: Error taxonomy

pub mod ids;
pub mod difficulty;
pub mod request;
pub mod session;
pub mod errors;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::difficulty::*;
    pub use crate::request::*;
    pub use crate::session::*;
    pub use crate::errors::*;
}
