pub mod health;
pub mod matching;
pub mod session;
pub mod ws;
