//! UCI engine client for tactician.

pub mod client;
pub mod error;
pub mod message;

pub use client::UciOracle;
pub use error::UciError;
pub use message::{Bound, EngineMessage, InfoLine, parse_message};
