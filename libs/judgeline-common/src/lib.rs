pub mod config;
pub mod error;
pub mod languages;
pub mod types;

pub use error::{ErrorKind, JudgeError};
