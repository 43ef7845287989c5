pub mod analyze;
pub mod config;
pub mod demo;
pub mod error;
pub mod event;
pub mod record;
pub mod recording;
pub mod replay;
pub mod snapshot;
pub mod time;
pub mod transfer;

pub use error::{Error, Result};

#[cfg(test)]
mod test;
