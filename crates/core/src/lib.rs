pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod store;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use config::Config;
pub use error::{Error, Result};
