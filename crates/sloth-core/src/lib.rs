pub mod analysis;
pub mod config;
pub mod error;
pub mod log;
pub mod pipeline;
pub mod render;

pub use config::Config;
pub use error::{Error, Result};
