pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{font::TrueTypeFont, storage::LocalStorage};
pub use config::CardConfig;
pub use core::{engine::CardEngine, intervals::IntervalEngine, pipeline::CardPipeline};
pub use utils::error::{CardError, Result};
