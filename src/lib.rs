pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;
pub use config::TrackerConfig;

pub use adapters::{AmadeusClient, NotificationManager, SheetyClient};
pub use core::tracker::{FlightTracker, TrackerOptions};
pub use utils::error::{Result, TrackerError};
