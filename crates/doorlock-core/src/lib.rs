pub mod allow_list;
pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod types;

pub use allow_list::AllowList;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{AccessConfig, AccessConfigBuilder};
pub use error::{Error, Result};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
