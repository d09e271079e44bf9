pub mod config;
pub mod delta;
pub mod error;
pub mod extract;
pub mod index;
pub mod ingest;
pub mod io;
pub mod paths;
pub mod ticker;
pub mod types;

pub use error::{EarningsError, Result};
pub use ticker::Ticker;
