pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::ChemPredictConfig;
pub use error::{ChemError, Result};
pub use types::*;
