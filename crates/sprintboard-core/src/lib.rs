pub mod config;
pub mod duration;
pub mod error;
pub mod result;

pub use config::EngineConfig;
pub use duration::{format_duration, parse_duration, Seconds};
pub use error::{Rejection, RejectionCode, SprintboardError};
pub use result::SprintboardResult;
