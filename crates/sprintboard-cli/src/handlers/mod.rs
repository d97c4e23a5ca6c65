pub mod export;
pub mod sprint;
pub mod time_log;
