pub mod engine;
pub mod notifier;
pub mod unit_of_work;

pub use engine::SprintEngine;
pub use notifier::{dispatch_events, LoggingNotifier, Notifier};
pub use unit_of_work::{Committed, UnitOfWork};
