use chrono::{DateTime, NaiveDate, Utc};

use crate::project::UserId;

/// Per-request values threaded explicitly through every engine call.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub actor_id: UserId,
    pub locale: String,
    pub now: DateTime<Utc>,
}

impl RequestContext {
    pub fn new(actor_id: UserId) -> Self {
        Self {
            actor_id,
            locale: "en".to_string(),
            now: Utc::now(),
        }
    }

    /// Pin the request clock, mainly for tests and replays.
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }
}
