use std::sync::{Mutex, PoisonError};

use tracing::warn;

use crate::api::status_code;
use crate::domain::{DeadLetterQueue, Error};

/// Logs every rejected command as a warning.
#[derive(Default, Debug)]
pub struct TracingDLQ {}

impl DeadLetterQueue for TracingDLQ {
    fn report(&self, error: &Error) {
        warn!(%error, status = status_code(error), "command dead-lettered");
    }
}

/// Keeps rejected commands' messages for later inspection.
#[derive(Default, Debug)]
pub struct MemoryDLQ {
    messages: Mutex<Vec<String>>,
}

impl MemoryDLQ {
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl DeadLetterQueue for MemoryDLQ {
    fn report(&self, error: &Error) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(error.to_string());
    }
}
