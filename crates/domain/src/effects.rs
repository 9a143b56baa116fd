//! Policy for advisory side effects.
//!
//! Session directory writes and client notifications must never fail the
//! durable operation they follow. `best_effort` swallows their errors into
//! a warning and reports the outcome for callers that want to count it.

/// Outcome of an advisory side effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advisory {
    Completed,
    Failed,
}

/// Run the result of an advisory operation through the logging policy.
pub fn best_effort<T>(op: &'static str, result: anyhow::Result<T>) -> Advisory {
    match result {
        Ok(_) => Advisory::Completed,
        Err(error) => {
            tracing::warn!(op, ?error, "advisory side effect failed");
            Advisory::Failed
        }
    }
}
