pub mod fixtures;

use deepr::{DeeprError, Outcome};
use serde_json::Value;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Takes the result of an invocation that must not have suspended.
pub fn ready(outcome: Outcome) -> Result<Value, DeeprError> {
    match outcome.into_ready() {
        Ok(result) => result,
        Err(_) => panic!("expected an immediate result, the invocation was deferred"),
    }
}
