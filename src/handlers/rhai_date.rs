//! Date support for rhai scripts.

use super::{HandlerError, ScriptInvocationHandler};
use crate::value::CellValue;

/// Helper functions prepended to every rhai script, sugar over the
/// engine-native `today()`.
const DATE_PRELUDE: &str =
    "fn today_minus(days) { today() - days }\nfn today_plus(days) { today() + days }\n";

/// Standard handler for rhai scripts.
///
/// Adds commonly used date helpers to the beginning of each script and
/// converts date results into `%Y-%m-%d` text, which a database insertion
/// pipeline can coerce into the target column type.
#[derive(Debug, Default)]
pub struct RhaiDateHandler;

impl RhaiDateHandler {
    pub fn new() -> Self {
        Self
    }
}

impl ScriptInvocationHandler for RhaiDateHandler {
    fn language(&self) -> Option<&str> {
        Some("rhai")
    }

    fn pre_invoke(&mut self, script: String) -> Result<String, HandlerError> {
        Ok(format!("{}{}", DATE_PRELUDE, script))
    }

    fn post_invoke(&mut self, value: CellValue) -> Result<CellValue, HandlerError> {
        match value {
            CellValue::DateTime(value) => Ok(CellValue::Text(value.format("%Y-%m-%d").to_string())),
            other => Ok(other),
        }
    }
}
