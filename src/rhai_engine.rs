//! Rhai script engine adapter.
//!
//! Registers a small set of fixture-oriented functions (calendar arithmetic,
//! string reversal) so data-set scripts have the helpers a host language's
//! standard library would otherwise provide.

use crate::engine::{EngineError, ScriptEngine};
use crate::value::CellValue;
use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use rhai::{Dynamic, Engine, EvalAltResult};

/// Embedded engine for the rhai scripting language.
pub struct RhaiEngine {
    engine: Engine,
}

impl RhaiEngine {
    pub fn new() -> Self {
        let mut engine = Engine::new();

        // keep fixture scripts bounded
        engine.set_max_expr_depths(25, 10);
        engine.set_max_operations(100_000);

        Self::register_fixture_functions(&mut engine);

        Self { engine }
    }

    fn register_fixture_functions(engine: &mut Engine) {
        engine.register_type_with_name::<NaiveDate>("Date");

        engine.register_fn("today", || Local::now().date_naive());

        engine.register_fn("date", |text: &str| -> Result<NaiveDate, Box<EvalAltResult>> {
            NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|e| e.to_string().into())
        });

        engine.register_fn("+", |date: NaiveDate, days: i64| date + Duration::days(days));
        engine.register_fn("-", |date: NaiveDate, days: i64| date - Duration::days(days));

        engine.register_fn("to_string", |date: NaiveDate| date.format("%Y-%m-%d").to_string());

        engine.register_fn("reverse", |text: &str| text.chars().rev().collect::<String>());
    }
}

impl Default for RhaiEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptEngine for RhaiEngine {
    fn language(&self) -> &str {
        "rhai"
    }

    fn eval(&mut self, script: &str) -> Result<CellValue, EngineError> {
        let result = self
            .engine
            .eval::<Dynamic>(script)
            .map_err(|e| EngineError::Evaluation(e.to_string()))?;

        dynamic_to_cell_value(result)
    }
}

fn dynamic_to_cell_value(value: Dynamic) -> Result<CellValue, EngineError> {
    if value.is_unit() {
        return Ok(CellValue::Null);
    }
    if let Some(int) = value.clone().try_cast::<i64>() {
        return Ok(CellValue::Integer(int));
    }
    if let Some(float) = value.clone().try_cast::<f64>() {
        return Ok(CellValue::Decimal(float));
    }
    if let Some(flag) = value.clone().try_cast::<bool>() {
        return Ok(CellValue::Bool(flag));
    }
    if let Some(date) = value.clone().try_cast::<NaiveDate>() {
        let midnight = date.and_hms_opt(0, 0, 0).expect("midnight is always a valid time");
        return Ok(CellValue::DateTime(midnight));
    }
    if let Some(datetime) = value.clone().try_cast::<NaiveDateTime>() {
        return Ok(CellValue::DateTime(datetime));
    }
    if value.is_string() {
        let text = value
            .into_string()
            .map_err(|type_name| EngineError::Evaluation(format!("Unsupported script result type: {}", type_name)))?;
        return Ok(CellValue::Text(text));
    }

    Err(EngineError::Evaluation(format!(
        "Unsupported script result type: {}",
        value.type_name()
    )))
}
