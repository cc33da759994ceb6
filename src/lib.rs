//! # scriptable-dataset
//!
//! A decorator for tabular test data sets that evaluates script expressions
//! embedded in field values. A fixture cell like `rhai:today() - 14` is
//! replaced, at read time, by the result of running the remainder of the
//! cell through the script engine registered for the `rhai:` prefix, so
//! fixtures can contain computed values (relative dates, reversed strings,
//! arithmetic) instead of only static literals.
//!
//! ## Features
//!
//! - **Transparent wrapping**: [`ScriptableDataSet`] exposes the same table
//!   contract as the data set it wraps, so existing consumers need no changes
//! - **Per-language bindings**: several [`ScriptConfig`]s can be active at
//!   once, each pairing a language with the cell prefix that activates it
//! - **Invocation handlers**: pre/post hooks around each script execution,
//!   per configuration or registered as standard handlers for a language
//! - **Embedded rhai engine**: ships with fixture helpers (date arithmetic,
//!   string reversal); further engines plug into the [`EngineRegistry`]
//!
//! ## Example
//!
//! ```
//! use scriptable_dataset::{
//!     CellValue, DataSet, MemoryDataSet, MemoryTable, ScriptConfig, ScriptableDataSet,
//! };
//!
//! # fn main() -> Result<(), scriptable_dataset::DataSetError> {
//! let wrapped = MemoryDataSet::new().with_table(
//!     MemoryTable::new("location", ["num", "addr"]).with_row(vec![
//!         CellValue::from("rhai:12 / 2"),
//!         CellValue::from(r#"rhai:reverse("Webster Street")"#),
//!     ]),
//! );
//!
//! let data_set =
//!     ScriptableDataSet::new(Box::new(wrapped), vec![ScriptConfig::new("rhai", "rhai:")])?;
//!
//! let mut tables = data_set.iterator()?;
//! while tables.advance()? {
//!     let table = tables.table()?;
//!     assert_eq!(table.value(0, "num")?, CellValue::Integer(6));
//!     assert_eq!(table.value(0, "addr")?, CellValue::from("teertS retsbeW"));
//! }
//! # Ok(())
//! # }
//! ```

// Core modules
pub mod config;
pub mod dataset;
pub mod decorator;
pub mod engine;
pub mod handlers;
pub mod memory;
pub mod rhai_engine;
pub mod table;
pub mod value;

// Re-export key types
pub use config::ScriptConfig;
pub use dataset::{DataSet, DataSetError, Table, TableIterator, TableMetaData};
pub use decorator::{ScriptableDataSet, ScriptableIterator};
pub use engine::{EngineError, EngineFactory, EngineRegistry, ScriptEngine, SharedEngine};
pub use handlers::{
    HandlerError, HandlerFactory, HandlerRef, RhaiDateHandler, ScriptInvocationHandler,
    StandardHandlerRegistry,
};
pub use memory::{MemoryDataSet, MemoryTable};
pub use rhai_engine::RhaiEngine;
pub use table::ScriptableTable;
pub use value::CellValue;
