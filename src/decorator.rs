//! Data-set and iterator decorators that make script dispatch transparent.

use crate::config::ScriptConfig;
use crate::dataset::{DataSet, DataSetError, Table, TableIterator, TableMetaData};
use crate::engine::EngineRegistry;
use crate::handlers::standard::StandardHandlerRegistry;
use crate::table::ScriptableTable;
use std::sync::Arc;

/// A data set whose string fields may carry script expressions.
///
/// Wraps another data set and exposes the same contract, so existing
/// consumers (such as an insertion or comparison pipeline) need no changes.
/// Every table handed out by its iterators passes through a
/// [`ScriptableTable`], in forward and reverse iteration order alike.
pub struct ScriptableDataSet {
    wrapped: Box<dyn DataSet>,
    configs: Vec<ScriptConfig>,
    engines: Arc<EngineRegistry>,
    standard_handlers: Arc<StandardHandlerRegistry>,
}

impl ScriptableDataSet {
    /// Creates a scriptable data set using the shared engine and standard
    /// handler registries.
    ///
    /// Fails with a configuration error when no configuration is given or
    /// one of them is malformed.
    pub fn new(wrapped: Box<dyn DataSet>, configs: Vec<ScriptConfig>) -> Result<Self, DataSetError> {
        Self::with_registries(wrapped, configs, EngineRegistry::shared(), StandardHandlerRegistry::shared())
    }

    /// Creates a scriptable data set with explicitly supplied registries,
    /// for hosts that register their own engines or standard handlers.
    pub fn with_registries(
        wrapped: Box<dyn DataSet>,
        configs: Vec<ScriptConfig>,
        engines: Arc<EngineRegistry>,
        standard_handlers: Arc<StandardHandlerRegistry>,
    ) -> Result<Self, DataSetError> {
        if configs.is_empty() {
            return Err(DataSetError::EmptyConfiguration);
        }
        for config in &configs {
            config.validate()?;
        }

        Ok(Self { wrapped, configs, engines, standard_handlers })
    }

    fn create_iterator(&self, reversed: bool) -> Result<Box<dyn TableIterator + '_>, DataSetError> {
        let wrapped = if reversed { self.wrapped.reverse_iterator()? } else { self.wrapped.iterator()? };

        Ok(Box::new(ScriptableIterator::new(
            wrapped,
            &self.configs,
            self.engines.as_ref(),
            self.standard_handlers.as_ref(),
        )))
    }
}

impl DataSet for ScriptableDataSet {
    fn iterator(&self) -> Result<Box<dyn TableIterator + '_>, DataSetError> {
        self.create_iterator(false)
    }

    fn reverse_iterator(&self) -> Result<Box<dyn TableIterator + '_>, DataSetError> {
        self.create_iterator(true)
    }
}

/// Iterator that wraps every table it yields in a [`ScriptableTable`].
///
/// `advance` and `metadata` delegate unchanged; [`table`](TableIterator::table)
/// builds a fresh scriptable table per call, re-resolving engines and
/// handler chains so no state carries over between tables.
pub struct ScriptableIterator<'a> {
    wrapped: Box<dyn TableIterator + 'a>,
    configs: &'a [ScriptConfig],
    engines: &'a EngineRegistry,
    standard_handlers: &'a StandardHandlerRegistry,
}

impl<'a> ScriptableIterator<'a> {
    pub fn new(
        wrapped: Box<dyn TableIterator + 'a>,
        configs: &'a [ScriptConfig],
        engines: &'a EngineRegistry,
        standard_handlers: &'a StandardHandlerRegistry,
    ) -> Self {
        Self { wrapped, configs, engines, standard_handlers }
    }
}

impl TableIterator for ScriptableIterator<'_> {
    fn advance(&mut self) -> Result<bool, DataSetError> {
        self.wrapped.advance()
    }

    fn metadata(&self) -> Result<TableMetaData, DataSetError> {
        self.wrapped.metadata()
    }

    fn table(&self) -> Result<Box<dyn Table>, DataSetError> {
        let table = ScriptableTable::new(
            self.wrapped.table()?,
            self.configs,
            self.engines,
            self.standard_handlers,
        )?;
        Ok(Box::new(table))
    }
}
