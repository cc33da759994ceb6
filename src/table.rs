//! Table implementation that allows script statements as field values.

use crate::config::ScriptConfig;
use crate::dataset::{DataSetError, Table, TableMetaData};
use crate::engine::{EngineRegistry, SharedEngine};
use crate::handlers::standard::StandardHandlerRegistry;
use crate::handlers::{HandlerError, HandlerRef, ScriptInvocationHandler};
use crate::value::CellValue;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::rc::Rc;

/// Dispatch target for one prefix: the engine resolved for the
/// configuration's language and the cached handler chain (standard handlers
/// for the language first, then the configuration's custom handlers).
struct Dispatch {
    language: String,
    engine: SharedEngine,
    chain: Vec<HandlerRef>,
}

/// A handler taking part in one script invocation.
enum ActiveHandler {
    Shared(Rc<RefCell<dyn ScriptInvocationHandler>>),
    Owned(Box<dyn ScriptInvocationHandler>),
}

impl ActiveHandler {
    fn bind_engine(&mut self, engine: SharedEngine) {
        match self {
            ActiveHandler::Shared(handler) => handler.borrow_mut().bind_engine(engine),
            ActiveHandler::Owned(handler) => handler.bind_engine(engine),
        }
    }

    fn pre_invoke(&mut self, script: String) -> Result<String, HandlerError> {
        match self {
            ActiveHandler::Shared(handler) => handler.borrow_mut().pre_invoke(script),
            ActiveHandler::Owned(handler) => handler.pre_invoke(script),
        }
    }

    fn post_invoke(&mut self, value: CellValue) -> Result<CellValue, HandlerError> {
        match self {
            ActiveHandler::Shared(handler) => handler.borrow_mut().post_invoke(value),
            ActiveHandler::Owned(handler) => handler.post_invoke(value),
        }
    }
}

/// Table decorator that evaluates script statements in prefixed text cells.
///
/// Construction resolves one engine per configured language and fails if any
/// language has no registered engine, so a misconfigured table is never
/// partially usable. Cell reads dispatch lazily, per cell, per read, with no
/// caching across reads.
///
/// When several configured prefixes match the same cell text, the first
/// declared one wins and exactly one configuration's pipeline runs.
pub struct ScriptableTable {
    wrapped: Box<dyn Table>,
    dispatch_by_prefix: IndexMap<String, Dispatch>,
}

impl ScriptableTable {
    /// Wraps a table, resolving engines and handler chains for every
    /// configuration up front.
    pub fn new(
        wrapped: Box<dyn Table>,
        configs: &[ScriptConfig],
        engines: &EngineRegistry,
        standard_handlers: &StandardHandlerRegistry,
    ) -> Result<Self, DataSetError> {
        let mut dispatch_by_prefix = IndexMap::new();

        for config in configs {
            let engine = engines.create(config.language()).ok_or_else(|| {
                DataSetError::NoEngineForLanguage { language: config.language().to_string() }
            })?;

            tracing::info!("Registered script engine for language {}.", config.language());

            // standard handlers for the language, then the custom handlers
            let mut chain = standard_handlers.handlers_for(config.language());
            chain.extend(config.handlers().iter().cloned());

            dispatch_by_prefix.insert(
                config.prefix().to_string(),
                Dispatch {
                    language: config.language().to_string(),
                    engine: Rc::new(RefCell::new(engine)),
                    chain,
                },
            );
        }

        Ok(Self { wrapped, dispatch_by_prefix })
    }

    fn dispatch_script(&self, dispatch: &Dispatch, script: &str) -> Result<CellValue, DataSetError> {
        run_pipeline(dispatch, script).map_err(|source| DataSetError::ScriptExecution {
            language: dispatch.language.clone(),
            source,
        })
    }
}

fn run_pipeline(
    dispatch: &Dispatch,
    script: &str,
) -> Result<CellValue, Box<dyn std::error::Error + Send + Sync>> {
    let mut handlers: Vec<ActiveHandler> = dispatch
        .chain
        .iter()
        .map(|handler| match handler {
            HandlerRef::Shared(shared) => ActiveHandler::Shared(Rc::clone(shared)),
            HandlerRef::Factory(factory) => ActiveHandler::Owned(factory()),
        })
        .collect();

    // shared instances are re-bound on every invocation, so an engine
    // reference never leaks from one invocation into the next
    for handler in &mut handlers {
        handler.bind_engine(Rc::clone(&dispatch.engine));
    }

    let mut script = script.to_string();
    for handler in &mut handlers {
        script = handler.pre_invoke(script)?;
    }

    tracing::debug!("Executing script: {}", script);

    let mut value = dispatch.engine.borrow_mut().eval(&script)?;

    // post invocation in reversed order
    for handler in handlers.iter_mut().rev() {
        value = handler.post_invoke(value)?;
    }

    Ok(value)
}

impl Table for ScriptableTable {
    fn metadata(&self) -> &TableMetaData {
        self.wrapped.metadata()
    }

    fn row_count(&self) -> usize {
        self.wrapped.row_count()
    }

    fn value(&self, row: usize, column: &str) -> Result<CellValue, DataSetError> {
        let raw = self.wrapped.value(row, column)?;

        // only text cells can carry scripts
        let text = match raw {
            CellValue::Text(text) => text,
            other => return Ok(other),
        };

        for (prefix, dispatch) in &self.dispatch_by_prefix {
            if let Some(script) = text.strip_prefix(prefix.as_str()) {
                return self.dispatch_script(dispatch, script);
            }
        }

        Ok(CellValue::Text(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineError, ScriptEngine};
    use crate::memory::MemoryTable;

    /// Engine that returns the script text unchanged.
    struct EchoEngine;

    impl ScriptEngine for EchoEngine {
        fn language(&self) -> &str {
            "echo"
        }

        fn eval(&mut self, script: &str) -> Result<CellValue, EngineError> {
            Ok(CellValue::Text(script.to_string()))
        }
    }

    /// Engine that uppercases the script text.
    struct UpperEngine;

    impl ScriptEngine for UpperEngine {
        fn language(&self) -> &str {
            "upper"
        }

        fn eval(&mut self, script: &str) -> Result<CellValue, EngineError> {
            Ok(CellValue::Text(script.to_uppercase()))
        }
    }

    /// Handler that tags the script in pre and the result in post, making
    /// the application order visible in the final text.
    struct TagHandler {
        tag: &'static str,
        language: Option<&'static str>,
    }

    impl TagHandler {
        fn new(tag: &'static str) -> Self {
            Self { tag, language: None }
        }
    }

    impl ScriptInvocationHandler for TagHandler {
        fn language(&self) -> Option<&str> {
            self.language
        }

        fn pre_invoke(&mut self, script: String) -> Result<String, HandlerError> {
            Ok(format!("{}|pre-{}", script, self.tag))
        }

        fn post_invoke(&mut self, value: CellValue) -> Result<CellValue, HandlerError> {
            match value {
                CellValue::Text(text) => Ok(CellValue::Text(format!("{}|post-{}", text, self.tag))),
                other => Ok(other),
            }
        }
    }

    struct FailingHandler;

    impl ScriptInvocationHandler for FailingHandler {
        fn post_invoke(&mut self, _value: CellValue) -> Result<CellValue, HandlerError> {
            Err(HandlerError::Invocation("handler exploded".to_string()))
        }
    }

    fn echo_registry() -> EngineRegistry {
        let mut registry = EngineRegistry::new();
        registry.register("echo", || Box::new(EchoEngine) as Box<dyn ScriptEngine>);
        registry.register("upper", || Box::new(UpperEngine) as Box<dyn ScriptEngine>);
        registry
    }

    fn single_cell_table(value: CellValue) -> Box<dyn Table> {
        Box::new(MemoryTable::new("fixture", ["cell"]).with_row(vec![value]))
    }

    fn wrap(
        value: CellValue,
        configs: &[ScriptConfig],
        standard_handlers: &StandardHandlerRegistry,
    ) -> ScriptableTable {
        ScriptableTable::new(single_cell_table(value), configs, &echo_registry(), standard_handlers)
            .expect("table construction should succeed")
    }

    #[test]
    fn test_unprefixed_text_is_returned_unchanged() {
        let configs = vec![ScriptConfig::new("echo", "echo:")];
        let table = wrap(CellValue::from("plain text"), &configs, &StandardHandlerRegistry::new());

        assert_eq!(table.value(0, "cell").unwrap(), CellValue::from("plain text"));
    }

    #[test]
    fn test_non_text_cells_are_returned_unchanged() {
        let configs = vec![ScriptConfig::new("echo", "echo:")];
        let table = wrap(CellValue::Integer(42), &configs, &StandardHandlerRegistry::new());

        assert_eq!(table.value(0, "cell").unwrap(), CellValue::Integer(42));
    }

    #[test]
    fn test_prefixed_text_is_dispatched() {
        let configs = vec![ScriptConfig::new("echo", "echo:")];
        let table = wrap(CellValue::from("echo:hello"), &configs, &StandardHandlerRegistry::new());

        assert_eq!(table.value(0, "cell").unwrap(), CellValue::from("hello"));
    }

    #[test]
    fn test_unknown_language_fails_construction() {
        let configs = vec![ScriptConfig::new("nope", "nope:")];
        let result = ScriptableTable::new(
            single_cell_table(CellValue::from("plain")),
            &configs,
            &echo_registry(),
            &StandardHandlerRegistry::new(),
        );

        assert!(matches!(result, Err(DataSetError::NoEngineForLanguage { language }) if language == "nope"));
    }

    #[test]
    fn test_custom_handlers_run_in_declared_order() {
        let configs = vec![ScriptConfig::new("echo", "echo:")
            .with_handler(HandlerRef::factory(|| Box::new(TagHandler::new("A"))))
            .with_handler(HandlerRef::factory(|| Box::new(TagHandler::new("B"))))];
        let table = wrap(CellValue::from("echo:x"), &configs, &StandardHandlerRegistry::new());

        // pre runs A then B, post runs B then A
        assert_eq!(
            table.value(0, "cell").unwrap(),
            CellValue::from("x|pre-A|pre-B|post-B|post-A")
        );
    }

    #[test]
    fn test_standard_handlers_wrap_custom_handlers() {
        let mut standard_handlers = StandardHandlerRegistry::new();
        standard_handlers
            .register(std::sync::Arc::new(|| {
                Box::new(TagHandler { tag: "std", language: Some("echo") })
                    as Box<dyn ScriptInvocationHandler>
            }))
            .unwrap();

        let configs = vec![ScriptConfig::new("echo", "echo:")
            .with_handler(HandlerRef::factory(|| Box::new(TagHandler::new("custom"))))];
        let table = wrap(CellValue::from("echo:x"), &configs, &standard_handlers);

        assert_eq!(
            table.value(0, "cell").unwrap(),
            CellValue::from("x|pre-std|pre-custom|post-custom|post-std")
        );
    }

    #[test]
    fn test_shared_handler_instance_is_usable_across_reads() {
        let configs =
            vec![ScriptConfig::new("echo", "echo:").with_handler(HandlerRef::shared(TagHandler::new("S")))];
        let table = wrap(CellValue::from("echo:x"), &configs, &StandardHandlerRegistry::new());

        assert_eq!(table.value(0, "cell").unwrap(), CellValue::from("x|pre-S|post-S"));
        assert_eq!(table.value(0, "cell").unwrap(), CellValue::from("x|pre-S|post-S"));
    }

    #[test]
    fn test_first_declared_prefix_wins_on_overlap() {
        let configs = vec![
            ScriptConfig::new("upper", "a:"),
            ScriptConfig::new("echo", "a:b:"),
        ];
        let table = wrap(CellValue::from("a:b:script"), &configs, &StandardHandlerRegistry::new());

        // "a:" is declared first, so only the upper engine runs
        assert_eq!(table.value(0, "cell").unwrap(), CellValue::from("B:SCRIPT"));
    }

    #[test]
    fn test_handler_failure_is_wrapped_with_cause() {
        let configs =
            vec![ScriptConfig::new("echo", "echo:").with_handler(HandlerRef::factory(|| Box::new(FailingHandler)))];
        let table = wrap(CellValue::from("echo:x"), &configs, &StandardHandlerRegistry::new());

        let error = table.value(0, "cell").unwrap_err();
        let DataSetError::ScriptExecution { language, .. } = &error else {
            panic!("expected a script execution error, got {:?}", error);
        };
        assert_eq!(language, "echo");
        let source = std::error::Error::source(&error).expect("cause should be preserved");
        assert!(source.to_string().contains("handler exploded"));

        // the wrapped table is unaffected; other cells still read fine
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_metadata_and_row_count_delegate() {
        let configs = vec![ScriptConfig::new("echo", "echo:")];
        let table = wrap(CellValue::from("plain"), &configs, &StandardHandlerRegistry::new());

        assert_eq!(table.metadata().table_name(), "fixture");
        assert_eq!(table.row_count(), 1);
    }
}
