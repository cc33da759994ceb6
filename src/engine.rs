//! Script engine abstraction and the language registry.
//!
//! Engines are an opaque capability: given a language name the registry
//! produces an evaluator, or reports the language as unavailable. Evaluation
//! is synchronous and runs on the caller's thread to completion; there is no
//! timeout, so a runaway script blocks the calling thread.

use crate::value::CellValue;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::sync::{Arc, OnceLock};

/// Error raised by a script engine while evaluating a script.
#[derive(Debug, Clone)]
pub enum EngineError {
    Evaluation(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Evaluation(msg) => write!(f, "Script evaluation failed: {}", msg),
        }
    }
}

impl std::error::Error for EngineError {}

/// A synchronous evaluator for one scripting language.
///
/// Engine implementations may carry per-evaluation state and are not assumed
/// to be thread-safe; each instance is owned by a single table and used
/// sequentially.
pub trait ScriptEngine {
    /// Name of the language this engine evaluates, e.g. "rhai".
    fn language(&self) -> &str;

    /// Evaluates a script and returns its result.
    fn eval(&mut self, script: &str) -> Result<CellValue, EngineError>;
}

/// Engine handle shared between a scriptable table and the handlers bound
/// during a dispatch. One handle exists per language per table; it never
/// crosses table or thread boundaries.
pub type SharedEngine = Rc<RefCell<Box<dyn ScriptEngine>>>;

/// Factory producing a fresh engine instance per table.
pub type EngineFactory = Arc<dyn Fn() -> Box<dyn ScriptEngine> + Send + Sync>;

/// Registry mapping language names to engine factories.
///
/// The crate-provided default registers the embedded rhai engine; host
/// applications can register additional languages or build their own
/// registry and inject it into
/// [`ScriptableDataSet::with_registries`](crate::ScriptableDataSet::with_registries).
pub struct EngineRegistry {
    factories: HashMap<String, EngineFactory>,
}

impl EngineRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self { factories: HashMap::new() }
    }

    /// Registry with the crate's built-in engines registered.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("rhai", || Box::new(crate::rhai_engine::RhaiEngine::new()) as Box<dyn ScriptEngine>);
        registry
    }

    /// Shared process-wide registry, initialized at most once.
    pub fn shared() -> Arc<Self> {
        static SHARED: OnceLock<Arc<EngineRegistry>> = OnceLock::new();
        SHARED.get_or_init(|| Arc::new(Self::with_defaults())).clone()
    }

    /// Registers an engine factory for a language, replacing any previous
    /// registration for the same name.
    pub fn register<F>(&mut self, language: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn ScriptEngine> + Send + Sync + 'static,
    {
        self.factories.insert(language.into(), Arc::new(factory));
    }

    /// Resolves a fresh engine for a language, or `None` if no engine is
    /// registered for it.
    pub fn create(&self, language: &str) -> Option<Box<dyn ScriptEngine>> {
        self.factories.get(language).map(|factory| factory())
    }

    pub fn supports(&self, language: &str) -> bool {
        self.factories.contains_key(language)
    }

    /// Names of all registered languages.
    pub fn languages(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }
}

impl Default for EngineRegistry {
    fn default() -> Self {
        Self::new()
    }
}
