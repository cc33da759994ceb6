//! Pre/post-processing handlers applied around script execution.
//!
//! Handlers can rewrite the script text before it runs (for example to add
//! commonly used imports) and transform the result afterwards (for example
//! to turn a language-specific date object into a literal the insertion
//! pipeline understands). Handlers declaring a target language can be
//! registered as standard handlers; the rest are configured per binding.

pub mod rhai_date;
pub mod standard;

pub use rhai_date::RhaiDateHandler;
pub use standard::StandardHandlerRegistry;

use crate::engine::{EngineError, SharedEngine};
use crate::value::CellValue;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

/// Error type for handler operations.
#[derive(Debug, Clone)]
pub enum HandlerError {
    Invocation(String),
    Registration(String),
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerError::Invocation(msg) => write!(f, "Handler invocation failed: {}", msg),
            HandlerError::Registration(msg) => write!(f, "Handler registration failed: {}", msg),
        }
    }
}

impl std::error::Error for HandlerError {}

impl From<EngineError> for HandlerError {
    fn from(err: EngineError) -> Self {
        HandlerError::Invocation(err.to_string())
    }
}

/// Called before and after a script contained in a data-set field is
/// executed.
///
/// All operations default to the identity, so implementations override only
/// what they need:
///
/// ```ignore
/// struct ImportAddingHandler;
///
/// impl ScriptInvocationHandler for ImportAddingHandler {
///     fn pre_invoke(&mut self, script: String) -> Result<String, HandlerError> {
///         Ok(format!("import \"fixtures\" as fx; {}", script))
///     }
/// }
/// ```
pub trait ScriptInvocationHandler {
    /// Language this handler targets, e.g. "rhai". Handlers returning a
    /// language are eligible for registration as standard handlers; handlers
    /// returning `None` can only be configured explicitly on a
    /// [`ScriptConfig`](crate::ScriptConfig).
    fn language(&self) -> Option<&str> {
        None
    }

    /// Rewrites the script text before execution.
    fn pre_invoke(&mut self, script: String) -> Result<String, HandlerError> {
        Ok(script)
    }

    /// Transforms the result after execution.
    fn post_invoke(&mut self, value: CellValue) -> Result<CellValue, HandlerError> {
        Ok(value)
    }

    /// Receives the engine evaluating the current script, so a handler can
    /// call back into it from [`post_invoke`](Self::post_invoke). Called
    /// again for every invocation; handlers must not assume the engine from
    /// a previous invocation is still current.
    fn bind_engine(&mut self, engine: SharedEngine) {
        let _ = engine;
    }
}

/// Factory producing a fresh handler per script invocation.
pub type HandlerFactory = Arc<dyn Fn() -> Box<dyn ScriptInvocationHandler> + Send + Sync>;

/// A handler's place in a chain: either a long-lived shared instance, or a
/// factory invoked fresh for every script so no handler state (such as a
/// bound engine) leaks across invocations.
///
/// Shared instances should be stateless with respect to the engine binding;
/// they are re-bound on every invocation.
#[derive(Clone)]
pub enum HandlerRef {
    Shared(Rc<RefCell<dyn ScriptInvocationHandler>>),
    Factory(HandlerFactory),
}

impl HandlerRef {
    /// Wraps a single long-lived handler instance.
    pub fn shared(handler: impl ScriptInvocationHandler + 'static) -> Self {
        HandlerRef::Shared(Rc::new(RefCell::new(handler)))
    }

    /// Wraps a factory instantiating a fresh handler per invocation.
    pub fn factory<F>(factory: F) -> Self
    where
        F: Fn() -> Box<dyn ScriptInvocationHandler> + Send + Sync + 'static,
    {
        HandlerRef::Factory(Arc::new(factory))
    }
}

impl fmt::Debug for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerRef::Shared(_) => f.write_str("HandlerRef::Shared"),
            HandlerRef::Factory(_) => f.write_str("HandlerRef::Factory"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MarkerHandler;

    impl ScriptInvocationHandler for MarkerHandler {
        fn pre_invoke(&mut self, script: String) -> Result<String, HandlerError> {
            Ok(format!("marked;{}", script))
        }
    }

    #[test]
    fn test_default_operations_are_identity() {
        struct Plain;
        impl ScriptInvocationHandler for Plain {}

        let mut handler = Plain;
        assert_eq!(handler.language(), None);
        assert_eq!(handler.pre_invoke("x".to_string()).unwrap(), "x");
        assert_eq!(handler.post_invoke(CellValue::Integer(1)).unwrap(), CellValue::Integer(1));
    }

    #[test]
    fn test_factory_produces_fresh_instances() {
        let reference = HandlerRef::factory(|| Box::new(MarkerHandler));

        let HandlerRef::Factory(factory) = &reference else {
            panic!("expected a factory reference");
        };
        let mut handler = factory();
        assert_eq!(handler.pre_invoke("s".to_string()).unwrap(), "marked;s");
    }

    #[test]
    fn test_engine_error_converts() {
        let err: HandlerError = EngineError::Evaluation("bad".to_string()).into();
        assert!(matches!(err, HandlerError::Invocation(_)));
    }
}
