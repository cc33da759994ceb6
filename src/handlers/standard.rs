//! Standard handlers, applied for every script in a given language.
//!
//! Standard handlers run before any custom handlers in the pre invocation
//! and after any custom handlers in the post invocation. They are kept in an
//! explicit registration table rather than discovered at runtime; the
//! built-ins live in this module, and host applications can register more or
//! inject a registry of their own.

use super::{HandlerError, HandlerFactory, HandlerRef, RhaiDateHandler, ScriptInvocationHandler};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

/// Built-in handlers grouped by the language they declare.
///
/// Read-only once constructed. A broken built-in registration never blocks
/// users who don't need it: [`with_defaults`](Self::with_defaults) degrades
/// to an empty registry instead of failing.
pub struct StandardHandlerRegistry {
    handlers_by_language: HashMap<String, Vec<HandlerFactory>>,
}

impl StandardHandlerRegistry {
    /// Creates an empty registry (no standard handlers for any language).
    pub fn new() -> Self {
        Self { handlers_by_language: HashMap::new() }
    }

    /// Registry populated with the crate's built-in handlers.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        for factory in builtin_handlers() {
            if let Err(err) = registry.register(factory) {
                tracing::error!("Loading of standard script invocation handlers failed: {}", err);
                return Self::new();
            }
        }

        registry
    }

    /// Shared process-wide registry, initialized at most once.
    pub fn shared() -> Arc<Self> {
        static SHARED: OnceLock<Arc<StandardHandlerRegistry>> = OnceLock::new();
        SHARED.get_or_init(|| Arc::new(Self::with_defaults())).clone()
    }

    /// Registers a factory under the language its handlers declare.
    ///
    /// Fails if a probe instance declares no language; such handlers can
    /// only be configured as custom handlers on a
    /// [`ScriptConfig`](crate::ScriptConfig).
    pub fn register(&mut self, factory: HandlerFactory) -> Result<(), HandlerError> {
        let probe = factory();
        let language = match probe.language() {
            Some(language) if !language.is_empty() => language.to_string(),
            _ => {
                return Err(HandlerError::Registration(
                    "handler declares no target language".to_string(),
                ))
            }
        };

        self.handlers_by_language.entry(language).or_default().push(factory);
        Ok(())
    }

    /// Standard handlers for a language, in registration order. Returns an
    /// empty list for languages with no registered handlers.
    pub fn handlers_for(&self, language: &str) -> Vec<HandlerRef> {
        self.handlers_by_language
            .get(language)
            .map(|factories| factories.iter().cloned().map(HandlerRef::Factory).collect())
            .unwrap_or_default()
    }
}

impl Default for StandardHandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// The registration table of built-in handlers.
fn builtin_handlers() -> Vec<HandlerFactory> {
    vec![Arc::new(|| Box::new(RhaiDateHandler::new()) as Box<dyn ScriptInvocationHandler>)]
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AnonymousHandler;

    impl ScriptInvocationHandler for AnonymousHandler {}

    #[test]
    fn test_defaults_register_rhai_handler() {
        let registry = StandardHandlerRegistry::with_defaults();

        assert_eq!(registry.handlers_for("rhai").len(), 1);
    }

    #[test]
    fn test_unknown_language_has_no_handlers() {
        let registry = StandardHandlerRegistry::with_defaults();

        assert!(registry.handlers_for("unknown").is_empty());
    }

    #[test]
    fn test_register_rejects_handler_without_language() {
        let mut registry = StandardHandlerRegistry::new();

        let result = registry.register(Arc::new(|| Box::new(AnonymousHandler) as Box<dyn ScriptInvocationHandler>));

        assert!(matches!(result, Err(HandlerError::Registration(_))));
        assert!(registry.handlers_for("rhai").is_empty());
    }
}
