//! Per-language script configuration.

use crate::dataset::DataSetError;
use crate::handlers::HandlerRef;

/// Configures the usage of one scripting language: the language name as
/// known to the engine registry, the cell prefix that activates it, and an
/// ordered list of custom invocation handlers.
///
/// Immutable after construction. Prefixes across the active set of
/// configurations should be distinct; distinctness is not enforced.
///
/// ```
/// use scriptable_dataset::ScriptConfig;
///
/// let config = ScriptConfig::new("rhai", "rhai:");
/// assert_eq!(config.prefix(), "rhai:");
/// ```
#[derive(Debug, Clone)]
pub struct ScriptConfig {
    language: String,
    prefix: String,
    handlers: Vec<HandlerRef>,
}

impl ScriptConfig {
    /// Creates a configuration for `language`, activated by cells starting
    /// with `prefix`, e.g. `ScriptConfig::new("rhai", "rhai:")`.
    pub fn new(language: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            prefix: prefix.into(),
            handlers: Vec::new(),
        }
    }

    /// Appends a custom handler, builder style. Custom handlers run after
    /// the standard handlers for the language, in the order they were added.
    pub fn with_handler(mut self, handler: HandlerRef) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn with_handlers(mut self, handlers: impl IntoIterator<Item = HandlerRef>) -> Self {
        self.handlers.extend(handlers);
        self
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn handlers(&self) -> &[HandlerRef] {
        &self.handlers
    }

    pub(crate) fn validate(&self) -> Result<(), DataSetError> {
        if self.language.is_empty() {
            return Err(DataSetError::InvalidConfiguration(
                "language name must not be empty".to_string(),
            ));
        }
        if self.prefix.is_empty() {
            return Err(DataSetError::InvalidConfiguration(
                "prefix must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::{HandlerRef, ScriptInvocationHandler};

    struct NoopHandler;

    impl ScriptInvocationHandler for NoopHandler {}

    #[test]
    fn test_handlers_keep_declaration_order() {
        let config = ScriptConfig::new("rhai", "rhai:")
            .with_handler(HandlerRef::shared(NoopHandler))
            .with_handlers([HandlerRef::factory(|| Box::new(NoopHandler))]);

        assert_eq!(config.language(), "rhai");
        assert_eq!(config.handlers().len(), 2);
    }

    #[test]
    fn test_empty_prefix_is_rejected() {
        assert!(matches!(
            ScriptConfig::new("rhai", "").validate(),
            Err(DataSetError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_empty_language_is_rejected() {
        assert!(ScriptConfig::new("", "x:").validate().is_err());
    }
}
