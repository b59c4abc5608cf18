use crate::ast::{ASTNode, Evaluator, Parser};
use crate::error::{Error, EvalError, RegistryError};
use crate::functions::Registry;
use log::debug;
use lru::LruCache;
use rayon::prelude::*;
use rust_decimal::Decimal;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError};

/// Settings for an [`Engine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Number of parsed expressions kept for reuse. `0` disables the cache.
    pub cache_capacity: usize,
    /// Reject calls whose argument count does not match a fixed arity
    /// before the function runs.
    pub strict_arity: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 128,
            strict_arity: true,
        }
    }
}

/// A function registry plus a cache of parsed expressions.
///
/// Engines are independent of each other; the crate-root functions share a
/// single lazily created one.
pub struct Engine {
    registry: Registry,
    cache: Option<Mutex<LruCache<String, Arc<ASTNode>>>>,
    config: EngineConfig,
}

impl Engine {
    /// Creates an engine with the built-in functions and default settings.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self::with_registry(Registry::new(), config)
    }

    /// Creates an engine around an existing registry, e.g. `Registry::empty()`.
    pub fn with_registry(registry: Registry, config: EngineConfig) -> Self {
        let cache = NonZeroUsize::new(config.cache_capacity).map(|capacity| Mutex::new(LruCache::new(capacity)));
        debug!(
            "Engine created with {} function(s), cache capacity {}",
            registry.len(),
            config.cache_capacity
        );
        Self {
            registry,
            cache,
            config,
        }
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn evaluator(&self) -> Evaluator<'_> {
        Evaluator::new(&self.registry).with_strict_arity(self.config.strict_arity)
    }

    /// Adds a function. `arity` is `-1` for variadic, otherwise the exact count.
    pub fn register_function<F>(&self, name: &str, arity: i32, function: F) -> Result<(), RegistryError>
    where
        F: Fn(&Evaluator<'_>, &[ASTNode]) -> Result<Decimal, EvalError> + Send + Sync + 'static,
    {
        self.registry.register(name, arity, function)
    }

    /// Parses `expression`, reusing an earlier parse of the same text when cached.
    /// Failed parses are never cached.
    pub fn parse(&self, expression: &str) -> Result<Arc<ASTNode>, Error> {
        let Some(cache) = &self.cache else {
            return Ok(Arc::new(Parser::parse_expression(expression)?));
        };

        if let Some(ast) = cache.lock().unwrap_or_else(PoisonError::into_inner).get(expression) {
            debug!("Parse cache hit for '{}'", expression);
            return Ok(Arc::clone(ast));
        }

        let ast = Arc::new(Parser::parse_expression(expression)?);
        cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .put(expression.to_string(), Arc::clone(&ast));
        Ok(ast)
    }

    pub fn evaluate_expression(&self, expression: &str) -> Result<Decimal, Error> {
        let ast = self.parse(expression)?;
        Ok(self.evaluate_ast(&ast)?)
    }

    pub fn evaluate_ast(&self, ast: &ASTNode) -> Result<Decimal, EvalError> {
        self.evaluator().evaluate(ast)
    }

    /// Evaluates every expression in parallel. Results keep the input order.
    pub fn evaluate_batch(&self, expressions: &[&str]) -> Vec<Result<Decimal, Error>> {
        debug!("Evaluating batch of {} expression(s)", expressions.len());
        expressions
            .par_iter()
            .map(|expression| self.evaluate_expression(expression))
            .collect()
    }

    pub fn cached_expressions(&self) -> usize {
        self.cache
            .as_ref()
            .map_or(0, |cache| cache.lock().unwrap_or_else(PoisonError::into_inner).len())
    }

    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.lock().unwrap_or_else(PoisonError::into_inner).clear();
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("registry", &self.registry)
            .field("cached_expressions", &self.cached_expressions())
            .field("config", &self.config)
            .finish()
    }
}
