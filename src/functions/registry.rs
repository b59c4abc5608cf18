use crate::ast::{ASTNode, Evaluator};
use crate::error::{EvalError, RegistryError};
use crate::functions::register_builtins;
use log::debug;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Native implementation of a function. It receives the argument subtrees
/// unevaluated and decides itself which of them to evaluate, and when.
pub type NativeFunction =
    Arc<dyn Fn(&Evaluator<'_>, &[ASTNode]) -> Result<Decimal, EvalError> + Send + Sync>;

/// Number of arguments a function accepts.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Arity {
    Variadic,
    Fixed(usize),
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match self {
            Arity::Variadic => true,
            Arity::Fixed(expected) => *expected == count,
        }
    }
}

/// `-1` is variadic, `n >= 0` is exactly `n`; anything else is handed back.
impl TryFrom<i32> for Arity {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Arity::Variadic),
            n if n >= 0 => Ok(Arity::Fixed(n as usize)),
            n => Err(n),
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Variadic => f.write_str("any number of"),
            Arity::Fixed(n) => write!(f, "{}", n),
        }
    }
}

#[derive(Clone)]
pub struct FunctionDef {
    name: Arc<str>,
    arity: Arity,
    function: NativeFunction,
}

impl FunctionDef {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    pub fn call(&self, evaluator: &Evaluator<'_>, args: &[ASTNode]) -> Result<Decimal, EvalError> {
        (self.function)(evaluator, args)
    }
}

impl fmt::Debug for FunctionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionDef")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

/// Name to function mapping consulted by the evaluator at call nodes.
///
/// Entries are only ever added. Lookups take a read lock and clone the entry
/// out, so a running callback never holds the lock and may freely evaluate
/// nested calls while another thread registers.
pub struct Registry {
    functions: RwLock<HashMap<String, FunctionDef>>,
}

impl Registry {
    /// A registry seeded with the built-in functions.
    pub fn new() -> Self {
        let registry = Self::empty();
        register_builtins(&registry);
        registry
    }

    pub fn empty() -> Self {
        Self {
            functions: RwLock::new(HashMap::new()),
        }
    }

    /// Adds a function callable as `name(...)`.
    ///
    /// `arity` is `-1` for variadic functions or the exact argument count.
    /// Fails without touching the registry when the name is empty, the arity
    /// is out of range, or the name is taken.
    pub fn register<F>(&self, name: &str, arity: i32, function: F) -> Result<(), RegistryError>
    where
        F: Fn(&Evaluator<'_>, &[ASTNode]) -> Result<Decimal, EvalError> + Send + Sync + 'static,
    {
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        let arity = Arity::try_from(arity).map_err(|arity| RegistryError::InvalidArity {
            name: name.to_string(),
            arity,
        })?;

        let mut functions = self.write();
        if functions.contains_key(name) {
            debug!("Rejected duplicate registration of '{}'", name);
            return Err(RegistryError::DuplicateName {
                name: name.to_string(),
            });
        }
        functions.insert(
            name.to_string(),
            FunctionDef {
                name: Arc::from(name),
                arity,
                function: Arc::new(function),
            },
        );
        debug!("Registered function '{}' taking {} argument(s)", name, arity);
        Ok(())
    }

    /// Seeds a built-in; names are fixed at compile time so validation is skipped.
    pub(crate) fn define<F>(&self, name: &str, arity: Arity, function: F)
    where
        F: Fn(&Evaluator<'_>, &[ASTNode]) -> Result<Decimal, EvalError> + Send + Sync + 'static,
    {
        self.write()
            .entry(name.to_string())
            .or_insert_with(|| FunctionDef {
                name: Arc::from(name),
                arity,
                function: Arc::new(function),
            });
    }

    /// Clones the entry out of the lock. Only reference counts are bumped.
    pub fn lookup(&self, name: &str) -> Option<FunctionDef> {
        self.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    pub fn arity(&self, name: &str) -> Option<Arity> {
        self.read().get(name).map(FunctionDef::arity)
    }

    /// Registered names in alphabetical order.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // No callback runs while a guard is held, so a poisoned lock still holds a consistent map.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, FunctionDef>> {
        self.functions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, FunctionDef>> {
        self.functions.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("functions", &self.names())
            .finish()
    }
}
