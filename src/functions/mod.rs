pub mod aggregate;
pub mod math;
pub mod other;
mod registry;

pub use registry::{Arity, FunctionDef, NativeFunction, Registry};

/// Seeds `registry` with every built-in function.
pub(crate) fn register_builtins(registry: &Registry) {
    math::register(registry);
    aggregate::register(registry);
    other::register(registry);
}
