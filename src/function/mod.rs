//! The function protocol: what an editor or converter call compiles down
//! to, and the registry a [`crate::context::TransformContext`] consults
//! while resolving calls by name.
pub mod builtins;
pub mod reflective;

pub use reflective::{FunctionBuilder, ReflectiveFunction};

use crate::value::BoxValue;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

/// A callable editor or converter.
///
/// `arg_names` is the function's declared parameter schema — its length is
/// the arity the compiler binds positional/named arguments against.
/// `default_for(i)` supplies the value an unfilled optional slot falls back
/// to; `None` marks a required slot, which the compiler rejects at compile
/// time if nothing fills it.
pub trait Function: Debug {
    fn name(&self) -> &str;
    fn arg_names(&self) -> &[String];
    fn default_for(&self, index: usize) -> Option<BoxValue>;
    fn call(&self, args: Vec<BoxValue>) -> BoxValue;
}

/// The set of functions a parser environment resolves call names against.
#[derive(Debug, Default, Clone)]
pub struct FunctionRegistry(HashMap<String, Arc<dyn Function>>);

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, function: Arc<dyn Function>) {
        self.0.insert(function.name().to_owned(), function);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Function>> {
        self.0.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::builtins::route_function;

    #[test]
    fn registry_looks_up_by_declared_name() {
        let mut registry = FunctionRegistry::new();
        registry.register(Arc::new(route_function()));
        assert!(registry.get("route").is_some());
        assert!(registry.get("nonexistent").is_none());
    }
}
