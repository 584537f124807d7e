//! A reflective function adapter: rather than a distinct Rust type per
//! builtin, a function is described by a small schema (names, which slots
//! have defaults) plus a closure body. One `ReflectiveFunction` value per
//! builtin, built through [`FunctionBuilder`].
use crate::function::Function;
use crate::value::BoxValue;

pub struct ReflectiveFunction {
    name: String,
    arg_names: Vec<String>,
    defaults: Vec<Option<Box<dyn Fn() -> BoxValue>>>,
    body: Box<dyn Fn(Vec<BoxValue>) -> BoxValue>,
}

impl std::fmt::Debug for ReflectiveFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReflectiveFunction({})", self.name)
    }
}

impl Function for ReflectiveFunction {
    fn name(&self) -> &str {
        &self.name
    }

    fn arg_names(&self) -> &[String] {
        &self.arg_names
    }

    fn default_for(&self, index: usize) -> Option<BoxValue> {
        self.defaults.get(index)?.as_ref().map(|f| f())
    }

    fn call(&self, args: Vec<BoxValue>) -> BoxValue {
        (self.body)(args)
    }
}

/// Builds a [`ReflectiveFunction`] by declaring its parameters in order,
/// required ones first — the grammar already forbids a positional argument
/// following a named one, so a schema that puts an optional parameter
/// before a required one would be unreachable through normal calls.
pub struct FunctionBuilder {
    name: String,
    arg_names: Vec<String>,
    defaults: Vec<Option<Box<dyn Fn() -> BoxValue>>>,
}

impl FunctionBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arg_names: Vec::new(),
            defaults: Vec::new(),
        }
    }

    pub fn required_arg(mut self, name: impl Into<String>) -> Self {
        self.arg_names.push(name.into());
        self.defaults.push(None);
        self
    }

    pub fn optional_arg(mut self, name: impl Into<String>, default: impl Fn() -> BoxValue + 'static) -> Self {
        self.arg_names.push(name.into());
        self.defaults.push(Some(Box::new(default)));
        self
    }

    pub fn build(self, body: impl Fn(Vec<BoxValue>) -> BoxValue + 'static) -> ReflectiveFunction {
        ReflectiveFunction {
            name: self.name,
            arg_names: self.arg_names,
            defaults: self.defaults,
            body: Box::new(body),
        }
    }
}
