//! The two halves of "being ready to compile and run a statement": a
//! [`ParserEnvironment`] (names resolvable at compile time, with their
//! types) and an [`EvalContext`] (those same names, bound to live values,
//! rebuilt fresh for every host record). [`TransformContext`] is the
//! builder a host assembles once and compiles many statements against.
use crate::enum_provider::EnumProvider;
use crate::error::CompileResult;
use crate::function::{Function, FunctionRegistry};
use crate::statement::{BoolExpr, Statement, ValueExpr};
use crate::types::Type;
use crate::value::{BoxValue, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Compile-time name resolution: what a bare identifier, a function call,
/// or a bare enum symbol means, before any host record exists.
#[derive(Clone)]
pub struct ParserEnvironment {
    variables: Arc<HashMap<String, Type>>,
    functions: Arc<FunctionRegistry>,
    enums: Arc<Vec<Arc<dyn EnumProvider>>>,
}

impl ParserEnvironment {
    pub fn variable_type(&self, name: &str) -> Option<Type> {
        self.variables.get(name).cloned()
    }

    pub fn function(&self, name: &str) -> Option<Arc<dyn Function>> {
        self.functions.get(name)
    }

    pub fn resolve_enum_symbol(&self, name: &str) -> Option<i64> {
        self.enums.iter().find_map(|provider| provider.lookup(name))
    }
}

/// Evaluation-time name bindings: the same names as the
/// [`ParserEnvironment`] the statement was compiled against, but bound to
/// live values for one specific host record.
#[derive(Default)]
pub struct EvalContext {
    variables: HashMap<String, BoxValue>,
}

impl EvalContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, name: impl Into<String>, value: BoxValue) {
        self.variables.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<BoxValue> {
        self.variables.get(name).map(|v| v.clone_value())
    }
}

struct TransformContextInner<H> {
    root_name: String,
    root_type: Type,
    adapter: Box<dyn Fn(&H) -> BoxValue>,
    functions: FunctionRegistry,
    constants: HashMap<String, Box<dyn Value>>,
    enums: Vec<Arc<dyn EnumProvider>>,
}

/// A host's full wiring: how to adapt its record type to a root `Value`,
/// which functions and enum families it exposes, and any constants bound
/// into every evaluation. Compiling a statement snapshots this into a
/// `ParserEnvironment`; running it rebuilds an `EvalContext` from the same
/// wiring for each host record.
pub struct TransformContext<H>(Arc<TransformContextInner<H>>);

impl<H> Clone for TransformContext<H> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<H: 'static> TransformContext<H> {
    pub fn new(root_name: impl Into<String>, root_type: Type, adapter: impl Fn(&H) -> BoxValue + 'static) -> Self {
        Self(Arc::new(TransformContextInner {
            root_name: root_name.into(),
            root_type,
            adapter: Box::new(adapter),
            functions: FunctionRegistry::new(),
            constants: HashMap::new(),
            enums: Vec::new(),
        }))
    }

    fn inner_mut(self) -> TransformContextInner<H> {
        match Arc::try_unwrap(self.0) {
            Ok(inner) => inner,
            Err(shared) => {
                let adapter_shared = shared.clone();
                TransformContextInner {
                    root_name: shared.root_name.clone(),
                    root_type: shared.root_type.clone(),
                    adapter: Box::new(move |h: &H| (adapter_shared.adapter)(h)),
                    functions: shared.functions.clone(),
                    constants: shared.constants.iter().map(|(k, v)| (k.clone(), v.clone_value())).collect(),
                    enums: shared.enums.clone(),
                }
            }
        }
    }

    pub fn with_function(self, function: Arc<dyn Function>) -> Self {
        let mut inner = self.inner_mut();
        inner.functions.register(function);
        Self(Arc::new(inner))
    }

    pub fn with_functions(self, functions: impl IntoIterator<Item = Arc<dyn Function>>) -> Self {
        let mut ctx = self;
        for f in functions {
            ctx = ctx.with_function(f);
        }
        ctx
    }

    pub fn with_constant(self, name: impl Into<String>, value: BoxValue) -> Self {
        let mut inner = self.inner_mut();
        inner.constants.insert(name.into(), value);
        Self(Arc::new(inner))
    }

    pub fn with_enum(self, provider: Arc<dyn EnumProvider>) -> Self {
        let mut inner = self.inner_mut();
        inner.enums.push(provider);
        Self(Arc::new(inner))
    }

    pub fn parser_environment(&self) -> ParserEnvironment {
        let mut variables = HashMap::new();
        variables.insert(self.0.root_name.clone(), self.0.root_type.clone());
        for (name, value) in &self.0.constants {
            variables.insert(name.clone(), value.type_of());
        }
        ParserEnvironment {
            variables: Arc::new(variables),
            functions: Arc::new(self.0.functions.clone()),
            enums: Arc::new(self.0.enums.clone()),
        }
    }

    pub(crate) fn eval_context(&self, host: &H) -> EvalContext {
        let mut ctx = EvalContext::new();
        ctx.bind(self.0.root_name.clone(), (self.0.adapter)(host));
        for (name, value) in &self.0.constants {
            ctx.bind(name.clone(), value.clone_value());
        }
        ctx
    }

    pub fn compile_statement(&self, source: &str) -> CompileResult<Statement<H>> {
        let ast = crate::parser::parse_statement(source)?;
        let (action, filter) = crate::compiler::compile_statement(&ast, &self.parser_environment())?;
        log::debug!("statement compiled: {source}");
        Ok(Statement::new(action, filter, source.to_owned(), self.clone()))
    }

    pub fn compile_condition(&self, source: &str) -> CompileResult<BoolExpr<H>> {
        let ast = crate::parser::parse_bool_expr(source)?;
        let expr = crate::compiler::compile_expr(&ast, &self.parser_environment())?;
        log::debug!("condition compiled: {source}");
        Ok(BoolExpr::new(expr, self.clone()))
    }

    pub fn compile_value(&self, source: &str) -> CompileResult<ValueExpr<H>> {
        let ast = crate::parser::parse_value_expr(source)?;
        let expr = crate::compiler::compile_expr(&ast, &self.parser_environment())?;
        log::debug!("value expression compiled: {source}");
        Ok(ValueExpr::new(expr, self.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::builtins;
    use crate::stdlib::span::{Span, SpanKindEnum};
    use crate::value::{FieldAccessible, Native};

    fn span_context() -> TransformContext<Span> {
        TransformContext::new("span", crate::stdlib::span::span_type(), |span: &Span| {
            Box::new(span.clone()) as BoxValue
        })
        .with_functions(builtins::all())
        .with_enum(Arc::new(SpanKindEnum))
    }

    #[test]
    fn compiles_and_runs_a_simple_statement() {
        let ctx = span_context();
        let statement = ctx.compile_statement("set(span.name, \"renamed\")").unwrap();
        let mut span = Span::with_name("original");
        let result = statement.execute(&mut span);
        assert!(result.matched);
        assert!(result.error.is_none());
        assert!(result.payload.is_some());
        assert!(matches!(span.get_field("name").native(), Native::String(s) if s == "renamed"));
    }
}
