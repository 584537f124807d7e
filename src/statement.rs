//! A compiled statement (`editor(...) [where boolExpr]`) and the two
//! narrower compiled forms — a bare condition, a bare value expression —
//! that let a host evaluate a fragment without the action/filter split.
use crate::context::TransformContext;
use crate::error::RuntimeError;
use crate::expr::Expr;
use crate::value::{to_bool, BoxValue, Native};

/// The outcome of running one [`Statement`] against a host record.
#[derive(Debug)]
pub struct ExecutionResult {
    pub payload: Option<BoxValue>,
    pub matched: bool,
    pub error: Option<RuntimeError>,
}

/// One compiled `editor(...) [where boolExpr]`. Carries a handle back to
/// the [`TransformContext`] it was compiled against so `execute` can
/// rebuild a fresh [`crate::context::EvalContext`] per host record without
/// the caller re-threading functions/constants/enums through every call.
pub struct Statement<H> {
    action: Expr,
    filter: Option<Expr>,
    source: String,
    ctx: TransformContext<H>,
}

impl<H> std::fmt::Debug for Statement<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Statement").field("source", &self.source).finish()
    }
}

impl<H: 'static> Statement<H> {
    pub(crate) fn new(action: Expr, filter: Option<Expr>, source: String, ctx: TransformContext<H>) -> Self {
        Self { action, filter, source, ctx }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Runs the statement against one host record. Mutation, where the
    /// action writes through a lens, happens via the host's own interior
    /// mutability (`Rc<RefCell<_>>` adapter values); `host` is taken by
    /// mutable reference to reflect that the caller owns this record for
    /// the duration of the call, not because this code reassigns it.
    ///
    /// - filter present and its evaluation fails to coerce to bool: no
    ///   payload, not matched, carries the coercion error.
    /// - filter present and evaluates to `false`: no payload, not matched,
    ///   no error.
    /// - filter absent, or evaluates to `true`: the action runs. If its
    ///   result is itself an error-value: no payload, matched, carries the
    ///   error. Otherwise: the action's result as payload, matched, no error.
    pub fn execute(&self, host: &mut H) -> ExecutionResult {
        log::trace!("executing statement: {}", self.source);
        let eval_ctx = self.ctx.eval_context(host);

        if let Some(filter) = &self.filter {
            let filtered = to_bool(&*filter.eval(&eval_ctx));
            if let Some(err) = filtered.as_error() {
                return ExecutionResult { payload: None, matched: false, error: Some(err.clone()) };
            }
            match filtered.native() {
                Native::Bool(false) => return ExecutionResult { payload: None, matched: false, error: None },
                Native::Bool(true) => {}
                _ => unreachable!("to_bool always yields Bool or an error-value"),
            }
        }

        let result = self.action.eval(&eval_ctx);
        if let Some(err) = result.as_error() {
            return ExecutionResult { payload: None, matched: true, error: Some(err.clone()) };
        }
        ExecutionResult { payload: Some(result), matched: true, error: None }
    }
}

/// A compiled bare boolean expression, for hosts that want to evaluate a
/// condition without an accompanying action.
pub struct BoolExpr<H> {
    expr: Expr,
    ctx: TransformContext<H>,
}

impl<H> std::fmt::Debug for BoolExpr<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoolExpr").finish_non_exhaustive()
    }
}

impl<H: 'static> BoolExpr<H> {
    pub(crate) fn new(expr: Expr, ctx: TransformContext<H>) -> Self {
        Self { expr, ctx }
    }

    pub fn evaluate(&self, host: &H) -> BoxValue {
        to_bool(&*self.expr.eval(&self.ctx.eval_context(host)))
    }
}

/// A compiled bare value expression (no editor/converter-call wrapper).
pub struct ValueExpr<H> {
    expr: Expr,
    ctx: TransformContext<H>,
}

impl<H> std::fmt::Debug for ValueExpr<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueExpr").finish_non_exhaustive()
    }
}

impl<H: 'static> ValueExpr<H> {
    pub(crate) fn new(expr: Expr, ctx: TransformContext<H>) -> Self {
        Self { expr, ctx }
    }

    pub fn evaluate(&self, host: &H) -> BoxValue {
        self.expr.eval(&self.ctx.eval_context(host))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::builtins;
    use crate::stdlib::span::Span;
    use crate::value::Value;

    fn span_context() -> TransformContext<Span> {
        TransformContext::new("span", crate::stdlib::span::span_type(), |span: &Span| {
            Box::new(span.clone()) as BoxValue
        })
        .with_functions(builtins::all())
    }

    #[test]
    fn filter_miss_returns_no_payload_but_no_error() {
        let ctx = span_context();
        let statement = ctx
            .compile_statement("route() where IsEmpty(span.name)")
            .unwrap();
        let mut span = Span::with_name("has-a-name");
        let result = statement.execute(&mut span);
        assert!(result.payload.is_none());
        assert!(!result.matched);
        assert!(result.error.is_none());
    }

    #[test]
    fn filter_hit_runs_the_action() {
        let ctx = span_context();
        let statement = ctx
            .compile_statement("route() where IsEmpty(span.name)")
            .unwrap();
        let mut span = Span::with_name("");
        let result = statement.execute(&mut span);
        assert!(result.matched);
        assert!(result.error.is_none());
    }

    #[test]
    fn filter_comparing_equal_paths_matches() {
        let ctx = span_context();
        let statement = ctx.compile_statement("route() where span.name == span.name").unwrap();
        let mut span = Span::with_name("x");
        let result = statement.execute(&mut span);
        assert!(result.matched);
        assert!(result.error.is_none());
    }

    #[test]
    fn bare_condition_evaluates_without_an_action() {
        let ctx = span_context();
        let condition = ctx.compile_condition("IsEmpty(span.name)").unwrap();
        assert_eq!(condition.evaluate(&Span::new()).native(), crate::value::Native::Bool(true));
    }

    #[test]
    fn bare_value_expression_evaluates_a_path() {
        let ctx = span_context();
        let value = ctx.compile_value("span.name").unwrap();
        assert_eq!(
            value.evaluate(&Span::with_name("abc")).native(),
            crate::value::Native::String("abc".into())
        );
    }
}
