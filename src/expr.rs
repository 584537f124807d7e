//! The compiled expression tree: what a `CompileError`-free parse becomes
//! after name/field/enum resolution in `crate::compiler`. Walking this tree
//! against an `EvalContext` is the whole of evaluation — no bytecode, no
//! separate IR.
use crate::context::EvalContext;
use crate::function::Function;
use crate::parser::ast::CompareOp;
use crate::value::{missing_capability, to_bool, BoxValue, ErrorValue, Native, Value};
use std::sync::Arc;

#[derive(Debug)]
pub enum Expr {
    Literal(BoxValue),
    Lookup(String),
    Field(Box<Expr>, String),
    Key(Box<Expr>, String),
    Index(Box<Expr>, i64),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    Compare(CompareOp, Box<Expr>, Box<Expr>),
    Call(Arc<dyn Function>, Vec<Expr>),
    List(Vec<Expr>),
    Map(Vec<(String, Expr)>),
}

impl Expr {
    pub fn eval(&self, ctx: &EvalContext) -> BoxValue {
        match self {
            Expr::Literal(v) => v.clone_value(),
            Expr::Lookup(name) => ctx.get(name).unwrap_or_else(|| {
                Box::new(ErrorValue::new(crate::error::RuntimeError::HostRejected(format!(
                    "'{name}' is not bound in this evaluation context"
                ))))
            }),
            Expr::Field(child, name) => {
                let child_val = child.eval(ctx);
                match child_val.as_error() {
                    Some(_) => child_val,
                    None => match child_val.as_field_accessible() {
                        Some(fa) => fa.get_field(name),
                        None => missing_capability(&*child_val, "field access"),
                    },
                }
            }
            Expr::Key(child, key) => {
                let child_val = child.eval(ctx);
                match child_val.as_error() {
                    Some(_) => child_val,
                    None => match child_val.as_key_accessible() {
                        Some(ka) => ka.get_key(key),
                        None => missing_capability(&*child_val, "keyed access"),
                    },
                }
            }
            Expr::Index(child, index) => {
                let child_val = child.eval(ctx);
                match child_val.as_error() {
                    Some(_) => child_val,
                    None => match child_val.as_indexable() {
                        Some(idx) => idx.get_index(*index),
                        None => missing_capability(&*child_val, "indexing"),
                    },
                }
            }
            Expr::Add(l, r) => arithmetic(l, r, ctx, |a, b| a.add(b)),
            Expr::Sub(l, r) => arithmetic(l, r, ctx, |a, b| a.sub(b)),
            Expr::Mul(l, r) => arithmetic(l, r, ctx, |a, b| a.mul(b)),
            Expr::Div(l, r) => arithmetic(l, r, ctx, |a, b| a.div(b)),
            Expr::And(l, r) => {
                let left = to_bool(&*l.eval(ctx));
                if left.as_error().is_some() {
                    return left;
                }
                match left.native() {
                    Native::Bool(false) => left,
                    Native::Bool(true) => to_bool(&*r.eval(ctx)),
                    _ => unreachable!("to_bool always yields Bool or an error-value"),
                }
            }
            Expr::Or(l, r) => {
                let left = to_bool(&*l.eval(ctx));
                if left.as_error().is_some() {
                    return left;
                }
                match left.native() {
                    Native::Bool(true) => left,
                    Native::Bool(false) => to_bool(&*r.eval(ctx)),
                    _ => unreachable!("to_bool always yields Bool or an error-value"),
                }
            }
            Expr::Not(inner) => {
                let val = to_bool(&*inner.eval(ctx));
                match val.as_error() {
                    Some(_) => val,
                    None => match val.native() {
                        Native::Bool(b) => Box::new(crate::stdlib::primitive::BoolValue(!b)),
                        _ => unreachable!("to_bool always yields Bool or an error-value"),
                    },
                }
            }
            Expr::Compare(op, l, r) => {
                let left = l.eval(ctx);
                if let Some(err) = left.as_error() {
                    return Box::new(ErrorValue::new(err.clone()));
                }
                let right = r.eval(ctx);
                if let Some(err) = right.as_error() {
                    return Box::new(ErrorValue::new(err.clone()));
                }
                let Some(cmp) = left.as_comparable() else {
                    return missing_capability(&*left, "comparison");
                };
                let result = match op {
                    CompareOp::Eq => cmp.equals(&*right),
                    CompareOp::NotEq => !cmp.equals(&*right),
                    CompareOp::Lt => cmp.less_than(&*right),
                    CompareOp::LtEq => cmp.less_than(&*right) || cmp.equals(&*right),
                    CompareOp::Gt => !(cmp.less_than(&*right) || cmp.equals(&*right)),
                    CompareOp::GtEq => !cmp.less_than(&*right),
                };
                Box::new(crate::stdlib::primitive::BoolValue(result))
            }
            Expr::Call(function, args) => {
                let mut evaluated = Vec::with_capacity(args.len());
                for arg in args {
                    let v = arg.eval(ctx);
                    if let Some(err) = v.as_error() {
                        return Box::new(ErrorValue::new(err.clone()));
                    }
                    evaluated.push(v);
                }
                function.call(evaluated)
            }
            Expr::List(items) => {
                let values = items.iter().map(|e| e.eval(ctx)).collect();
                Box::new(crate::stdlib::list::ListValue(values))
            }
            Expr::Map(entries) => {
                let map = entries.iter().map(|(k, e)| (k.clone(), e.eval(ctx))).collect();
                Box::new(crate::stdlib::map::MapValue(map))
            }
        }
    }
}

fn arithmetic(
    l: &Expr,
    r: &Expr,
    ctx: &EvalContext,
    op: impl Fn(&dyn crate::value::Arithmetic, &dyn Value) -> BoxValue,
) -> BoxValue {
    let left = l.eval(ctx);
    if let Some(err) = left.as_error() {
        return Box::new(ErrorValue::new(err.clone()));
    }
    let right = r.eval(ctx);
    if let Some(err) = right.as_error() {
        return Box::new(ErrorValue::new(err.clone()));
    }
    match left.as_arithmetic() {
        Some(a) => op(a, &*right),
        None => missing_capability(&*left, "arithmetic"),
    }
}
