//! Resolves a parsed AST against a [`crate::context::ParserEnvironment`]
//! into a [`crate::expr::Expr`] tree: name/function/enum lookups, field-path
//! validation against declared structure types, positional-argument-array
//! assembly, and the editor/converter naming rule.
use crate::context::ParserEnvironment;
use crate::error::{CompileError, CompileErrorKind, CompileResult, SourceSpan};
use crate::expr::Expr;
use crate::parser::ast::{ArgumentAst, CallAst, CompareOp, ExprAst, PathAst, PathSegment, StatementAst};
use crate::stdlib::primitive::{BoolValue, BytesValue, FloatValue, IntValue, NilValue, StringValue};
use crate::value::BoxValue;
use std::collections::HashMap;

#[derive(Clone, Copy, PartialEq, Eq)]
enum CallRole {
    /// A statement's action: must start lowercase.
    Editor,
    /// A call appearing anywhere in value position: must start uppercase.
    Converter,
}

fn check_case(name: &str, role: CallRole, span: SourceSpan) -> CompileResult<()> {
    let starts_upper = name.chars().next().is_some_and(|c| c.is_ascii_uppercase());
    let ok = match role {
        CallRole::Editor => !starts_upper,
        CallRole::Converter => starts_upper,
    };
    if ok {
        Ok(())
    } else {
        Err(CompileError::new(CompileErrorKind::UppercaseLowercaseRule(name.to_owned()), span))
    }
}

/// Compiles a full `editor(...) [where boolExpr]` statement: the action
/// call (role: editor) and the optional filter (role: converter wherever a
/// call occurs inside it).
pub fn compile_statement(ast: &StatementAst, env: &ParserEnvironment) -> CompileResult<(Expr, Option<Expr>)> {
    let action = compile_call(&ast.action, env, CallRole::Editor)?;
    let filter = ast.filter.as_ref().map(|f| compile_expr(f, env)).transpose()?;
    Ok((action, filter))
}

pub fn compile_expr(ast: &ExprAst, env: &ParserEnvironment) -> CompileResult<Expr> {
    match ast {
        ExprAst::IntLit(i) => Ok(Expr::Literal(Box::new(IntValue(*i)))),
        ExprAst::FloatLit(f) => Ok(Expr::Literal(Box::new(FloatValue(*f)))),
        ExprAst::StringLit(s) => Ok(Expr::Literal(Box::new(StringValue(s.clone())))),
        ExprAst::BytesLit(b) => Ok(Expr::Literal(Box::new(BytesValue(b.clone())))),
        ExprAst::BoolLit(b) => Ok(Expr::Literal(Box::new(BoolValue(*b)))),
        ExprAst::NilLit => Ok(Expr::Literal(Box::new(NilValue))),
        ExprAst::EnumSym(name, span) => match env.resolve_enum_symbol(name) {
            Some(v) => Ok(Expr::Literal(Box::new(IntValue(v)))),
            None => Err(CompileError::new(CompileErrorKind::UnresolvedEnum(name.clone()), *span)),
        },
        ExprAst::Path(path) => compile_path(path, env),
        ExprAst::Call(call) => compile_call(call, env, CallRole::Converter),
        ExprAst::List(items) => {
            let items = items.iter().map(|e| compile_expr(e, env)).collect::<CompileResult<Vec<_>>>()?;
            Ok(Expr::List(items))
        }
        ExprAst::Map(entries) => {
            let entries = entries
                .iter()
                .map(|(k, v)| Ok((k.clone(), compile_expr(v, env)?)))
                .collect::<CompileResult<Vec<_>>>()?;
            Ok(Expr::Map(entries))
        }
        ExprAst::Add(l, r) => Ok(Expr::Add(Box::new(compile_expr(l, env)?), Box::new(compile_expr(r, env)?))),
        ExprAst::Sub(l, r) => Ok(Expr::Sub(Box::new(compile_expr(l, env)?), Box::new(compile_expr(r, env)?))),
        ExprAst::Mul(l, r) => Ok(Expr::Mul(Box::new(compile_expr(l, env)?), Box::new(compile_expr(r, env)?))),
        ExprAst::Div(l, r) => Ok(Expr::Div(Box::new(compile_expr(l, env)?), Box::new(compile_expr(r, env)?))),
        ExprAst::And(l, r) => Ok(Expr::And(Box::new(compile_expr(l, env)?), Box::new(compile_expr(r, env)?))),
        ExprAst::Or(l, r) => Ok(Expr::Or(Box::new(compile_expr(l, env)?), Box::new(compile_expr(r, env)?))),
        ExprAst::Not(inner) => Ok(Expr::Not(Box::new(compile_expr(inner, env)?))),
        ExprAst::Compare(op, l, r) => {
            Ok(Expr::Compare(*op, Box::new(compile_expr(l, env)?), Box::new(compile_expr(r, env)?)))
        }
    }
}

fn compile_path(path: &PathAst, env: &ParserEnvironment) -> CompileResult<Expr> {
    let mut current_type = env
        .variable_type(&path.root)
        .ok_or_else(|| CompileError::new(CompileErrorKind::UnresolvedName(path.root.clone()), path.span))?;

    let mut expr = Expr::Lookup(path.root.clone());
    for segment in &path.segments {
        match segment {
            PathSegment::Field(name) => {
                if current_type.is_structure() {
                    match current_type.get_field(name) {
                        Some(field_type) => current_type = field_type,
                        None => {
                            return Err(CompileError::new(
                                CompileErrorKind::UnresolvedField {
                                    structure: current_type.name().to_owned(),
                                    field: name.clone(),
                                },
                                path.span,
                            ))
                        }
                    }
                }
                expr = Expr::Field(Box::new(expr), name.clone());
            }
            PathSegment::Index(i) => {
                expr = Expr::Index(Box::new(expr), *i);
            }
            PathSegment::Key(k) => {
                expr = Expr::Key(Box::new(expr), k.clone());
            }
        }
    }
    Ok(expr)
}

fn compile_call(call: &CallAst, env: &ParserEnvironment, role: CallRole) -> CompileResult<Expr> {
    check_case(&call.name, role, call.span)?;

    let function = env
        .function(&call.name)
        .ok_or_else(|| CompileError::new(CompileErrorKind::UnresolvedFunction(call.name.clone()), call.span))?;

    let mut positional: Vec<Expr> = Vec::new();
    let mut named: HashMap<String, Expr> = HashMap::new();
    for ArgumentAst { name, value } in &call.args {
        let compiled = compile_expr(value, env)?;
        match name {
            Some(n) => {
                if named.insert(n.clone(), compiled).is_some() {
                    return Err(CompileError::new(CompileErrorKind::DuplicateNamedArgument(n.clone()), call.span));
                }
            }
            None => positional.push(compiled),
        }
    }

    let arg_names = function.arg_names().to_vec();
    if positional.len() > arg_names.len() {
        return Err(CompileError::new(
            CompileErrorKind::Syntax(format!(
                "'{}' takes at most {} argument(s), found {}",
                call.name,
                arg_names.len(),
                positional.len()
            )),
            call.span,
        ));
    }

    let mut positional = positional.into_iter();
    let mut slots: Vec<Expr> = Vec::with_capacity(arg_names.len());
    for (index, arg_name) in arg_names.iter().enumerate() {
        if let Some(expr) = positional.next() {
            slots.push(expr);
            continue;
        }
        if let Some(expr) = named.remove(arg_name) {
            slots.push(expr);
            continue;
        }
        if let Some(default_value) = function.default_for(index) {
            slots.push(Expr::Literal(default_value));
            continue;
        }
        return Err(CompileError::new(
            CompileErrorKind::MissingRequiredArgument {
                function: call.name.clone(),
                argument: arg_name.clone(),
            },
            call.span,
        ));
    }

    if let Some(unknown) = named.into_keys().next() {
        return Err(CompileError::new(
            CompileErrorKind::Syntax(format!("'{}' has no argument named '{unknown}'", call.name)),
            call.span,
        ));
    }

    Ok(Expr::Call(function, slots))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TransformContext;
    use crate::function::builtins;
    use crate::stdlib::span::{Span, SpanKindEnum};
    use crate::value::BoxValue as BV;
    use std::sync::Arc;

    fn env() -> ParserEnvironment {
        TransformContext::<Span>::new("span", crate::stdlib::span::span_type(), |s: &Span| {
            Box::new(s.clone()) as BV
        })
        .with_functions(builtins::all())
        .with_enum(Arc::new(SpanKindEnum))
        .parser_environment()
    }

    #[test]
    fn editor_name_must_start_lowercase() {
        let ast = crate::parser::parse_statement("Set(span.name, \"x\")");
        // "Set" parses fine (parser doesn't enforce case); the compiler does.
        let ast = ast.unwrap();
        let err = compile_statement(&ast, &env()).unwrap_err();
        assert!(matches!(err.kind, CompileErrorKind::UppercaseLowercaseRule(_)));
    }

    #[test]
    fn converter_name_must_start_uppercase() {
        let ast = crate::parser::parse_bool_expr("isEmpty(span.name)").unwrap();
        let err = compile_expr(&ast, &env()).unwrap_err();
        assert!(matches!(err.kind, CompileErrorKind::UppercaseLowercaseRule(_)));
    }

    #[test]
    fn missing_required_argument_is_a_compile_error() {
        let ast = crate::parser::parse_statement("set(span.name)").unwrap();
        let err = compile_statement(&ast, &env()).unwrap_err();
        assert!(matches!(err.kind, CompileErrorKind::MissingRequiredArgument { .. }));
    }

    #[test]
    fn unresolved_field_on_a_known_structure_is_a_compile_error() {
        let ast = crate::parser::parse_value_expr("span.bogus").unwrap();
        let err = compile_expr(&ast, &env()).unwrap_err();
        assert!(matches!(err.kind, CompileErrorKind::UnresolvedField { .. }));
    }

    #[test]
    fn unresolved_enum_symbol_is_a_compile_error() {
        let ast = crate::parser::parse_value_expr("SPAN_KIND_BOGUS").unwrap();
        let err = compile_expr(&ast, &env()).unwrap_err();
        assert!(matches!(err.kind, CompileErrorKind::UnresolvedEnum(_)));
    }

    #[test]
    fn named_and_positional_binding_is_order_independent() {
        let with_named = crate::parser::parse_value_expr("Sum(Right=9, Left=1)").unwrap();
        let with_positional = crate::parser::parse_value_expr("Sum(1, 9)").unwrap();
        let e = env();
        assert!(compile_expr(&with_named, &e).is_ok());
        assert!(compile_expr(&with_positional, &e).is_ok());
    }
}
