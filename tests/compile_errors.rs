//! Compile-time rejections: the naming rule, unresolved names/fields/enums,
//! and argument-binding failures, all surfaced as `CompileError` rather than
//! deferred to runtime.
use ottl_engine::error::CompileErrorKind;
use ottl_engine::function::builtins;
use ottl_engine::stdlib::span::Span;
use ottl_engine::value::BoxValue;

fn span_context() -> ottl_engine::context::TransformContext<Span> {
    ottl_engine::context::TransformContext::new("span", ottl_engine::stdlib::span::span_type(), |span: &Span| {
        Box::new(span.clone()) as BoxValue
    })
    .with_functions(builtins::all())
}

#[test]
fn an_editor_call_starting_uppercase_is_rejected() {
    let ctx = span_context();
    let err = ctx.compile_statement("Set(span.name, \"x\")").unwrap_err();
    assert!(matches!(err.kind, CompileErrorKind::UppercaseLowercaseRule(_)));
}

#[test]
fn a_converter_call_starting_lowercase_is_rejected() {
    let ctx = span_context();
    let err = ctx.compile_condition("isEmpty(span.name)").unwrap_err();
    assert!(matches!(err.kind, CompileErrorKind::UppercaseLowercaseRule(_)));
}

#[test]
fn an_unbound_root_name_is_unresolved() {
    let ctx = span_context();
    let err = ctx.compile_value("request.path").unwrap_err();
    assert!(matches!(err.kind, CompileErrorKind::UnresolvedName(_)));
}

#[test]
fn a_field_not_in_the_structure_catalogue_is_unresolved() {
    let ctx = span_context();
    let err = ctx.compile_value("span.nonexistent_field").unwrap_err();
    assert!(matches!(err.kind, CompileErrorKind::UnresolvedField { .. }));
}

#[test]
fn calling_an_unregistered_function_is_unresolved() {
    let ctx = span_context();
    let err = ctx.compile_statement("delete(span.name)").unwrap_err();
    assert!(matches!(err.kind, CompileErrorKind::UnresolvedFunction(_)));
}

#[test]
fn omitting_a_required_argument_is_a_compile_error() {
    let ctx = span_context();
    let err = ctx.compile_statement("set(span.name)").unwrap_err();
    assert!(matches!(err.kind, CompileErrorKind::MissingRequiredArgument { .. }));
}

#[test]
fn extra_positional_arguments_beyond_a_functions_arity_are_rejected() {
    let ctx = span_context();
    let err = ctx.compile_statement("set(span.name, \"a\", \"b\")").unwrap_err();
    assert!(matches!(err.kind, CompileErrorKind::Syntax(_)));
}

#[test]
fn a_named_argument_that_does_not_exist_is_rejected() {
    let ctx = span_context();
    let err = ctx.compile_value("Sum(Left=1, Bogus=2)").unwrap_err();
    assert!(matches!(err.kind, CompileErrorKind::Syntax(_)));
}

#[test]
fn positional_argument_after_named_is_rejected_at_parse_time() {
    let ctx = span_context();
    let err = ctx.compile_value("Sum(Left=1, 2)").unwrap_err();
    assert!(matches!(err.kind, CompileErrorKind::PositionalAfterNamed));
}

#[test]
fn duplicate_named_argument_is_a_compile_error() {
    let ctx = span_context();
    let err = ctx.compile_value("Sum(Left=1, Left=2)").unwrap_err();
    assert!(matches!(err.kind, CompileErrorKind::DuplicateNamedArgument(_)));
}
