//! Value-level edge cases exercised end to end through compiled expressions:
//! literal boundaries, heterogeneous containers, and arithmetic errors.
use ottl_engine::context::TransformContext;
use ottl_engine::function::builtins;
use ottl_engine::stdlib::span::Span;
use ottl_engine::value::{BoxValue, Native, Value};

fn span_context() -> TransformContext<Span> {
    TransformContext::new("span", ottl_engine::stdlib::span::span_type(), |span: &Span| {
        Box::new(span.clone()) as BoxValue
    })
    .with_functions(builtins::all())
}

#[test]
fn empty_list_and_map_literals_evaluate_to_empty_containers() {
    let ctx = span_context();
    let list = ctx.compile_value("[]").unwrap();
    assert_eq!(list.evaluate(&Span::new()).native(), Native::List(Vec::new()));

    let map = ctx.compile_value("{}").unwrap();
    assert_eq!(map.evaluate(&Span::new()).native(), Native::Map(std::collections::HashMap::new()));
}

#[test]
fn list_literals_stay_heterogeneous() {
    let ctx = span_context();
    let list = ctx.compile_value("[1, \"two\", true]").unwrap();
    let Native::List(items) = list.evaluate(&Span::new()).native() else {
        panic!("expected a list");
    };
    assert_eq!(items.len(), 3);
    assert_eq!(items[0].native(), Native::Int(1));
    assert_eq!(items[1].native(), Native::String("two".into()));
    assert_eq!(items[2].native(), Native::Bool(true));
}

#[test]
fn byte_literals_at_their_length_boundaries() {
    let ctx = span_context();
    assert_eq!(ctx.compile_value("0x").unwrap().evaluate(&Span::new()).native(), Native::Bytes(Vec::new()));
    assert_eq!(
        ctx.compile_value("0xAABBCCDDEEFF00112233445566778899").unwrap().evaluate(&Span::new()).native(),
        Native::Bytes(vec![
            0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF, 0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99
        ])
    );
}

#[test]
fn a_byte_literal_longer_than_32_bytes_is_rejected_at_lex_time() {
    let ctx = span_context();
    let hex: String = std::iter::repeat("AB").take(33).collect();
    assert!(ctx.compile_value(&format!("0x{hex}")).is_err());
}

#[test]
fn index_out_of_range_on_a_list_is_an_error_value_not_a_panic() {
    use ottl_engine::stdlib::list::ListValue;
    use ottl_engine::stdlib::primitive::IntValue;

    let ctx = span_context().with_constant(
        "numbers",
        Box::new(ListValue(vec![Box::new(IntValue(1)), Box::new(IntValue(2))])),
    );
    let value = ctx.compile_value("numbers[5]").unwrap();
    let evaluated = value.evaluate(&Span::new());
    assert!(evaluated.as_error().is_some());
}

#[test]
fn float_literals_parse_with_a_decimal_point_or_an_exponent() {
    let ctx = span_context();
    assert_eq!(ctx.compile_value("1.5").unwrap().evaluate(&Span::new()).native(), Native::Float(1.5));
    assert_eq!(ctx.compile_value("1e3").unwrap().evaluate(&Span::new()).native(), Native::Float(1000.0));
    assert_eq!(ctx.compile_value("2.5e-1").unwrap().evaluate(&Span::new()).native(), Native::Float(0.25));
}

#[test]
fn comparison_between_unrelated_primitive_types_is_false_not_an_error() {
    let ctx = span_context();
    let numeric_string = ctx.compile_condition("1 == \"1\"").unwrap();
    let evaluated = numeric_string.evaluate(&Span::new());
    assert_eq!(evaluated.native(), Native::Bool(false));
    assert!(evaluated.as_error().is_none());

    let non_numeric_string = ctx.compile_condition("1 == \"not-a-number\"").unwrap();
    let evaluated = non_numeric_string.evaluate(&Span::new());
    assert_eq!(evaluated.native(), Native::Bool(false));
    assert!(evaluated.as_error().is_none());
}

#[test]
fn arithmetic_on_incompatible_types_is_an_error_value() {
    let ctx = span_context();
    let value = ctx.compile_value("1 + \"x\"").unwrap();
    assert!(value.evaluate(&Span::new()).as_error().is_some());
}
