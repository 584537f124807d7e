//! The small standard library of editors and converters shipped with the
//! engine itself, as opposed to functions a host registers.
use crate::error::RuntimeError;
use crate::function::{FunctionBuilder, ReflectiveFunction};
use crate::stdlib::primitive::{BoolValue, IntValue, NilValue};
use crate::types::well_known;
use crate::value::{BoxValue, ErrorValue, Native, Value};

/// Every builtin returns this as a guard against a materialized argument
/// array whose length doesn't match the function's own arity — an
/// invariant the compiler should already uphold, checked here in case a
/// caller ever constructs a call outside the normal compile path.
fn checked_arity(name: &'static str, args: &[BoxValue], expected: usize) -> Option<BoxValue> {
    if args.len() == expected {
        None
    } else {
        Some(Box::new(ErrorValue::new(RuntimeError::ArityMismatch {
            function: name.to_owned(),
            expected,
            found: args.len(),
        })))
    }
}

/// `set(target, value)` — the canonical editor: writes `value` through
/// `target`'s settable capability.
pub fn set_function() -> ReflectiveFunction {
    FunctionBuilder::new("set")
        .required_arg("Target")
        .required_arg("Value")
        .build(|mut args| {
            if let Some(err) = checked_arity("set", &args, 2) {
                return err;
            }
            let value = args.remove(1);
            let mut target = args.remove(0);
            match target.as_settable() {
                Some(settable) => match settable.set_value(value) {
                    Ok(()) => Box::new(NilValue),
                    Err(err) => Box::new(ErrorValue::new(RuntimeError::HostRejected(err.0))),
                },
                None => crate::value::missing_capability(&*target, "being set"),
            }
        })
}

/// `route()` — a no-op editor used purely to mark "this statement matched";
/// the host inspects whether the statement ran at all, not this value.
pub fn route_function() -> ReflectiveFunction {
    FunctionBuilder::new("route").build(|args| {
        if let Some(err) = checked_arity("route", &args, 0) {
            return err;
        }
        Box::new(NilValue)
    })
}

/// `IsEmpty(x)` — nil, an empty string, empty bytes, or an empty list/map.
pub fn is_empty_function() -> ReflectiveFunction {
    FunctionBuilder::new("IsEmpty").required_arg("Value").build(|args| {
        if let Some(err) = checked_arity("IsEmpty", &args, 1) {
            return err;
        }
        let empty = match args[0].native() {
            Native::Nil => true,
            Native::String(s) => s.is_empty(),
            Native::Bytes(b) => b.is_empty(),
            Native::List(v) => v.is_empty(),
            Native::Map(m) => m.is_empty(),
            _ => false,
        };
        Box::new(BoolValue(empty))
    })
}

fn is_type_function(name: &'static str, matches: impl Fn(&Native) -> bool + 'static) -> ReflectiveFunction {
    FunctionBuilder::new(name).required_arg("Value").build(move |args| {
        if let Some(err) = checked_arity(name, &args, 1) {
            return err;
        }
        Box::new(BoolValue(matches(&args[0].native())))
    })
}

pub fn is_bool_function() -> ReflectiveFunction {
    is_type_function("IsBool", |n| matches!(n, Native::Bool(_)))
}
pub fn is_int_function() -> ReflectiveFunction {
    is_type_function("IsInt", |n| matches!(n, Native::Int(_)))
}
pub fn is_double_function() -> ReflectiveFunction {
    is_type_function("IsDouble", |n| matches!(n, Native::Float(_)))
}
pub fn is_string_function() -> ReflectiveFunction {
    is_type_function("IsString", |n| matches!(n, Native::String(_)))
}
pub fn is_list_function() -> ReflectiveFunction {
    is_type_function("IsList", |n| matches!(n, Native::List(_)))
}
pub fn is_map_function() -> ReflectiveFunction {
    is_type_function("IsMap", |n| matches!(n, Native::Map(_)))
}

/// `sum(Left, Right=2)` — a converter demonstrating positional/named/default
/// argument binding: `sum(Left=3)` is `5`, `sum(4, 6)` is `10`.
pub fn sum_function() -> ReflectiveFunction {
    FunctionBuilder::new("Sum")
        .required_arg("Left")
        .optional_arg("Right", || Box::new(IntValue(2)))
        .build(|args| {
            if let Some(err) = checked_arity("Sum", &args, 2) {
                return err;
            }
            let left = match args[0].convert_to(&well_known::integer()) {
                Ok(Native::Int(i)) => i,
                _ => {
                    return Box::new(ErrorValue::new(RuntimeError::Conversion {
                        from: args[0].type_of().name().to_owned(),
                        to: "int".into(),
                    }))
                }
            };
            let right = match args[1].convert_to(&well_known::integer()) {
                Ok(Native::Int(i)) => i,
                _ => {
                    return Box::new(ErrorValue::new(RuntimeError::Conversion {
                        from: args[1].type_of().name().to_owned(),
                        to: "int".into(),
                    }))
                }
            };
            Box::new(IntValue(left + right))
        })
}

/// All builtins, ready to hand to `TransformContext::with_functions`.
pub fn all() -> Vec<std::sync::Arc<dyn crate::function::Function>> {
    vec![
        std::sync::Arc::new(set_function()),
        std::sync::Arc::new(route_function()),
        std::sync::Arc::new(is_empty_function()),
        std::sync::Arc::new(is_bool_function()),
        std::sync::Arc::new(is_int_function()),
        std::sync::Arc::new(is_double_function()),
        std::sync::Arc::new(is_string_function()),
        std::sync::Arc::new(is_list_function()),
        std::sync::Arc::new(is_map_function()),
        std::sync::Arc::new(sum_function()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::Function;
    use crate::stdlib::primitive::StringValue;

    #[test]
    fn sum_with_named_left_uses_default_right() {
        let sum = sum_function();
        let result = sum.call(vec![Box::new(IntValue(3)), sum.default_for(1).unwrap()]);
        assert_eq!(result.native(), Native::Int(5));
    }

    #[test]
    fn sum_with_both_positional() {
        let sum = sum_function();
        let result = sum.call(vec![Box::new(IntValue(4)), Box::new(IntValue(6))]);
        assert_eq!(result.native(), Native::Int(10));
    }

    #[test]
    fn is_empty_recognizes_empty_string_and_nil() {
        let f = is_empty_function();
        assert_eq!(f.call(vec![Box::new(StringValue(String::new()))]).native(), Native::Bool(true));
        assert_eq!(f.call(vec![Box::new(NilValue)]).native(), Native::Bool(true));
        assert_eq!(f.call(vec![Box::new(StringValue("x".into()))]).native(), Native::Bool(false));
    }

    #[test]
    fn is_int_distinguishes_from_float() {
        let f = is_int_function();
        assert_eq!(f.call(vec![Box::new(IntValue(1))]).native(), Native::Bool(true));
        assert_eq!(
            f.call(vec![Box::new(crate::stdlib::primitive::FloatValue(1.0))]).native(),
            Native::Bool(false)
        );
    }
}
