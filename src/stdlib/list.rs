//! List literal values (`[1, 2, 3]`). Left heterogeneous at runtime — no
//! element-type checking is performed, so `[1, "two", true]` is a valid
//! list.
//!
//! A list literal is a plain owned value, not a host structure, so indexing
//! into it returns a snapshot clone rather than a lens — there is no parent
//! container for a write to persist into.
use crate::error::RuntimeError;
use crate::types::{well_known, Type};
use crate::value::{BoxValue, ErrorValue, Indexable, Native, Value};

#[derive(Debug)]
pub struct ListValue(pub Vec<BoxValue>);

impl Value for ListValue {
    fn type_of(&self) -> Type {
        well_known::list()
    }

    fn native(&self) -> Native {
        Native::List(self.0.iter().map(|v| v.clone_value()).collect())
    }

    fn convert_to(&self, target: &Type) -> Result<Native, RuntimeError> {
        if *target == well_known::list() {
            Ok(self.native())
        } else {
            Err(RuntimeError::Conversion {
                from: "list".into(),
                to: target.name().to_owned(),
            })
        }
    }

    fn clone_value(&self) -> BoxValue {
        Box::new(ListValue(self.0.iter().map(|v| v.clone_value()).collect()))
    }

    fn as_indexable(&self) -> Option<&dyn Indexable> {
        Some(self)
    }
}

impl Indexable for ListValue {
    fn get_index(&self, index: i64) -> BoxValue {
        let len = self.0.len();
        if index < 0 || index as usize >= len {
            return Box::new(ErrorValue::new(RuntimeError::IndexOutOfRange { index, len }));
        }
        self.0[index as usize].clone_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stdlib::primitive::IntValue;

    #[test]
    fn index_at_zero_and_len_minus_one() {
        let list = ListValue(vec![Box::new(IntValue(10)), Box::new(IntValue(20)), Box::new(IntValue(30))]);
        assert!(matches!(list.get_index(0).native(), Native::Int(10)));
        assert!(matches!(list.get_index(2).native(), Native::Int(30)));
    }

    #[test]
    fn out_of_range_index_is_error_value() {
        let list = ListValue(vec![Box::new(IntValue(1))]);
        assert!(list.get_index(5).as_error().is_some());
        assert!(list.get_index(-1).as_error().is_some());
    }

    #[test]
    fn empty_list_literal() {
        let list = ListValue(vec![]);
        assert!(matches!(list.native(), Native::List(v) if v.is_empty()));
    }
}
