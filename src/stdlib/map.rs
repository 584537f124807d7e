//! String-keyed map literal values (`{"a": 1, "b": 2}`). Like
//! [`crate::stdlib::list`], a literal map is a plain owned value — key
//! access returns a snapshot, not a lens.
use crate::error::RuntimeError;
use crate::types::{well_known, Type};
use crate::value::{BoxValue, ErrorValue, KeyAccessible, Native, Value};
use std::collections::HashMap;

#[derive(Debug)]
pub struct MapValue(pub HashMap<String, BoxValue>);

impl Value for MapValue {
    fn type_of(&self) -> Type {
        well_known::map()
    }

    fn native(&self) -> Native {
        Native::Map(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), v.clone_value()))
                .collect(),
        )
    }

    fn convert_to(&self, target: &Type) -> Result<Native, RuntimeError> {
        if *target == well_known::map() {
            Ok(self.native())
        } else {
            Err(RuntimeError::Conversion {
                from: "map".into(),
                to: target.name().to_owned(),
            })
        }
    }

    fn clone_value(&self) -> BoxValue {
        Box::new(MapValue(
            self.0.iter().map(|(k, v)| (k.clone(), v.clone_value())).collect(),
        ))
    }

    fn as_key_accessible(&self) -> Option<&dyn KeyAccessible> {
        Some(self)
    }
}

impl KeyAccessible for MapValue {
    fn get_key(&self, key: &str) -> BoxValue {
        match self.0.get(key) {
            Some(v) => v.clone_value(),
            None => Box::new(ErrorValue::new(RuntimeError::KeyNotFound(key.to_owned()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stdlib::primitive::StringValue;

    #[test]
    fn empty_map_literal() {
        let map = MapValue(HashMap::new());
        assert!(matches!(map.native(), Native::Map(m) if m.is_empty()));
    }

    #[test]
    fn missing_key_is_error_value() {
        let map = MapValue(HashMap::new());
        assert!(map.get_key("missing").as_error().is_some());
    }

    #[test]
    fn present_key_round_trips() {
        let mut inner = HashMap::new();
        inner.insert("a".to_owned(), Box::new(StringValue("v".into())) as BoxValue);
        let map = MapValue(inner);
        assert!(matches!(map.get_key("a").native(), Native::String(s) if s == "v"));
    }
}
