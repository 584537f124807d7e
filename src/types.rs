//! Identity of runtime types. Types are tags compared by name, never by
//! structural shape, so a function checking "is this argument a bool" just
//! compares the argument's type against a held singleton.
use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

/// What kind of descriptor a [`Type`] wraps.
#[derive(Debug, Clone)]
enum TypeShape {
    Primitive,
    Structure { fields: HashMap<String, Type> },
    Enum { enum_type_name: String },
}

/// A first-class runtime type tag. Cheaply cloneable; equality is by `name`.
#[derive(Debug, Clone)]
pub struct Type(Arc<TypeInner>);

#[derive(Debug)]
struct TypeInner {
    name: String,
    shape: TypeShape,
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        self.0.name == other.0.name
    }
}
impl Eq for Type {}

impl Display for Type {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.name)
    }
}

impl Type {
    pub fn primitive(name: impl Into<String>) -> Self {
        Self(Arc::new(TypeInner {
            name: name.into(),
            shape: TypeShape::Primitive,
        }))
    }

    pub fn structure(name: impl Into<String>, fields: HashMap<String, Type>) -> Self {
        Self(Arc::new(TypeInner {
            name: name.into(),
            shape: TypeShape::Structure { fields },
        }))
    }

    pub fn enum_type(name: impl Into<String>, enum_type_name: impl Into<String>) -> Self {
        Self(Arc::new(TypeInner {
            name: name.into(),
            shape: TypeShape::Enum {
                enum_type_name: enum_type_name.into(),
            },
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn is_structure(&self) -> bool {
        matches!(self.0.shape, TypeShape::Structure { .. })
    }

    pub fn is_enum(&self) -> bool {
        matches!(self.0.shape, TypeShape::Enum { .. })
    }

    /// Field names of a structure type, in insertion-unspecified but stable order.
    pub fn field_names(&self) -> Vec<&str> {
        match &self.0.shape {
            TypeShape::Structure { fields } => fields.keys().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// `(field type, found)` — `found` is false both when this isn't a
    /// structure type and when the structure simply has no field by that
    /// name.
    pub fn get_field(&self, name: &str) -> Option<Type> {
        match &self.0.shape {
            TypeShape::Structure { fields } => fields.get(name).cloned(),
            _ => None,
        }
    }
}

/// Well-known primitive type singletons, created once and shared by every
/// stdlib value.
pub mod well_known {
    use super::Type;
    use once_cell::sync::Lazy;

    macro_rules! well_known_type {
        ($fn_name:ident, $name:expr) => {
            pub fn $fn_name() -> Type {
                static TY: Lazy<Type> = Lazy::new(|| Type::primitive($name));
                TY.clone()
            }
        };
    }

    well_known_type!(nil, "nil");
    well_known_type!(boolean, "bool");
    well_known_type!(integer, "int");
    well_known_type!(float, "float");
    well_known_type!(string, "string");
    well_known_type!(bytes, "bytes");
    well_known_type!(list, "list");
    well_known_type!(map, "map");
    well_known_type!(error, "error");

    /// The `pcommon.Value`-equivalent top type: an opaque dynamically-typed
    /// attribute value whose `convertTo` inspects its runtime tag.
    well_known_type!(attribute_value, "attribute_value");
    well_known_type!(attribute_map, "attribute_map");
    well_known_type!(trace_id, "trace_id");
    well_known_type!(span_id, "span_id");
    well_known_type!(trace_state, "trace_state");
    well_known_type!(timestamp, "timestamp");
    well_known_type!(status, "status");
    well_known_type!(status_code, "status_code");
    well_known_type!(span_kind, "span_kind");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_type_identity_is_by_name() {
        let a = Type::primitive("int");
        let b = Type::primitive("int");
        assert_eq!(a, b);
        assert_ne!(a, Type::primitive("float"));
    }

    #[test]
    fn structure_field_lookup() {
        let mut fields = HashMap::new();
        fields.insert("name".to_owned(), well_known::string());
        let span = Type::structure("span", fields);

        assert_eq!(span.get_field("name"), Some(well_known::string()));
        assert_eq!(span.get_field("missing"), None);
        assert!(span.is_structure());
    }

    #[test]
    fn well_known_singletons_are_stable() {
        assert_eq!(well_known::integer(), well_known::integer());
        assert_ne!(well_known::integer(), well_known::float());
    }
}
