//! A representative host-adapter structure type: a trace span.
//!
//! Covers one field catalogue end to end (name, kind, trace_id, span_id,
//! trace_state, status, attributes, resource.attributes) to prove out the
//! adapter shape without modeling the full telemetry data model. See
//! `DESIGN.md` for why a `trace_state` write that fails to parse is
//! silently dropped rather than surfaced as an error.
use crate::enum_provider::EnumProvider;
use crate::error::{RuntimeError, SetError};
use crate::stdlib::attribute::AttributeMap;
use crate::stdlib::primitive::{BytesValue, IntValue, StringValue};
use crate::types::{well_known, Type};
use crate::value::{BoxValue, ErrorValue, FieldAccessible, Lens, Native, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::{self, Debug, Formatter};
use std::rc::Rc;
use std::sync::OnceLock;

/// `SpanKind` — a closed enum, exposed to the language as named constants
/// (`SPAN_KIND_CLIENT`, etc.) through [`SpanKindEnum`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    Unspecified,
    Internal,
    Server,
    Client,
    Producer,
    Consumer,
}

impl SpanKind {
    fn as_i64(self) -> i64 {
        match self {
            Self::Unspecified => 0,
            Self::Internal => 1,
            Self::Server => 2,
            Self::Client => 3,
            Self::Producer => 4,
            Self::Consumer => 5,
        }
    }

    fn from_i64(v: i64) -> Option<Self> {
        Some(match v {
            0 => Self::Unspecified,
            1 => Self::Internal,
            2 => Self::Server,
            3 => Self::Client,
            4 => Self::Producer,
            5 => Self::Consumer,
            _ => return None,
        })
    }
}

pub struct SpanKindEnum;

impl EnumProvider for SpanKindEnum {
    fn lookup(&self, symbol: &str) -> Option<i64> {
        let kind = match symbol {
            "SPAN_KIND_UNSPECIFIED" => SpanKind::Unspecified,
            "SPAN_KIND_INTERNAL" => SpanKind::Internal,
            "SPAN_KIND_SERVER" => SpanKind::Server,
            "SPAN_KIND_CLIENT" => SpanKind::Client,
            "SPAN_KIND_PRODUCER" => SpanKind::Producer,
            "SPAN_KIND_CONSUMER" => SpanKind::Consumer,
            _ => return None,
        };
        Some(kind.as_i64())
    }
}

/// `StatusCode` — same shape as `SpanKind`, kept as a distinct enum family
/// since `SpanKind` and `StatusCode` are unrelated in the host data model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Unset,
    Ok,
    Error,
}

impl StatusCode {
    fn as_i64(self) -> i64 {
        match self {
            Self::Unset => 0,
            Self::Ok => 1,
            Self::Error => 2,
        }
    }

    fn from_i64(v: i64) -> Option<Self> {
        Some(match v {
            0 => Self::Unset,
            1 => Self::Ok,
            2 => Self::Error,
            _ => return None,
        })
    }
}

pub struct StatusCodeEnum;

impl EnumProvider for StatusCodeEnum {
    fn lookup(&self, symbol: &str) -> Option<i64> {
        let code = match symbol {
            "STATUS_CODE_UNSET" => StatusCode::Unset,
            "STATUS_CODE_OK" => StatusCode::Ok,
            "STATUS_CODE_ERROR" => StatusCode::Error,
            _ => return None,
        };
        Some(code.as_i64())
    }
}

/// A span's `status` sub-record: `{code, message}`.
#[derive(Debug, Clone, Default)]
pub struct SpanStatus {
    pub code: i64,
    pub message: String,
}

/// The mutable state backing a [`Span`] adapter. Lives behind `Rc<RefCell<_>>`
/// so every lens handed out by a `Span` can be `'static`; see
/// `crate::value::lens` for the rationale.
#[derive(Debug, Default)]
struct SpanState {
    name: String,
    kind: i64,
    trace_id: [u8; 16],
    span_id: [u8; 8],
    trace_state: HashMap<String, String>,
    status: SpanStatus,
    attributes: AttributeMap,
    resource_attributes: AttributeMap,
}

pub fn span_type() -> Type {
    static TY: OnceLock<Type> = OnceLock::new();
    TY.get_or_init(|| {
        let mut fields = HashMap::new();
        fields.insert("name".to_owned(), well_known::string());
        fields.insert("kind".to_owned(), well_known::span_kind());
        fields.insert("trace_id".to_owned(), well_known::trace_id());
        fields.insert("span_id".to_owned(), well_known::span_id());
        fields.insert("trace_state".to_owned(), well_known::trace_state());
        fields.insert("status".to_owned(), well_known::status());
        fields.insert("attributes".to_owned(), well_known::attribute_map());

        let mut resource_fields = HashMap::new();
        resource_fields.insert("attributes".to_owned(), well_known::attribute_map());
        fields.insert(
            "resource".to_owned(),
            Type::structure("resource", resource_fields),
        );

        Type::structure("span", fields)
    })
    .clone()
}

/// A trace span: the sample host record used to exercise the
/// field-path/lens machinery end to end. Cheap to clone — clones share the
/// same underlying record, the usual handle semantics for a telemetry span
/// type.
#[derive(Clone, Default)]
pub struct Span(Rc<RefCell<SpanState>>);

impl Debug for Span {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Span({:?})", self.0.borrow().name)
    }
}

impl Span {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        let span = Self::new();
        span.0.borrow_mut().name = name.into();
        span
    }

    pub fn attributes(&self) -> AttributeMap {
        self.0.borrow().attributes.clone()
    }

    pub fn set_attributes(&self, attrs: AttributeMap) {
        self.0.borrow_mut().attributes = attrs;
    }

    pub fn resource_attributes(&self) -> AttributeMap {
        self.0.borrow().resource_attributes.clone()
    }
}

impl Value for Span {
    fn type_of(&self) -> Type {
        span_type()
    }

    fn native(&self) -> Native {
        missing_capability_native()
    }

    fn convert_to(&self, target: &Type) -> Result<Native, RuntimeError> {
        Err(RuntimeError::Conversion {
            from: "span".into(),
            to: target.name().to_owned(),
        })
    }

    fn clone_value(&self) -> BoxValue {
        Box::new(self.clone())
    }

    fn as_field_accessible(&self) -> Option<&dyn FieldAccessible> {
        Some(self)
    }
}

fn missing_capability_native() -> Native {
    // A structure value has no meaningful scalar representation; field
    // access is the only supported path.
    Native::Nil
}

impl FieldAccessible for Span {
    fn get_field(&self, field: &str) -> BoxValue {
        match field {
            "name" => {
                let rc = self.0.clone();
                let rc_read = rc.clone();
                Box::new(Lens::new(
                    well_known::string(),
                    move || Box::new(StringValue(rc_read.borrow().name.clone())) as BoxValue,
                    move |v| {
                        let Native::String(s) = v.native() else {
                            return Err(SetError("span.name expects a string".into()));
                        };
                        rc.borrow_mut().name = s;
                        Ok(())
                    },
                ))
            }
            "kind" => {
                let rc = self.0.clone();
                let rc_read = rc.clone();
                Box::new(Lens::new(
                    well_known::span_kind(),
                    move || Box::new(IntValue(rc_read.borrow().kind)) as BoxValue,
                    move |v| {
                        let Native::Int(i) = v.native() else {
                            return Err(SetError("span.kind expects a span kind".into()));
                        };
                        if SpanKind::from_i64(i).is_none() {
                            return Err(SetError(format!("{i} is not a valid span kind")));
                        }
                        rc.borrow_mut().kind = i;
                        Ok(())
                    },
                ))
            }
            "trace_id" => {
                let rc = self.0.clone();
                let rc_read = rc.clone();
                Box::new(Lens::new(
                    well_known::trace_id(),
                    move || Box::new(BytesValue(rc_read.borrow().trace_id.to_vec())) as BoxValue,
                    move |v| {
                        let Native::Bytes(b) = v.native() else {
                            return Err(SetError("span.trace_id expects bytes".into()));
                        };
                        let id: [u8; 16] = b
                            .try_into()
                            .map_err(|_| SetError("trace ids must be 16 bytes".into()))?;
                        rc.borrow_mut().trace_id = id;
                        Ok(())
                    },
                ))
            }
            "span_id" => {
                let rc = self.0.clone();
                let rc_read = rc.clone();
                Box::new(Lens::new(
                    well_known::span_id(),
                    move || Box::new(BytesValue(rc_read.borrow().span_id.to_vec())) as BoxValue,
                    move |v| {
                        let Native::Bytes(b) = v.native() else {
                            return Err(SetError("span.span_id expects bytes".into()));
                        };
                        let id: [u8; 8] = b
                            .try_into()
                            .map_err(|_| SetError("span ids must be 8 bytes".into()))?;
                        rc.borrow_mut().span_id = id;
                        Ok(())
                    },
                ))
            }
            "trace_state" => {
                let rc = self.0.clone();
                let rc_read = rc.clone();
                Box::new(Lens::new(
                    well_known::trace_state(),
                    move || Box::new(StringValue(encode_trace_state(&rc_read.borrow().trace_state))) as BoxValue,
                    move |v| {
                        let Native::String(s) = v.native() else {
                            return Err(SetError("span.trace_state expects a string".into()));
                        };
                        // A trace_state string that fails to parse as
                        // `key=value,...` leaves the existing state
                        // untouched rather than surfacing a write error.
                        if let Some(parsed) = parse_trace_state(&s) {
                            rc.borrow_mut().trace_state = parsed;
                        }
                        Ok(())
                    },
                ))
            }
            "status" => {
                let rc = self.0.clone();
                Box::new(StatusValue(rc))
            }
            "attributes" => Box::new(self.0.borrow().attributes.clone()),
            "resource" => Box::new(ResourceValue(self.0.clone())),
            _ => Box::new(ErrorValue::new(RuntimeError::FieldNotFound {
                type_name: "span".into(),
                field: field.to_owned(),
            })),
        }
    }
}

fn encode_trace_state(entries: &HashMap<String, String>) -> String {
    let mut pairs: Vec<String> = entries.iter().map(|(k, v)| format!("{k}={v}")).collect();
    pairs.sort();
    pairs.join(",")
}

fn parse_trace_state(raw: &str) -> Option<HashMap<String, String>> {
    if raw.is_empty() {
        return Some(HashMap::new());
    }
    let mut out = HashMap::new();
    for entry in raw.split(',') {
        let (k, v) = entry.split_once('=')?;
        if k.trim().is_empty() {
            return None;
        }
        out.insert(k.trim().to_owned(), v.trim().to_owned());
    }
    Some(out)
}

/// `span.status` — a nested structure whose own fields (`code`, `message`)
/// are themselves lenses over the same backing state.
#[derive(Clone)]
struct StatusValue(Rc<RefCell<SpanState>>);

impl Debug for StatusValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "StatusValue")
    }
}

fn status_type() -> Type {
    static TY: OnceLock<Type> = OnceLock::new();
    TY.get_or_init(|| {
        let mut fields = HashMap::new();
        fields.insert("code".to_owned(), well_known::status_code());
        fields.insert("message".to_owned(), well_known::string());
        Type::structure("status", fields)
    })
    .clone()
}

impl Value for StatusValue {
    fn type_of(&self) -> Type {
        status_type()
    }
    fn native(&self) -> Native {
        Native::Nil
    }
    fn convert_to(&self, target: &Type) -> Result<Native, RuntimeError> {
        Err(RuntimeError::Conversion {
            from: "status".into(),
            to: target.name().to_owned(),
        })
    }
    fn clone_value(&self) -> BoxValue {
        Box::new(self.clone())
    }
    fn as_field_accessible(&self) -> Option<&dyn FieldAccessible> {
        Some(self)
    }
}

impl FieldAccessible for StatusValue {
    fn get_field(&self, field: &str) -> BoxValue {
        match field {
            "code" => {
                let rc = self.0.clone();
                let rc_read = rc.clone();
                Box::new(Lens::new(
                    well_known::status_code(),
                    move || Box::new(IntValue(rc_read.borrow().status.code)) as BoxValue,
                    move |v| {
                        let Native::Int(i) = v.native() else {
                            return Err(SetError("status.code expects a status code".into()));
                        };
                        if StatusCode::from_i64(i).is_none() {
                            return Err(SetError(format!("{i} is not a valid status code")));
                        }
                        rc.borrow_mut().status.code = i;
                        Ok(())
                    },
                ))
            }
            "message" => {
                let rc = self.0.clone();
                let rc_read = rc.clone();
                Box::new(Lens::new(
                    well_known::string(),
                    move || Box::new(StringValue(rc_read.borrow().status.message.clone())) as BoxValue,
                    move |v| {
                        let Native::String(s) = v.native() else {
                            return Err(SetError("status.message expects a string".into()));
                        };
                        rc.borrow_mut().status.message = s;
                        Ok(())
                    },
                ))
            }
            _ => Box::new(ErrorValue::new(RuntimeError::FieldNotFound {
                type_name: "status".into(),
                field: field.to_owned(),
            })),
        }
    }
}

/// `span.resource` — currently just `{attributes}`, a one-level field
/// catalogue sufficient to exercise nested field access.
#[derive(Clone)]
struct ResourceValue(Rc<RefCell<SpanState>>);

impl Debug for ResourceValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceValue")
    }
}

fn resource_type() -> Type {
    static TY: OnceLock<Type> = OnceLock::new();
    TY.get_or_init(|| {
        let mut fields = HashMap::new();
        fields.insert("attributes".to_owned(), well_known::attribute_map());
        Type::structure("resource", fields)
    })
    .clone()
}

impl Value for ResourceValue {
    fn type_of(&self) -> Type {
        resource_type()
    }
    fn native(&self) -> Native {
        Native::Nil
    }
    fn convert_to(&self, target: &Type) -> Result<Native, RuntimeError> {
        Err(RuntimeError::Conversion {
            from: "resource".into(),
            to: target.name().to_owned(),
        })
    }
    fn clone_value(&self) -> BoxValue {
        Box::new(self.clone())
    }
    fn as_field_accessible(&self) -> Option<&dyn FieldAccessible> {
        Some(self)
    }
}

impl FieldAccessible for ResourceValue {
    fn get_field(&self, field: &str) -> BoxValue {
        match field {
            "attributes" => Box::new(self.0.borrow().resource_attributes.clone()),
            _ => Box::new(ErrorValue::new(RuntimeError::FieldNotFound {
                type_name: "resource".into(),
                field: field.to_owned(),
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stdlib::attribute::AttributeValue;
    use crate::value::{KeyAccessible, Settable};

    #[test]
    fn name_field_reads_and_writes() {
        let span = Span::with_name("incoming");
        let mut lens = span.get_field("name");
        assert!(matches!(lens.native(), Native::String(ref s) if s == "incoming"));

        lens.as_settable()
            .unwrap()
            .set_value(Box::new(StringValue("renamed".into())))
            .unwrap();
        assert!(matches!(span.get_field("name").native(), Native::String(ref s) if s == "renamed"));
    }

    #[test]
    fn trace_id_field_reads_and_writes_sixteen_bytes() {
        let span = Span::new();
        assert!(matches!(span.get_field("trace_id").native(), Native::Bytes(b) if b == vec![0u8; 16]));

        let mut lens = span.get_field("trace_id");
        let id: Vec<u8> = (1..=16).collect();
        lens.as_settable().unwrap().set_value(Box::new(BytesValue(id.clone()))).unwrap();
        assert!(matches!(span.get_field("trace_id").native(), Native::Bytes(b) if b == id));
    }

    #[test]
    fn trace_id_write_with_the_wrong_length_is_rejected() {
        let span = Span::new();
        let mut lens = span.get_field("trace_id");
        let err = lens.as_settable().unwrap().set_value(Box::new(BytesValue(vec![1, 2, 3]))).unwrap_err();
        assert!(err.0.contains("16 bytes"));
    }

    #[test]
    fn span_id_field_reads_and_writes_eight_bytes() {
        let span = Span::new();
        let mut lens = span.get_field("span_id");
        let id: Vec<u8> = (1..=8).collect();
        lens.as_settable().unwrap().set_value(Box::new(BytesValue(id.clone()))).unwrap();
        assert!(matches!(span.get_field("span_id").native(), Native::Bytes(b) if b == id));
    }

    #[test]
    fn span_id_write_with_the_wrong_length_is_rejected() {
        let span = Span::new();
        let mut lens = span.get_field("span_id");
        let err = lens.as_settable().unwrap().set_value(Box::new(BytesValue(vec![1, 2, 3]))).unwrap_err();
        assert!(err.0.contains("8 bytes"));
    }

    #[test]
    fn unknown_field_is_error_value() {
        let span = Span::new();
        assert!(span.get_field("nonexistent").as_error().is_some());
    }

    #[test]
    fn attributes_write_through_persists_on_the_span() {
        let span = Span::new();
        let attrs = span.attributes();
        let mut lens = attrs.get_key("http.method");
        lens.as_settable()
            .unwrap()
            .set_value(Box::new(StringValue("GET".into())))
            .unwrap();

        let reread = span.attributes();
        let v = reread.get("http.method").unwrap();
        assert!(matches!(v.native(), Native::String(s) if s == "GET"));
    }

    #[test]
    fn trace_state_write_with_unparsable_value_is_silently_dropped() {
        let span = Span::new();
        {
            let mut lens = span.get_field("trace_state");
            lens.as_settable()
                .unwrap()
                .set_value(Box::new(StringValue("a=1,b=2".into())))
                .unwrap();
        }
        {
            let mut lens = span.get_field("trace_state");
            // No '=' in "garbage" -> unparsable -> write is dropped, not an error.
            lens.as_settable()
                .unwrap()
                .set_value(Box::new(StringValue("garbage".into())))
                .unwrap();
        }
        let lens = span.get_field("trace_state");
        assert!(matches!(lens.native(), Native::String(ref s) if s == "a=1,b=2"));
    }

    #[test]
    fn span_kind_enum_round_trips_through_lookup() {
        let enumeration = SpanKindEnum;
        assert_eq!(enumeration.lookup("SPAN_KIND_CLIENT"), Some(3));
        assert_eq!(enumeration.lookup("SPAN_KIND_BOGUS"), None);
    }

    #[test]
    fn resource_attributes_is_keyed_and_independent_of_span_attributes() {
        let span = Span::new();
        let resource = span.get_field("resource");
        let resource_attrs = resource.as_field_accessible().unwrap().get_field("attributes");
        assert!(resource_attrs.as_key_accessible().is_some());

        let span_attrs = span.get_field("attributes");
        assert!(span_attrs.as_key_accessible().is_some());
    }

    #[test]
    fn attribute_value_handle_shares_state_with_its_clone() {
        let v = AttributeValue::from_string("x");
        let cloned = v.clone();
        assert!(matches!(cloned.native(), Native::String(ref s) if s == "x"));
    }
}
