//! The generic host attribute value type and its companion keyed container.
//!
//! `AttributeValue` owns a tagged union behind `Rc<RefCell<_>>` rather than
//! holding a lens itself — it *is* the host-owned storage cell, the same
//! way telemetry attribute values typically wrap a pointer into
//! externally-managed memory. `AttributeMap` is the keyed container one
//! level up (a span's or resource's `attributes` field); indexing into it
//! produces lenses over its entries.
use crate::error::{RuntimeError, SetError};
use crate::types::{well_known, Type};
use crate::value::{
    BoxValue, ErrorValue, KeyAccessible, Lens, MaterializedLens, Native, Value,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::{self, Debug, Formatter};
use std::rc::Rc;

#[derive(Clone)]
enum AttrState {
    Empty,
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    List(Vec<AttributeValue>),
    Map(HashMap<String, AttributeValue>),
}

#[derive(Clone)]
pub struct AttributeValue(Rc<RefCell<AttrState>>);

impl Debug for AttributeValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "AttributeValue({:?})", self.native())
    }
}

impl Default for AttributeValue {
    fn default() -> Self {
        Self::empty()
    }
}

impl AttributeValue {
    pub fn empty() -> Self {
        Self(Rc::new(RefCell::new(AttrState::Empty)))
    }

    pub fn from_bool(b: bool) -> Self {
        Self(Rc::new(RefCell::new(AttrState::Bool(b))))
    }
    pub fn from_int(i: i64) -> Self {
        Self(Rc::new(RefCell::new(AttrState::Int(i))))
    }
    pub fn from_double(f: f64) -> Self {
        Self(Rc::new(RefCell::new(AttrState::Double(f))))
    }
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(Rc::new(RefCell::new(AttrState::String(s.into()))))
    }

    /// Builds a pval by inspecting a [`Native`] payload, the conversion
    /// every write-through (`set(attrs["k"], value)`) funnels through.
    pub fn from_box_value(value: BoxValue) -> Self {
        let state = match value.native() {
            Native::Nil => AttrState::Empty,
            Native::Bool(b) => AttrState::Bool(b),
            Native::Int(i) => AttrState::Int(i),
            Native::Float(f) => AttrState::Double(f),
            Native::String(s) => AttrState::String(s),
            Native::Bytes(b) => AttrState::Bytes(b),
            Native::List(items) => {
                AttrState::List(items.into_iter().map(AttributeValue::from_box_value).collect())
            }
            Native::Map(entries) => AttrState::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, AttributeValue::from_box_value(v)))
                    .collect(),
            ),
        };
        Self(Rc::new(RefCell::new(state)))
    }
}

impl Value for AttributeValue {
    fn type_of(&self) -> Type {
        well_known::attribute_value()
    }

    fn native(&self) -> Native {
        match &*self.0.borrow() {
            AttrState::Empty => Native::Nil,
            AttrState::Bool(b) => Native::Bool(*b),
            AttrState::Int(i) => Native::Int(*i),
            AttrState::Double(f) => Native::Float(*f),
            AttrState::String(s) => Native::String(s.clone()),
            AttrState::Bytes(b) => Native::Bytes(b.clone()),
            AttrState::List(items) => {
                Native::List(items.iter().map(|v| Box::new(v.clone()) as BoxValue).collect())
            }
            AttrState::Map(entries) => Native::Map(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), Box::new(v.clone()) as BoxValue))
                    .collect(),
            ),
        }
    }

    fn convert_to(&self, target: &Type) -> Result<Native, RuntimeError> {
        if *target == well_known::attribute_value() {
            return Ok(self.native());
        }
        let state = self.0.borrow();
        let ok = match (&*state, target) {
            (AttrState::Empty, t) if *t == well_known::nil() => true,
            (AttrState::Bool(_), t) if *t == well_known::boolean() => true,
            (AttrState::Int(_), t) if *t == well_known::integer() => true,
            (AttrState::Double(_), t) if *t == well_known::float() => true,
            (AttrState::String(_), t) if *t == well_known::string() => true,
            (AttrState::Bytes(_), t) if *t == well_known::bytes() => true,
            (AttrState::List(_), t) if *t == well_known::list() => true,
            (AttrState::Map(_), t) if *t == well_known::map() => true,
            _ => false,
        };
        drop(state);
        if ok {
            Ok(self.native())
        } else {
            Err(RuntimeError::Conversion {
                from: well_known::attribute_value().name().to_owned(),
                to: target.name().to_owned(),
            })
        }
    }

    fn clone_value(&self) -> BoxValue {
        Box::new(self.clone())
    }

    fn as_indexable(&self) -> Option<&dyn crate::value::Indexable> {
        Some(self)
    }
    fn as_key_accessible(&self) -> Option<&dyn KeyAccessible> {
        Some(self)
    }
}

impl crate::value::Indexable for AttributeValue {
    fn get_index(&self, index: i64) -> BoxValue {
        let len = match &*self.0.borrow() {
            AttrState::List(items) => items.len(),
            AttrState::Empty => 0,
            _ => {
                return Box::new(ErrorValue::new(RuntimeError::MissingCapability {
                    type_name: well_known::attribute_value().name().to_owned(),
                    capability: "indexing a non-list value",
                }))
            }
        };

        if index < 0 {
            return Box::new(ErrorValue::new(RuntimeError::IndexOutOfRange { index, len }));
        }
        let idx = index as usize;

        if idx < len {
            let rc = self.0.clone();
            let rc_read = rc.clone();
            return Box::new(Lens::new(
                well_known::attribute_value(),
                move || match &*rc_read.borrow() {
                    AttrState::List(items) => Box::new(items[idx].clone()) as BoxValue,
                    _ => Box::new(AttributeValue::empty()) as BoxValue,
                },
                move |v| {
                    let incoming = AttributeValue::from_box_value(v);
                    match &mut *rc.borrow_mut() {
                        AttrState::List(items) if idx < items.len() => {
                            items[idx] = incoming;
                            Ok(())
                        }
                        _ => Err(SetError("list element vanished".into())),
                    }
                },
            ));
        }

        if idx == len {
            // Writing at exactly one past the end appends/reshapes — the
            // "reshapes (empty -> list) on first indexed write" case.
            let rc = self.0.clone();
            return Box::new(MaterializedLens::new(
                well_known::attribute_value(),
                || None,
                move |v| {
                    let incoming = AttributeValue::from_box_value(v);
                    let mut state = rc.borrow_mut();
                    match &mut *state {
                        AttrState::List(items) => {
                            items.push(incoming);
                            Ok(())
                        }
                        AttrState::Empty => {
                            *state = AttrState::List(vec![incoming]);
                            Ok(())
                        }
                        _ => Err(SetError("cannot append to a non-list pval".into())),
                    }
                },
            ));
        }

        Box::new(ErrorValue::new(RuntimeError::IndexOutOfRange { index, len }))
    }
}

impl KeyAccessible for AttributeValue {
    fn get_key(&self, key: &str) -> BoxValue {
        enum Lookup {
            Present,
            Absent,
            WrongShape,
        }
        let lookup = match &*self.0.borrow() {
            AttrState::Map(entries) => {
                if entries.contains_key(key) {
                    Lookup::Present
                } else {
                    Lookup::Absent
                }
            }
            AttrState::Empty => Lookup::Absent,
            _ => Lookup::WrongShape,
        };

        match lookup {
            Lookup::WrongShape => Box::new(ErrorValue::new(RuntimeError::MissingCapability {
                type_name: well_known::attribute_value().name().to_owned(),
                capability: "keyed access on a non-map value",
            })),
            Lookup::Present => {
                let rc = self.0.clone();
                let rc_read = rc.clone();
                let key_owned = key.to_owned();
                let key_write = key.to_owned();
                Box::new(Lens::new(
                    well_known::attribute_value(),
                    move || match &*rc_read.borrow() {
                        AttrState::Map(entries) => entries
                            .get(&key_owned)
                            .cloned()
                            .map(|v| Box::new(v) as BoxValue)
                            .unwrap_or_else(|| Box::new(AttributeValue::empty())),
                        _ => Box::new(AttributeValue::empty()),
                    },
                    move |v| {
                        let incoming = AttributeValue::from_box_value(v);
                        match &mut *rc.borrow_mut() {
                            AttrState::Map(entries) => {
                                entries.insert(key_write.clone(), incoming);
                                Ok(())
                            }
                            _ => Err(SetError("map entry vanished".into())),
                        }
                    },
                ))
            }
            Lookup::Absent => {
                let rc = self.0.clone();
                let key_owned = key.to_owned();
                Box::new(MaterializedLens::new(
                    well_known::attribute_value(),
                    || None,
                    move |v| {
                        let incoming = AttributeValue::from_box_value(v);
                        let mut state = rc.borrow_mut();
                        match &mut *state {
                            AttrState::Map(entries) => {
                                entries.insert(key_owned.clone(), incoming);
                                Ok(())
                            }
                            AttrState::Empty => {
                                let mut entries = HashMap::new();
                                entries.insert(key_owned.clone(), incoming);
                                *state = AttrState::Map(entries);
                                Ok(())
                            }
                            _ => Err(SetError("cannot add a key to a non-map pval".into())),
                        }
                    },
                ))
            }
        }
    }
}

/// A host attribute container — a span's or resource's `attributes` field.
/// One level above [`AttributeValue`]: this is the map the engine's
/// `attrs["k"]` path starts from.
#[derive(Clone, Default)]
pub struct AttributeMap(Rc<RefCell<HashMap<String, AttributeValue>>>);

impl Debug for AttributeMap {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "AttributeMap({} entries)", self.0.borrow().len())
    }
}

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: impl Into<String>, value: AttributeValue) {
        self.0.borrow_mut().insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<AttributeValue> {
        self.0.borrow().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

impl Value for AttributeMap {
    fn type_of(&self) -> Type {
        well_known::attribute_map()
    }

    fn native(&self) -> Native {
        Native::Map(
            self.0
                .borrow()
                .iter()
                .map(|(k, v)| (k.clone(), Box::new(v.clone()) as BoxValue))
                .collect(),
        )
    }

    fn convert_to(&self, target: &Type) -> Result<Native, RuntimeError> {
        if *target == well_known::attribute_map() {
            Ok(self.native())
        } else {
            Err(RuntimeError::Conversion {
                from: well_known::attribute_map().name().to_owned(),
                to: target.name().to_owned(),
            })
        }
    }

    fn clone_value(&self) -> BoxValue {
        Box::new(self.clone())
    }

    fn as_key_accessible(&self) -> Option<&dyn KeyAccessible> {
        Some(self)
    }
}

impl KeyAccessible for AttributeMap {
    fn get_key(&self, key: &str) -> BoxValue {
        if self.0.borrow().contains_key(key) {
            let rc = self.0.clone();
            let rc_read = rc.clone();
            let key_owned = key.to_owned();
            let key_write = key.to_owned();
            Box::new(Lens::new(
                well_known::attribute_value(),
                move || {
                    rc_read
                        .borrow()
                        .get(&key_owned)
                        .cloned()
                        .map(|v| Box::new(v) as BoxValue)
                        .unwrap_or_else(|| Box::new(AttributeValue::empty()))
                },
                move |v| {
                    rc.borrow_mut().insert(key_write.clone(), AttributeValue::from_box_value(v));
                    Ok(())
                },
            ))
        } else {
            let rc = self.0.clone();
            let key_owned = key.to_owned();
            Box::new(MaterializedLens::new(
                well_known::attribute_value(),
                || None,
                move |v| {
                    rc.borrow_mut().insert(key_owned.clone(), AttributeValue::from_box_value(v));
                    Ok(())
                },
            ))
        }
    }
}
