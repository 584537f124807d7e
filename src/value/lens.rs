//! Lens values: read/write access into a slot inside a host object, plus
//! a lazy variant for slots that don't yet exist (an absent map key, an
//! out-of-range slice index).
//!
//! Closures capture owned, reference-counted state (`Rc<RefCell<_>>` on the
//! host-adapter side) rather than borrowing the host record directly, so a
//! `Lens` itself is `'static` and needs no lifetime parameter threaded
//! through the whole `Value` hierarchy. This does **not** relax the
//! invariant that a lens must not escape the evaluation call it was created
//! in: callers must not stash a `Lens` in a structure that outlives the
//! host record it closes over.
use super::{BoxValue, Native, Settable, Value};
use crate::error::{RuntimeError, SetError};
use crate::types::Type;
use std::fmt::{self, Debug, Formatter};

/// A lens over a slot that is known to already exist (`span.name`, a
/// present map key, an in-range slice index).
pub struct Lens {
    type_of: Type,
    get: Box<dyn Fn() -> BoxValue>,
    set: Box<dyn FnMut(BoxValue) -> Result<(), SetError>>,
}

impl Lens {
    pub fn new(
        type_of: Type,
        get: impl Fn() -> BoxValue + 'static,
        set: impl FnMut(BoxValue) -> Result<(), SetError> + 'static,
    ) -> Self {
        Self {
            type_of,
            get: Box::new(get),
            set: Box::new(set),
        }
    }
}

impl Debug for Lens {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Lens<{}>", self.type_of)
    }
}

impl Value for Lens {
    fn type_of(&self) -> Type {
        self.type_of.clone()
    }

    fn native(&self) -> Native {
        (self.get)().native()
    }

    fn convert_to(&self, target: &Type) -> Result<Native, RuntimeError> {
        (self.get)().convert_to(target)
    }

    fn clone_value(&self) -> BoxValue {
        (self.get)()
    }

    fn as_error(&self) -> Option<&RuntimeError> {
        None
    }

    fn as_settable(&mut self) -> Option<&mut dyn Settable> {
        Some(self)
    }
}

impl Settable for Lens {
    fn set_value(&mut self, value: BoxValue) -> Result<(), SetError> {
        (self.set)(value)
    }
}

/// The three states a slot behind a [`MaterializedLens`] passes through:
/// `Absent -> Materializing -> Present`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Absent,
    Materializing,
    Present,
}

/// A lazy lens over a not-yet-existing slot (an absent map key, or a slice
/// index past the current length). Reading it yields `nil`; writing it
/// performs a single atomic "create the slot, then store" operation on the
/// host container.
pub struct MaterializedLens {
    type_of: Type,
    state: SlotState,
    get: Box<dyn Fn() -> Option<BoxValue>>,
    materialize: Box<dyn FnMut(BoxValue) -> Result<(), SetError>>,
}

impl MaterializedLens {
    pub fn new(
        type_of: Type,
        get: impl Fn() -> Option<BoxValue> + 'static,
        materialize: impl FnMut(BoxValue) -> Result<(), SetError> + 'static,
    ) -> Self {
        let state = if get().is_some() {
            SlotState::Present
        } else {
            SlotState::Absent
        };
        Self {
            type_of,
            state,
            get: Box::new(get),
            materialize: Box::new(materialize),
        }
    }

    pub fn state(&self) -> SlotState {
        self.state
    }
}

impl Debug for MaterializedLens {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "MaterializedLens<{}>({:?})", self.type_of, self.state)
    }
}

impl Value for MaterializedLens {
    fn type_of(&self) -> Type {
        self.type_of.clone()
    }

    fn native(&self) -> Native {
        match (self.get)() {
            Some(v) => v.native(),
            None => Native::Nil,
        }
    }

    fn convert_to(&self, target: &Type) -> Result<Native, RuntimeError> {
        match (self.get)() {
            Some(v) => v.convert_to(target),
            None if *target == crate::types::well_known::nil() => Ok(Native::Nil),
            None => Err(RuntimeError::Conversion {
                from: crate::types::well_known::nil().name().to_owned(),
                to: target.name().to_owned(),
            }),
        }
    }

    fn clone_value(&self) -> BoxValue {
        match (self.get)() {
            Some(v) => v,
            None => Box::new(crate::stdlib::primitive::NilValue),
        }
    }

    fn as_settable(&mut self) -> Option<&mut dyn Settable> {
        Some(self)
    }
}

impl Settable for MaterializedLens {
    fn set_value(&mut self, value: BoxValue) -> Result<(), SetError> {
        self.state = SlotState::Materializing;
        match (self.materialize)(value) {
            Ok(()) => {
                self.state = SlotState::Present;
                log::trace!("lens materialized: {}", self.type_of);
                Ok(())
            }
            Err(err) => {
                self.state = SlotState::Absent;
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stdlib::primitive::StringValue;
    use crate::types::well_known;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn lens_reads_and_writes_through_closures() {
        let cell = Rc::new(RefCell::new("bear".to_owned()));
        let read = cell.clone();
        let write = cell.clone();
        let mut lens = Lens::new(
            well_known::string(),
            move || Box::new(StringValue(read.borrow().clone())) as BoxValue,
            move |v| {
                let Native::String(s) = v.native() else {
                    return Err(SetError("not a string".into()));
                };
                *write.borrow_mut() = s;
                Ok(())
            },
        );

        assert!(matches!(lens.native(), Native::String(ref s) if s == "bear"));
        lens.as_settable()
            .unwrap()
            .set_value(Box::new(StringValue("cat".into())))
            .unwrap();
        assert_eq!(*cell.borrow(), "cat");
        assert!(matches!(lens.native(), Native::String(ref s) if s == "cat"));
    }

    #[test]
    fn materialized_lens_absent_reads_as_nil_then_materializes() {
        let store: Rc<RefCell<Option<String>>> = Rc::new(RefCell::new(None));
        let read = store.clone();
        let write = store.clone();
        let mut lens = MaterializedLens::new(
            well_known::string(),
            move || read.borrow().clone().map(|s| Box::new(StringValue(s)) as BoxValue),
            move |v| {
                let Native::String(s) = v.native() else {
                    return Err(SetError("not a string".into()));
                };
                *write.borrow_mut() = Some(s);
                Ok(())
            },
        );

        assert_eq!(lens.state(), SlotState::Absent);
        assert!(matches!(lens.native(), Native::Nil));
        assert!(matches!(lens.clone_value().native(), Native::Nil));

        lens.as_settable()
            .unwrap()
            .set_value(Box::new(StringValue("v".into())))
            .unwrap();

        assert_eq!(lens.state(), SlotState::Present);
        assert_eq!(*store.borrow(), Some("v".to_owned()));
        assert!(matches!(lens.native(), Native::String(ref s) if s == "v"));
    }
}
