//! Typed capture slots.
//!
//! A slot is a named cell a pattern can bind a value into and later compare
//! against. Binding and comparison are split into separate `write` and
//! `read` views so a query states explicitly, step by step, whether it is
//! capturing or constraining. Bindings themselves live in the per-attempt
//! [`Context`](super::Context), never in the slot.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::bytecode::LabelId;

static NEXT_SLOT_ID: AtomicU32 = AtomicU32::new(0);

/// Unique identity of one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(u32);

/// Tagged value a slot can hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotValue {
    /// A constant or other plain integer.
    Int(i64),
    /// A local-variable index.
    Var(u32),
    /// A label.
    Label(LabelId),
    /// An instruction index within the stream under scan.
    Index(usize),
}

/// Types that can be stored in a slot.
pub trait SlotType: Sized + Clone {
    fn into_value(self) -> SlotValue;
    fn from_value(value: &SlotValue) -> Option<Self>;
}

impl SlotType for i64 {
    fn into_value(self) -> SlotValue {
        SlotValue::Int(self)
    }

    fn from_value(value: &SlotValue) -> Option<Self> {
        match value {
            SlotValue::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl SlotType for u32 {
    fn into_value(self) -> SlotValue {
        SlotValue::Var(self)
    }

    fn from_value(value: &SlotValue) -> Option<Self> {
        match value {
            SlotValue::Var(v) => Some(*v),
            _ => None,
        }
    }
}

impl SlotType for LabelId {
    fn into_value(self) -> SlotValue {
        SlotValue::Label(self)
    }

    fn from_value(value: &SlotValue) -> Option<Self> {
        match value {
            SlotValue::Label(v) => Some(*v),
            _ => None,
        }
    }
}

impl SlotType for usize {
    fn into_value(self) -> SlotValue {
        SlotValue::Index(self)
    }

    fn from_value(value: &SlotValue) -> Option<Self> {
        match value {
            SlotValue::Index(v) => Some(*v),
            _ => None,
        }
    }
}

/// A named, typed capture cell.
#[derive(Debug)]
pub struct Slot<T> {
    id: SlotId,
    name: &'static str,
    _marker: PhantomData<T>,
}

impl<T: SlotType> Slot<T> {
    /// Create a fresh slot with a debug name.
    pub fn new(name: &'static str) -> Self {
        Self {
            id: SlotId(NEXT_SLOT_ID.fetch_add(1, Ordering::Relaxed)),
            name,
            _marker: PhantomData,
        }
    }

    /// The binding view of this slot.
    pub fn write(&self) -> SlotWrite<T> {
        SlotWrite {
            id: self.id,
            name: self.name,
            _marker: PhantomData,
        }
    }

    /// The comparing view of this slot.
    pub fn read(&self) -> SlotRead<T> {
        SlotRead {
            id: self.id,
            name: self.name,
            _marker: PhantomData,
        }
    }
}

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Slot<T> {}

/// Write view: stores a value for the remainder of the match attempt.
#[derive(Debug)]
pub struct SlotWrite<T> {
    id: SlotId,
    name: &'static str,
    _marker: PhantomData<T>,
}

impl<T> SlotWrite<T> {
    pub(crate) fn id(&self) -> SlotId {
        self.id
    }

    /// The debug name of the underlying slot.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for SlotWrite<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for SlotWrite<T> {}

/// Read view: compares against the previously stored value.
#[derive(Debug)]
pub struct SlotRead<T> {
    id: SlotId,
    name: &'static str,
    _marker: PhantomData<T>,
}

impl<T> SlotRead<T> {
    pub(crate) fn id(&self) -> SlotId {
        self.id
    }

    /// The debug name of the underlying slot.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for SlotRead<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for SlotRead<T> {}
