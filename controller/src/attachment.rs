//! Typed per-transaction attachments.
//!
//! Steps of one transaction share state through keyed slots. A key carries
//! the value type, so reading a slot back never needs a cast at the call site.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

/// Typed slot identifier. Declare one per concern as a `static` or `const`.
///
/// Two keys address the same slot only if both the name and the value type
/// agree.
pub struct AttachmentKey<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> AttachmentKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T: 'static> AttachmentKey<T> {
    fn slot(&self) -> SlotId {
        SlotId {
            type_id: TypeId::of::<T>(),
            name: self.name,
        }
    }
}

impl<T> fmt::Debug for AttachmentKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AttachmentKey").field(&self.name).finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SlotId {
    type_id: TypeId,
    name: &'static str,
}

/// Transaction-scoped attachment map. Dropped when the transaction ends.
#[derive(Default)]
pub struct Attachments {
    slots: HashMap<SlotId, Box<dyn Any + Send>>,
}

impl Attachments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<T: Any + Send>(&self, key: &AttachmentKey<T>) -> Option<&T> {
        self.slots
            .get(&key.slot())
            .and_then(|value| value.downcast_ref::<T>())
    }

    pub fn get_mut<T: Any + Send>(&mut self, key: &AttachmentKey<T>) -> Option<&mut T> {
        self.slots
            .get_mut(&key.slot())
            .and_then(|value| value.downcast_mut::<T>())
    }

    /// Store `value`, returning what the slot held before.
    pub fn put<T: Any + Send>(&mut self, key: &AttachmentKey<T>, value: T) -> Option<T> {
        self.slots
            .insert(key.slot(), Box::new(value))
            .and_then(|previous| previous.downcast::<T>().ok())
            .map(|previous| *previous)
    }

    /// Store `value` only if the slot is empty. Returns the existing value
    /// when there is one.
    pub fn put_if_absent<T: Any + Send>(&mut self, key: &AttachmentKey<T>, value: T) -> Option<&T> {
        let slot = key.slot();
        if self.slots.contains_key(&slot) {
            return self.get(key);
        }
        self.slots.insert(slot, Box::new(value));
        None
    }

    /// Get the slot's value, inserting one built by `init` if it is empty.
    pub fn get_or_insert_with<T: Any + Send>(
        &mut self,
        key: &AttachmentKey<T>,
        init: impl FnOnce() -> T,
    ) -> &mut T {
        let value = self
            .slots
            .entry(key.slot())
            .or_insert_with(|| Box::new(init()));
        match value.downcast_mut::<T>() {
            Some(value) => value,
            // Slots are keyed by TypeId, so the stored value is always a T.
            None => unreachable!("attachment slot {} holds a foreign type", key.name),
        }
    }

    pub fn remove<T: Any + Send>(&mut self, key: &AttachmentKey<T>) -> Option<T> {
        self.slots
            .remove(&key.slot())
            .and_then(|value| value.downcast::<T>().ok())
            .map(|value| *value)
    }

    pub fn contains<T: Any + Send>(&self, key: &AttachmentKey<T>) -> bool {
        self.slots.contains_key(&key.slot())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl fmt::Debug for Attachments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.slots.keys().map(|slot| slot.name))
            .finish()
    }
}
