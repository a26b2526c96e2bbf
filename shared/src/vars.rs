use entsync_serde::{Serde, MAX_FIELD_BYTES};
use indexmap::IndexMap;

use crate::error::EntityError;

/// A named slot of replicated state: the encoded value plus the dirty
/// bit marking it unflushed.
#[derive(Debug, Clone)]
struct VarSlot {
    value: Vec<u8>,
    dirty: bool,
}

/// What a local write did to a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The value changed; the slot is now dirty.
    Written,
    /// The value equalled the stored one; nothing to flush.
    Unchanged,
}

/// Ordered table of Networked Variable / User Message slots.
///
/// Slots are created lazily on first write and flushed in registration
/// order. A slot's dirty bit is cleared at most once per drain, and
/// only the drain clears it.
#[derive(Debug, Clone, Default)]
pub struct VarTable {
    slots: IndexMap<String, VarSlot>,
}

impl VarTable {
    pub fn new() -> Self {
        Self {
            slots: IndexMap::new(),
        }
    }

    /// Local authoritative write. No-op (and not dirtying) when the
    /// encoded value equals the stored one. Rejects empty names and
    /// payloads that cannot be encoded for the wire, leaving state
    /// unchanged.
    pub fn set<T: Serde>(&mut self, name: &str, value: &T) -> Result<WriteOutcome, EntityError> {
        if name.is_empty() {
            return Err(EntityError::NotSerializable {
                name: name.to_string(),
                reason: "slot name is empty".to_string(),
            });
        }
        let bytes = value.to_bytes().map_err(|e| EntityError::NotSerializable {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        if bytes.len() > MAX_FIELD_BYTES {
            return Err(EntityError::NotSerializable {
                name: name.to_string(),
                reason: format!("encoded payload is {} bytes", bytes.len()),
            });
        }

        if let Some(slot) = self.slots.get_mut(name) {
            if slot.value == bytes {
                return Ok(WriteOutcome::Unchanged);
            }
            slot.value = bytes;
            slot.dirty = true;
        } else {
            self.slots.insert(
                name.to_string(),
                VarSlot {
                    value: bytes,
                    dirty: true,
                },
            );
        }
        Ok(WriteOutcome::Written)
    }

    /// Stores a value received from the wire. Never sets the dirty bit:
    /// remote state is applied, not re-flushed.
    pub fn apply_remote(&mut self, name: &str, value: Vec<u8>) {
        if let Some(slot) = self.slots.get_mut(name) {
            slot.value = value;
        } else {
            self.slots.insert(
                name.to_string(),
                VarSlot {
                    value,
                    dirty: false,
                },
            );
        }
    }

    /// Decodes a slot's current value. `None` if the slot does not
    /// exist or holds bytes the requested type cannot decode.
    pub fn get<T: Serde>(&self, name: &str) -> Option<T> {
        let slot = self.slots.get(name)?;
        T::from_bytes(&slot.value).ok()
    }

    pub fn get_raw(&self, name: &str) -> Option<&[u8]> {
        self.slots.get(name).map(|slot| slot.value.as_slice())
    }

    pub fn is_dirty(&self, name: &str) -> bool {
        self.slots.get(name).is_some_and(|slot| slot.dirty)
    }

    pub fn any_dirty(&self) -> bool {
        self.slots.values().any(|slot| slot.dirty)
    }

    /// Takes every dirty slot in registration order, clearing each
    /// slot's dirty bit exactly once. The returned pairs are what one
    /// replication tick flushes.
    pub fn drain_dirty(&mut self) -> Vec<(String, Vec<u8>)> {
        let mut flushed = Vec::new();
        for (name, slot) in self.slots.iter_mut() {
            if slot.dirty {
                flushed.push((name.clone(), slot.value.clone()));
                slot.dirty = false;
            }
        }
        flushed
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
