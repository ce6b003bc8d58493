//! Update-field storage shared by every world object.

use super::ObjectGuid;
use crate::constants::{OBJECT_FIELD_ENTRY, OBJECT_FIELD_GUID, OBJECT_FIELD_SCALE_X, OBJECT_FIELD_TYPE, TypeMask};

/// Fixed-size array of 32-bit value slots. Float slots hold the bit pattern
/// of an `f32`, so every slot can be read in any interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldStore {
    values: Vec<u32>,
}

impl FieldStore {
    /// Creates a store of `count` zeroed slots with the object header filled in.
    pub fn new(count: u32, guid: ObjectGuid, type_mask: TypeMask, entry: u32) -> Self {
        let mut store = FieldStore {
            values: vec![0; count as usize],
        };
        store.set_guid(OBJECT_FIELD_GUID, guid);
        store.set_u32(OBJECT_FIELD_TYPE, type_mask.bits());
        store.set_u32(OBJECT_FIELD_ENTRY, entry);
        store.set_f32(OBJECT_FIELD_SCALE_X, 1.0);
        store
    }

    pub fn count(&self) -> u32 {
        self.values.len() as u32
    }

    pub fn get_u32(&self, index: u32) -> u32 {
        self.values.get(index as usize).copied().unwrap_or(0)
    }

    pub fn get_i32(&self, index: u32) -> i32 {
        self.get_u32(index) as i32
    }

    pub fn get_f32(&self, index: u32) -> f32 {
        f32::from_bits(self.get_u32(index))
    }

    /// Reads a guid spanning `index` (low word) and `index + 1` (high word).
    pub fn get_guid(&self, index: u32) -> ObjectGuid {
        ObjectGuid::from_words(self.get_u32(index), self.get_u32(index + 1))
    }

    pub fn get_byte(&self, index: u32, offset: u8) -> u8 {
        (self.get_u32(index) >> (u32::from(offset & 3) * 8)) as u8
    }

    /// Out-of-range writes are ignored; callers check `count()` first.
    pub fn set_u32(&mut self, index: u32, value: u32) {
        if let Some(slot) = self.values.get_mut(index as usize) {
            *slot = value;
        }
    }

    pub fn set_f32(&mut self, index: u32, value: f32) {
        self.set_u32(index, value.to_bits());
    }

    pub fn set_guid(&mut self, index: u32, guid: ObjectGuid) {
        self.set_u32(index, guid.low_word());
        self.set_u32(index + 1, guid.high_word());
    }

    pub fn set_byte(&mut self, index: u32, offset: u8, value: u8) {
        let shift = u32::from(offset & 3) * 8;
        let current = self.get_u32(index);
        self.set_u32(index, (current & !(0xFF << shift)) | (u32::from(value) << shift));
    }

    pub fn set_flag(&mut self, index: u32, flag: u32) {
        self.set_u32(index, self.get_u32(index) | flag);
    }

    pub fn remove_flag(&mut self, index: u32, flag: u32) {
        self.set_u32(index, self.get_u32(index) & !flag);
    }

    pub fn has_flag(&self, index: u32, flag: u32) -> bool {
        self.get_u32(index) & flag != 0
    }

    pub fn set_byte_flag(&mut self, index: u32, offset: u8, flag: u8) {
        let current = self.get_byte(index, offset);
        self.set_byte(index, offset, current | flag);
    }

    pub fn remove_byte_flag(&mut self, index: u32, offset: u8, flag: u8) {
        let current = self.get_byte(index, offset);
        self.set_byte(index, offset, current & !flag);
    }

    pub fn type_mask(&self) -> TypeMask {
        TypeMask::from_bits_truncate(self.get_u32(OBJECT_FIELD_TYPE))
    }
}

/// An entity whose state is exposed as indexed value slots.
pub trait ValueSlots {
    fn guid(&self) -> ObjectGuid;
    fn values(&self) -> &FieldStore;
    fn values_mut(&mut self) -> &mut FieldStore;

    /// Identity string used in command replies and diagnostics.
    fn guid_str(&self) -> String {
        self.guid().to_string()
    }
}
