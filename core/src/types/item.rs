//! Item structure

use std::fmt;

use super::{FieldStore, ObjectGuid, ValueSlots};
use crate::constants::{
    CONTAINER_END, CONTAINER_FIELD_NUM_SLOTS, CONTAINER_FIELD_SLOT_1, INVENTORY_SLOT_BAG_0,
    ITEM_END, ITEM_FIELD_CONTAINED, ITEM_FIELD_DURABILITY, ITEM_FIELD_FLAGS,
    ITEM_FIELD_MAXDURABILITY, ITEM_FIELD_OWNER, ITEM_FIELD_STACK_COUNT, ItemFlags, MAX_BAG_SIZE,
    NULL_SLOT, OBJECT_FIELD_ENTRY, OBJECT_FIELD_GUID, TypeMask,
};

/// Persistence state of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ItemUpdateState {
    Unchanged = 0,
    Changed = 1,
    New = 2,
    Removed = 3,
}

impl ItemUpdateState {
    pub fn name(self) -> &'static str {
        match self {
            ItemUpdateState::Unchanged => "unchanged",
            ItemUpdateState::Changed => "changed",
            ItemUpdateState::New => "new",
            ItemUpdateState::Removed => "removed",
        }
    }
}

impl fmt::Display for ItemUpdateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lookup-only back reference from an item to the bag holding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContainerLink {
    pub guid: ObjectGuid,
    /// Top-level slot the bag itself occupies.
    pub bag_slot: u8,
}

/// Child table of a container. The bag owns its children through this table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BagSlots {
    slots: Vec<Option<ObjectGuid>>,
}

impl BagSlots {
    pub fn new(size: u8) -> Self {
        BagSlots {
            slots: vec![None; size.min(MAX_BAG_SIZE) as usize],
        }
    }

    pub fn size(&self) -> u8 {
        self.slots.len() as u8
    }

    pub fn get(&self, slot: u8) -> Option<ObjectGuid> {
        self.slots.get(slot as usize).copied().flatten()
    }

    pub(crate) fn set(&mut self, slot: u8, guid: Option<ObjectGuid>) {
        if let Some(entry) = self.slots.get_mut(slot as usize) {
            *entry = guid;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Occupied positions in slot order.
    pub fn occupied(&self) -> impl Iterator<Item = (u8, ObjectGuid)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, guid)| guid.map(|guid| (i as u8, guid)))
    }
}

#[derive(Debug, Clone)]
pub struct Item {
    values: FieldStore,
    /// Position the item believes it occupies, `NULL_SLOT` when unplaced.
    pub slot: u8,
    pub container: Option<ContainerLink>,
    pub state: ItemUpdateState,
    pub queue_pos: Option<u16>,
    pub bag: Option<BagSlots>,
}

impl Item {
    pub fn new(counter: u32, entry: u32, owner: ObjectGuid) -> Self {
        let mut values = FieldStore::new(
            ITEM_END,
            ObjectGuid::item(counter),
            TypeMask::Object | TypeMask::Item,
            entry,
        );
        values.set_guid(ITEM_FIELD_OWNER, owner);
        values.set_guid(ITEM_FIELD_CONTAINED, owner);
        values.set_u32(ITEM_FIELD_STACK_COUNT, 1);
        Item {
            values,
            slot: NULL_SLOT,
            container: None,
            state: ItemUpdateState::New,
            queue_pos: None,
            bag: None,
        }
    }

    pub fn new_bag(counter: u32, entry: u32, owner: ObjectGuid, size: u8) -> Self {
        let mut values = FieldStore::new(
            CONTAINER_END,
            ObjectGuid::item(counter),
            TypeMask::Object | TypeMask::Item | TypeMask::Container,
            entry,
        );
        values.set_guid(ITEM_FIELD_OWNER, owner);
        values.set_guid(ITEM_FIELD_CONTAINED, owner);
        values.set_u32(ITEM_FIELD_STACK_COUNT, 1);
        let bag = BagSlots::new(size);
        values.set_u32(CONTAINER_FIELD_NUM_SLOTS, u32::from(bag.size()));
        Item {
            values,
            slot: NULL_SLOT,
            container: None,
            state: ItemUpdateState::New,
            queue_pos: None,
            bag: Some(bag),
        }
    }

    pub fn entry(&self) -> u32 {
        self.values.get_u32(OBJECT_FIELD_ENTRY)
    }

    pub fn owner(&self) -> ObjectGuid {
        self.values.get_guid(ITEM_FIELD_OWNER)
    }

    pub fn set_owner(&mut self, owner: ObjectGuid) {
        self.values.set_guid(ITEM_FIELD_OWNER, owner);
    }

    pub fn is_bag(&self) -> bool {
        self.bag.is_some()
    }

    pub fn is_in_update_queue(&self) -> bool {
        self.queue_pos.is_some()
    }

    /// Bag value of the position this item occupies.
    pub fn bag_slot(&self) -> u8 {
        self.container
            .map(|link| link.bag_slot)
            .unwrap_or(INVENTORY_SLOT_BAG_0)
    }

    pub fn flags(&self) -> ItemFlags {
        ItemFlags::from_bits_truncate(self.values.get_u32(ITEM_FIELD_FLAGS))
    }

    pub fn durability(&self) -> (u32, u32) {
        (
            self.values.get_u32(ITEM_FIELD_DURABILITY),
            self.values.get_u32(ITEM_FIELD_MAXDURABILITY),
        )
    }

    /// Mirrors a child guid into the container slot fields.
    pub(crate) fn set_bag_child(&mut self, slot: u8, guid: Option<ObjectGuid>) {
        if let Some(bag) = self.bag.as_mut() {
            bag.set(slot, guid);
            self.values.set_guid(
                CONTAINER_FIELD_SLOT_1 + u32::from(slot) * 2,
                guid.unwrap_or(ObjectGuid::EMPTY),
            );
        }
    }
}

impl ValueSlots for Item {
    fn guid(&self) -> ObjectGuid {
        self.values.get_guid(OBJECT_FIELD_GUID)
    }

    fn values(&self) -> &FieldStore {
        &self.values
    }

    fn values_mut(&mut self) -> &mut FieldStore {
        &mut self.values
    }
}
