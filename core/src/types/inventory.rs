//! Player inventory: item arena, top-level slot table, bag contents and the
//! pending-update queue of items waiting to be persisted.

use std::collections::HashMap;
use thiserror::Error;

use super::{ContainerLink, Item, ItemUpdateState, ObjectGuid, ValueSlots};
use crate::constants::{
    INVENTORY_SLOT_BAG_0, ITEM_FIELD_CONTAINED, NULL_SLOT, PLAYER_SLOT_END,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InventoryError {
    #[error("slot {slot} of bag {bag} does not exist")]
    SlotOutOfRange { bag: u8, slot: u8 },
    #[error("slot {slot} of bag {bag} is already occupied by {occupant}")]
    SlotOccupied {
        bag: u8,
        slot: u8,
        occupant: ObjectGuid,
    },
    #[error("slot {slot} of bag {bag} is empty")]
    EmptySlot { bag: u8, slot: u8 },
    #[error("there is no bag at slot {0}")]
    NotABag(u8),
    #[error("{0} still holds items")]
    BagNotEmpty(ObjectGuid),
    #[error("{0} is not part of this inventory")]
    UnknownItem(ObjectGuid),
    #[error("{0} is already part of this inventory")]
    DuplicateItem(ObjectGuid),
}

#[derive(Debug, Clone)]
pub struct Inventory {
    owner: ObjectGuid,
    items: HashMap<ObjectGuid, Item>,
    slots: Vec<Option<ObjectGuid>>,
    update_queue: Vec<Option<ObjectGuid>>,
}

impl Inventory {
    pub fn new(owner: ObjectGuid) -> Self {
        Inventory {
            owner,
            items: HashMap::new(),
            slots: vec![None; PLAYER_SLOT_END as usize],
            update_queue: Vec::new(),
        }
    }

    pub fn owner(&self) -> ObjectGuid {
        self.owner
    }

    pub fn item_by_guid(&self, guid: ObjectGuid) -> Option<&Item> {
        self.items.get(&guid)
    }

    pub fn item_by_guid_mut(&mut self, guid: ObjectGuid) -> Option<&mut Item> {
        self.items.get_mut(&guid)
    }

    /// Looks up an item by item guid counter, the way GMs address items in chat.
    pub fn item_by_counter(&self, counter: u32) -> Option<&Item> {
        self.items.get(&ObjectGuid::item(counter))
    }

    pub fn item_by_counter_mut(&mut self, counter: u32) -> Option<&mut Item> {
        self.items.get_mut(&ObjectGuid::item(counter))
    }

    /// Guid stored at a position. `bag == INVENTORY_SLOT_BAG_0` addresses the
    /// top-level slots, any other value the contents of the bag in that slot.
    pub fn guid_at(&self, bag: u8, slot: u8) -> Option<ObjectGuid> {
        if bag == INVENTORY_SLOT_BAG_0 {
            return self.slots.get(slot as usize).copied().flatten();
        }
        let bag_guid = self.slots.get(bag as usize).copied().flatten()?;
        self.items.get(&bag_guid)?.bag.as_ref()?.get(slot)
    }

    pub fn item_by_pos(&self, bag: u8, slot: u8) -> Option<&Item> {
        self.guid_at(bag, slot).and_then(|guid| self.items.get(&guid))
    }

    pub fn update_queue(&self) -> &[Option<ObjectGuid>] {
        &self.update_queue
    }

    /// Raw queue access for repair tooling.
    pub fn update_queue_mut(&mut self) -> &mut Vec<Option<ObjectGuid>> {
        &mut self.update_queue
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Places a freshly created item and queues it for saving.
    pub fn store_item(&mut self, bag: u8, slot: u8, item: Item) -> Result<ObjectGuid, InventoryError> {
        let guid = self.place(bag, slot, item)?;
        self.set_item_state(guid, ItemUpdateState::Changed)?;
        log::debug!("stored {} at bag {} slot {}", guid, bag, slot);
        Ok(guid)
    }

    /// Places an item loaded from storage. Nothing is queued.
    pub fn load_item(&mut self, bag: u8, slot: u8, mut item: Item) -> Result<ObjectGuid, InventoryError> {
        item.state = ItemUpdateState::Unchanged;
        item.queue_pos = None;
        self.place(bag, slot, item)
    }

    fn place(&mut self, bag: u8, slot: u8, mut item: Item) -> Result<ObjectGuid, InventoryError> {
        let guid = item.guid();
        if self.items.contains_key(&guid) {
            return Err(InventoryError::DuplicateItem(guid));
        }
        if let Some(occupant) = self.guid_at(bag, slot) {
            return Err(InventoryError::SlotOccupied { bag, slot, occupant });
        }

        item.set_owner(self.owner);
        item.slot = slot;

        if bag == INVENTORY_SLOT_BAG_0 {
            if slot >= PLAYER_SLOT_END {
                return Err(InventoryError::SlotOutOfRange { bag, slot });
            }
            item.container = None;
            item.values_mut().set_guid(ITEM_FIELD_CONTAINED, self.owner);
            self.slots[slot as usize] = Some(guid);
        } else {
            let bag_guid = self
                .slots
                .get(bag as usize)
                .copied()
                .flatten()
                .ok_or(InventoryError::NotABag(bag))?;
            let container = self
                .items
                .get_mut(&bag_guid)
                .filter(|container| container.is_bag())
                .ok_or(InventoryError::NotABag(bag))?;
            let size = container.bag.as_ref().map_or(0, |b| b.size());
            if slot >= size {
                return Err(InventoryError::SlotOutOfRange { bag, slot });
            }
            container.set_bag_child(slot, Some(guid));
            item.container = Some(ContainerLink {
                guid: bag_guid,
                bag_slot: bag,
            });
            item.values_mut().set_guid(ITEM_FIELD_CONTAINED, bag_guid);
        }

        self.items.insert(guid, item);
        Ok(guid)
    }

    /// Takes an item out of its position and marks it for deletion.
    ///
    /// An item that was never saved disappears entirely; otherwise it stays in
    /// the arena as `Removed` until the next `save_pending`.
    pub fn remove_item(&mut self, bag: u8, slot: u8) -> Result<ObjectGuid, InventoryError> {
        let guid = self
            .guid_at(bag, slot)
            .ok_or(InventoryError::EmptySlot { bag, slot })?;
        self.set_item_state(guid, ItemUpdateState::Removed)?;
        log::debug!("removed {} from bag {} slot {}", guid, bag, slot);
        Ok(guid)
    }

    /// Overwrites a position without touching the item bookkeeping. Repair
    /// tooling only.
    pub fn set_guid_at(&mut self, bag: u8, slot: u8, guid: Option<ObjectGuid>) -> Result<(), InventoryError> {
        if bag == INVENTORY_SLOT_BAG_0 {
            let entry = self
                .slots
                .get_mut(slot as usize)
                .ok_or(InventoryError::SlotOutOfRange { bag, slot })?;
            *entry = guid;
            return Ok(());
        }
        let bag_guid = self
            .slots
            .get(bag as usize)
            .copied()
            .flatten()
            .ok_or(InventoryError::NotABag(bag))?;
        let container = self
            .items
            .get_mut(&bag_guid)
            .filter(|container| container.is_bag())
            .ok_or(InventoryError::NotABag(bag))?;
        if slot >= container.bag.as_ref().map_or(0, |b| b.size()) {
            return Err(InventoryError::SlotOutOfRange { bag, slot });
        }
        container.set_bag_child(slot, guid);
        Ok(())
    }

    /// Drops every slot table and bag entry referencing `guid` and unplaces
    /// the item.
    fn clear_position(&mut self, guid: ObjectGuid) {
        for entry in self.slots.iter_mut().filter(|entry| **entry == Some(guid)) {
            *entry = None;
        }
        for container in self.items.values_mut() {
            let held: Vec<u8> = container
                .bag
                .as_ref()
                .map(|b| b.occupied().filter(|(_, child)| *child == guid).map(|(slot, _)| slot).collect())
                .unwrap_or_default();
            for slot in held {
                container.set_bag_child(slot, None);
            }
        }
        if let Some(item) = self.items.get_mut(&guid) {
            item.container = None;
            item.slot = NULL_SLOT;
        }
    }

    /// Applies a persistence state transition and keeps the queue in step.
    pub fn set_item_state(&mut self, guid: ObjectGuid, state: ItemUpdateState) -> Result<(), InventoryError> {
        let current = self
            .items
            .get(&guid)
            .map(|item| item.state)
            .ok_or(InventoryError::UnknownItem(guid))?;

        if state == ItemUpdateState::Removed {
            if let Some(item) = self.items.get(&guid)
                && item.bag.as_ref().is_some_and(|b| !b.is_empty())
            {
                return Err(InventoryError::BagNotEmpty(guid));
            }
            self.clear_position(guid);
        }

        if current == ItemUpdateState::New && state == ItemUpdateState::Removed {
            // never saved, nothing to delete from storage
            self.remove_from_update_queue(guid);
            self.items.remove(&guid);
            return Ok(());
        }

        if state != ItemUpdateState::Unchanged {
            if let Some(item) = self.items.get_mut(&guid)
                && item.state != ItemUpdateState::New
            {
                item.state = state;
            }
            self.add_to_update_queue(guid);
        } else {
            self.remove_from_update_queue(guid);
            if let Some(item) = self.items.get_mut(&guid) {
                item.state = ItemUpdateState::Unchanged;
            }
        }
        Ok(())
    }

    pub fn add_to_update_queue(&mut self, guid: ObjectGuid) {
        let Some(item) = self.items.get_mut(&guid) else {
            return;
        };
        if item.is_in_update_queue() {
            return;
        }
        if item.owner() != self.owner {
            log::error!(
                "{} owned by {} cannot join the update queue of {}",
                guid,
                item.owner(),
                self.owner
            );
            return;
        }
        self.update_queue.push(Some(guid));
        item.queue_pos = Some((self.update_queue.len() - 1) as u16);
    }

    pub fn remove_from_update_queue(&mut self, guid: ObjectGuid) {
        let Some(item) = self.items.get_mut(&guid) else {
            return;
        };
        let Some(pos) = item.queue_pos.take() else {
            return;
        };
        match self.update_queue.get_mut(pos as usize) {
            Some(entry) if *entry == Some(guid) => *entry = None,
            _ => log::error!("{} had a stale update queue position {}", guid, pos),
        }
    }

    /// Flushes the queue as a save would: removed items are dropped and
    /// everything else becomes `Unchanged`.
    pub fn save_pending(&mut self) -> usize {
        let mut saved = 0;
        for guid in std::mem::take(&mut self.update_queue).into_iter().flatten() {
            let Some(state) = self.items.get(&guid).map(|item| item.state) else {
                continue;
            };
            if state == ItemUpdateState::Removed {
                self.clear_position(guid);
                self.items.remove(&guid);
            } else if let Some(item) = self.items.get_mut(&guid) {
                item.state = ItemUpdateState::Unchanged;
                item.queue_pos = None;
            }
            saved += 1;
        }
        log::debug!("saved {} pending items of {}", saved, self.owner);
        saved
    }
}
