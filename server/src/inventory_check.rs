//! Consistency checks between a player's item placement, the items' own
//! bookkeeping and the pending-update queue.

use std::fmt;

use crate::args::is_abbrev;
use world_core::constants::{
    BUYBACK_SLOT_END, BUYBACK_SLOT_START, INVENTORY_SLOT_BAG_0, NULL_SLOT, PLAYER_SLOT_END,
    PLAYER_SLOT_START,
};
use world_core::types::{Inventory, Item, ItemUpdateState, ObjectGuid, ValueSlots};

/// What `.debug itemstate` was asked to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStateQuery {
    State(ItemUpdateState),
    Queue,
    All,
}

impl ItemStateQuery {
    pub fn parse(token: &str) -> Option<Self> {
        [
            ("unchanged", ItemStateQuery::State(ItemUpdateState::Unchanged)),
            ("changed", ItemStateQuery::State(ItemUpdateState::Changed)),
            ("new", ItemStateQuery::State(ItemUpdateState::New)),
            ("removed", ItemStateQuery::State(ItemUpdateState::Removed)),
            ("queue", ItemStateQuery::Queue),
            ("all", ItemStateQuery::All),
        ]
        .into_iter()
        .find(|(name, _)| is_abbrev(token, name))
        .map(|(_, query)| query)
    }
}

/// Where the checker found an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemLocation {
    Slot(u8),
    Bag { bag: u8, slot: u8 },
}

impl fmt::Display for ItemLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemLocation::Slot(slot) => write!(f, "at slot {}", slot),
            ItemLocation::Bag { bag, slot } => write!(f, "in bag {} at slot {}", bag, slot),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    MissingItem {
        guid: ObjectGuid,
        location: ItemLocation,
    },
    IncorrectSlot {
        item: String,
        location: ItemLocation,
        recorded: u8,
    },
    OwnerMismatch {
        item: String,
        location: ItemLocation,
        owner: ObjectGuid,
        inventory_owner: String,
    },
    UnexpectedContainer {
        item: String,
        slot: u8,
        container: ObjectGuid,
        container_slot: u8,
    },
    MissingContainer {
        item: String,
        bag: u8,
        slot: u8,
    },
    WrongContainer {
        item: String,
        bag: u8,
        slot: u8,
        container: ObjectGuid,
        container_slot: u8,
    },
    QueuePosOutOfRange {
        item: String,
        location: ItemLocation,
        pos: u16,
    },
    QueuePosEmpty {
        item: String,
        location: ItemLocation,
        pos: u16,
    },
    QueuePosTaken {
        item: String,
        location: ItemLocation,
        pos: u16,
        other: String,
        other_bag: u8,
        other_slot: u8,
    },
    NotInQueue {
        item: String,
        location: ItemLocation,
        state: ItemUpdateState,
    },
    QueueUnknownItem {
        index: usize,
        guid: ObjectGuid,
    },
    QueueOwnerMismatch {
        index: usize,
        item: String,
        owner: ObjectGuid,
        inventory_owner: String,
    },
    QueuePosMismatch {
        index: usize,
        item: String,
    },
    QueueNothingAtPosition {
        index: usize,
        item: String,
        bag: u8,
        slot: u8,
    },
    QueueOtherAtPosition {
        index: usize,
        item: String,
        bag: u8,
        slot: u8,
        other: String,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MissingItem { guid, location } => {
                write!(f, "{} {} is referenced but missing from the inventory!", guid, location)
            }
            Violation::IncorrectSlot { item, location, recorded } => {
                write!(f, "{} {} has an incorrect slot value: {}", item, location, recorded)
            }
            Violation::OwnerMismatch {
                item,
                location,
                owner,
                inventory_owner,
            } => write!(
                f,
                "{} {} owner ({}) and inventory owner ({}) don't match!",
                item, location, owner, inventory_owner
            ),
            Violation::UnexpectedContainer {
                item,
                slot,
                container,
                container_slot,
            } => write!(
                f,
                "{} at slot {} has a container {} from slot {} but shouldnt!",
                item, slot, container, container_slot
            ),
            Violation::MissingContainer { item, bag, slot } => {
                write!(f, "{} in bag {} at slot {} has no container!", item, bag, slot)
            }
            Violation::WrongContainer {
                item,
                bag,
                slot,
                container,
                container_slot,
            } => write!(
                f,
                "{} in bag {} at slot {} has a different container {} from slot {}!",
                item, bag, slot, container, container_slot
            ),
            Violation::QueuePosOutOfRange { item, location, pos } => write!(
                f,
                "{} {} has a queuepos ({}) larger than the update queue size!",
                item, location, pos
            ),
            Violation::QueuePosEmpty { item, location, pos } => write!(
                f,
                "{} {} has a queuepos ({}) that points to NULL in the queue!",
                item, location, pos
            ),
            Violation::QueuePosTaken {
                item,
                location,
                pos,
                other,
                other_bag,
                other_slot,
            } => write!(
                f,
                "{} {} has a queuepos ({}) that points to {} in the queue (bag {}, slot {})",
                item, location, pos, other, other_bag, other_slot
            ),
            Violation::NotInQueue { item, location, state } => write!(
                f,
                "{} {} is not in queue but should be (state: {})!",
                item, location, *state as u8
            ),
            Violation::QueueUnknownItem { index, guid } => {
                write!(f, "queue({}): {} is not part of the inventory!", index, guid)
            }
            Violation::QueueOwnerMismatch {
                index,
                item,
                owner,
                inventory_owner,
            } => write!(
                f,
                "queue({}): {} has the owner ({}) and inventory owner ({}) don't match!",
                index, item, owner, inventory_owner
            ),
            Violation::QueuePosMismatch { index, item } => write!(
                f,
                "queue({}): {} has queuepos doesn't match it's position in the queue!",
                index, item
            ),
            Violation::QueueNothingAtPosition { index, item, bag, slot } => write!(
                f,
                "queue({}): {} has incorrect (bag {} slot {}) values, the player doesn't have an item at that position!",
                index, item, bag, slot
            ),
            Violation::QueueOtherAtPosition {
                index,
                item,
                bag,
                slot,
                other,
            } => write!(
                f,
                "queue({}): {} has incorrect (bag {} slot {}) values, the {} is there instead!",
                index, item, bag, slot, other
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryReport {
    pub violations: Vec<Violation>,
    pub queue_empty: bool,
}

impl InventoryReport {
    pub fn is_ok(&self) -> bool {
        self.violations.is_empty()
    }

    /// Chat lines: one per violation, or the single all-clear.
    pub fn lines(&self) -> Vec<String> {
        if self.is_ok() {
            return vec!["All OK!".to_string()];
        }
        self.violations.iter().map(ToString::to_string).collect()
    }
}

fn is_buyback(slot: u8) -> bool {
    (BUYBACK_SLOT_START..BUYBACK_SLOT_END).contains(&slot)
}

/// Occupied top-level slots in order, buy-back range excluded.
fn top_level_guids(inventory: &Inventory) -> impl Iterator<Item = (u8, ObjectGuid)> + '_ {
    (PLAYER_SLOT_START..PLAYER_SLOT_END)
        .filter(|slot| !is_buyback(*slot))
        .filter_map(move |slot| {
            inventory
                .guid_at(INVENTORY_SLOT_BAG_0, slot)
                .map(|guid| (slot, guid))
        })
}

fn top_level_items(inventory: &Inventory) -> impl Iterator<Item = (u8, &Item)> + '_ {
    top_level_guids(inventory)
        .filter_map(move |(slot, guid)| inventory.item_by_guid(guid).map(|item| (slot, item)))
}

/// Checks the queue membership of an item that passed the placement checks.
fn check_queue_entry(inventory: &Inventory, item: &Item, location: ItemLocation) -> Option<Violation> {
    let queue = inventory.update_queue();
    let Some(pos) = item.queue_pos else {
        if item.state != ItemUpdateState::Unchanged {
            return Some(Violation::NotInQueue {
                item: item.guid_str(),
                location,
                state: item.state,
            });
        }
        return None;
    };

    match queue.get(pos as usize) {
        None => Some(Violation::QueuePosOutOfRange {
            item: item.guid_str(),
            location,
            pos,
        }),
        Some(None) => Some(Violation::QueuePosEmpty {
            item: item.guid_str(),
            location,
            pos,
        }),
        Some(Some(guid)) if *guid != item.guid() => {
            let (other_bag, other_slot) = inventory
                .item_by_guid(*guid)
                .map(|other| (other.bag_slot(), other.slot))
                .unwrap_or((INVENTORY_SLOT_BAG_0, NULL_SLOT));
            Some(Violation::QueuePosTaken {
                item: item.guid_str(),
                location,
                pos,
                other: guid.to_string(),
                other_bag,
                other_slot,
            })
        }
        Some(Some(_)) => None,
    }
}

fn check_top_level(inventory: &Inventory, slot: u8, item: &Item, owner_str: &str) -> Option<Violation> {
    let location = ItemLocation::Slot(slot);
    if item.slot != slot {
        return Some(Violation::IncorrectSlot {
            item: item.guid_str(),
            location,
            recorded: item.slot,
        });
    }
    if item.owner() != inventory.owner() {
        return Some(Violation::OwnerMismatch {
            item: item.guid_str(),
            location,
            owner: item.owner(),
            inventory_owner: owner_str.to_string(),
        });
    }
    if let Some(link) = item.container {
        return Some(Violation::UnexpectedContainer {
            item: item.guid_str(),
            slot,
            container: link.guid,
            container_slot: link.bag_slot,
        });
    }
    check_queue_entry(inventory, item, location)
}

fn check_bag_content(
    inventory: &Inventory,
    bag: &Item,
    bag_slot: u8,
    slot: u8,
    item: &Item,
    owner_str: &str,
) -> Option<Violation> {
    let location = ItemLocation::Bag { bag: bag_slot, slot };
    if item.slot != slot {
        return Some(Violation::IncorrectSlot {
            item: item.guid_str(),
            location,
            recorded: item.slot,
        });
    }
    if item.owner() != inventory.owner() {
        return Some(Violation::OwnerMismatch {
            item: item.guid_str(),
            location,
            owner: item.owner(),
            inventory_owner: owner_str.to_string(),
        });
    }
    let Some(link) = item.container else {
        return Some(Violation::MissingContainer {
            item: item.guid_str(),
            bag: bag_slot,
            slot,
        });
    };
    if link.guid != bag.guid() {
        return Some(Violation::WrongContainer {
            item: item.guid_str(),
            bag: bag_slot,
            slot,
            container: link.guid,
            container_slot: link.bag_slot,
        });
    }
    check_queue_entry(inventory, item, location)
}

fn check_queue(inventory: &Inventory, owner_str: &str, violations: &mut Vec<Violation>) {
    for (index, entry) in inventory.update_queue().iter().enumerate() {
        let Some(guid) = entry else {
            continue;
        };
        let Some(item) = inventory.item_by_guid(*guid) else {
            violations.push(Violation::QueueUnknownItem { index, guid: *guid });
            continue;
        };

        if item.owner() != inventory.owner() {
            violations.push(Violation::QueueOwnerMismatch {
                index,
                item: item.guid_str(),
                owner: item.owner(),
                inventory_owner: owner_str.to_string(),
            });
            continue;
        }

        if item.queue_pos.map(usize::from) != Some(index) {
            violations.push(Violation::QueuePosMismatch {
                index,
                item: item.guid_str(),
            });
            continue;
        }

        if item.state == ItemUpdateState::Removed {
            continue;
        }

        let (bag, slot) = (item.bag_slot(), item.slot);
        match inventory.item_by_pos(bag, slot) {
            None => violations.push(Violation::QueueNothingAtPosition {
                index,
                item: item.guid_str(),
                bag,
                slot,
            }),
            Some(found) if found.guid() != item.guid() => {
                violations.push(Violation::QueueOtherAtPosition {
                    index,
                    item: item.guid_str(),
                    bag,
                    slot,
                    other: found.guid_str(),
                })
            }
            Some(_) => {}
        }
    }
}

/// Walks the top-level slots (bag contents right after their bag), then the
/// update queue, collecting every violation. The first violation of an item
/// ends the checks of that item and, for a bag, of its contents.
pub fn check_inventory(inventory: &Inventory, owner_str: &str) -> InventoryReport {
    let mut violations = Vec::new();

    for (slot, guid) in top_level_guids(inventory) {
        let Some(item) = inventory.item_by_guid(guid) else {
            violations.push(Violation::MissingItem {
                guid,
                location: ItemLocation::Slot(slot),
            });
            continue;
        };
        if let Some(violation) = check_top_level(inventory, slot, item, owner_str) {
            violations.push(violation);
            continue;
        }

        let Some(bag_slots) = item.bag.as_ref() else {
            continue;
        };
        for (child_slot, child_guid) in bag_slots.occupied() {
            let Some(child) = inventory.item_by_guid(child_guid) else {
                violations.push(Violation::MissingItem {
                    guid: child_guid,
                    location: ItemLocation::Bag { bag: slot, slot: child_slot },
                });
                continue;
            };
            if let Some(violation) = check_bag_content(inventory, item, slot, child_slot, child, owner_str) {
                violations.push(violation);
            }
        }
    }

    check_queue(inventory, owner_str, &mut violations);

    if !violations.is_empty() {
        log::debug!(
            "inventory of {} has {} consistency violations",
            owner_str,
            violations.len()
        );
    }

    InventoryReport {
        violations,
        queue_empty: inventory.update_queue().is_empty(),
    }
}

/// Items in `state`: plain top-level items and the contents of bags.
pub fn list_items_in_state(inventory: &Inventory, state: ItemUpdateState) -> Vec<String> {
    let mut lines = vec![format!("The player has the following {} items: ", state)];
    for (_, item) in top_level_items(inventory) {
        match item.bag.as_ref() {
            None => {
                if item.state == state {
                    lines.push(format!(
                        "{} bag: {} slot: {} owner: {}",
                        item.guid_str(),
                        INVENTORY_SLOT_BAG_0,
                        item.slot,
                        item.owner()
                    ));
                }
            }
            Some(bag_slots) => {
                for (_, child_guid) in bag_slots.occupied() {
                    if let Some(child) = inventory.item_by_guid(child_guid) {
                        if child.state == state {
                            lines.push(format!(
                                "{} bag: {} slot: {} owner: {}",
                                child.guid_str(),
                                child.bag_slot(),
                                child.slot,
                                child.owner()
                            ));
                        }
                    }
                }
            }
        }
    }
    lines
}

pub fn list_update_queue(inventory: &Inventory) -> Vec<String> {
    let queue = inventory.update_queue();
    if queue.is_empty() {
        return vec!["updatequeue empty".to_string()];
    }
    queue
        .iter()
        .flatten()
        .filter_map(|guid| inventory.item_by_guid(*guid))
        .map(|item| {
            format!(
                "{} bag: {} slot: {} - state: {}",
                item.guid_str(),
                item.bag_slot(),
                item.slot,
                item.state
            )
        })
        .collect()
}
