//! Data types module - world objects as the debug command layer sees them

mod creature;
mod inventory;
mod item;
mod object_guid;
mod player;
mod unit;
mod values;

pub use creature::{Creature, LootRecipient, Motion, PATH_FROM_EXTERNAL};
pub use inventory::{Inventory, InventoryError};
pub use item::{BagSlots, ContainerLink, Item, ItemUpdateState};
pub use object_guid::{HighGuid, ObjectGuid};
pub use player::{AccountSecurity, Player};
pub use unit::{Position, Unit, VISIBILITY_GREY_DISTANCE};
pub use values::{FieldStore, ValueSlots};
