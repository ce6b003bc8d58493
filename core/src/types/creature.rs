//! Creature structure

use super::{FieldStore, ObjectGuid, Position, Unit, ValueSlots};
use crate::constants::{MAX_WAYPOINT_PATH, TypeMask, UNIT_END};

/// Who is entitled to a creature's loot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LootRecipient {
    #[default]
    None,
    Player {
        guid: ObjectGuid,
        group_id: u32,
    },
}

/// Movement generator state relevant to waypoint debugging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Motion {
    #[default]
    Idle,
    Waypoint {
        path_id: u32,
        /// Movement source the path was started from.
        origin: u32,
    },
}

/// Path origin used when a GM starts a path by hand.
pub const PATH_FROM_EXTERNAL: u32 = 2;

#[derive(Debug, Clone)]
pub struct Creature {
    pub unit: Unit,
    pub loot_id: u32,
    pub loot_recipient: LootRecipient,
    pub motion: Motion,
    /// Spawned by a script or spell rather than the world database.
    pub temporary: bool,
    pub is_pet: bool,
}

impl Creature {
    pub fn new(entry: u32, counter: u32, name: &str, position: Position) -> Self {
        let mut unit = Unit::new(
            ObjectGuid::creature(entry, counter),
            TypeMask::Object | TypeMask::Unit,
            entry,
            UNIT_END,
            name,
        );
        unit.position = position;
        Creature {
            unit,
            loot_id: entry,
            loot_recipient: LootRecipient::None,
            motion: Motion::Idle,
            temporary: false,
            is_pet: false,
        }
    }

    pub fn new_pet(entry: u32, counter: u32, name: &str, position: Position) -> Self {
        let mut unit = Unit::new(
            ObjectGuid::pet(entry, counter),
            TypeMask::Object | TypeMask::Unit,
            entry,
            UNIT_END,
            name,
        );
        unit.position = position;
        Creature {
            unit,
            loot_id: 0,
            loot_recipient: LootRecipient::None,
            motion: Motion::Idle,
            temporary: true,
            is_pet: true,
        }
    }

    pub fn entry(&self) -> u32 {
        self.guid().entry()
    }

    pub fn name(&self) -> &str {
        &self.unit.name
    }

    pub fn path_id(&self) -> u32 {
        match self.motion {
            Motion::Waypoint { path_id, .. } => path_id,
            Motion::Idle => 0,
        }
    }

    /// Starts walking path `path_id`. Returns false when the id is out of range.
    pub fn move_waypoint(&mut self, path_id: u32, origin: u32) -> bool {
        if path_id >= MAX_WAYPOINT_PATH {
            return false;
        }
        self.motion = Motion::Waypoint { path_id, origin };
        true
    }
}

impl ValueSlots for Creature {
    fn guid(&self) -> ObjectGuid {
        self.unit.guid()
    }

    fn values(&self) -> &FieldStore {
        self.unit.values()
    }

    fn values_mut(&mut self) -> &mut FieldStore {
        self.unit.values_mut()
    }

    fn guid_str(&self) -> String {
        self.unit.guid_str()
    }
}
