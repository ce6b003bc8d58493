//! Unit state shared by players and creatures.

use super::{FieldStore, ObjectGuid, ValueSlots};
use crate::constants::{
    DEFAULT_VISIBILITY_DISTANCE, MAX_AURA_STATE, OBJECT_FIELD_GUID, TypeMask, UNIT_FIELD_AURASTATE,
    UNIT_FIELD_HEALTH, UNIT_FIELD_LEVEL, UNIT_FIELD_MAXHEALTH,
};

/// Extra range an object already known to a client keeps before it is
/// dropped again, so it does not flicker at the border.
pub const VISIBILITY_GREY_DISTANCE: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub map_id: u32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub o: f32,
}

impl Position {
    pub fn new(map_id: u32, x: f32, y: f32, z: f32, o: f32) -> Self {
        Position { map_id, x, y, z, o }
    }

    /// Straight-line distance, `None` across maps.
    pub fn distance(&self, other: &Position) -> Option<f32> {
        if self.map_id != other.map_id {
            return None;
        }
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        Some((dx * dx + dy * dy + dz * dz).sqrt())
    }
}

#[derive(Debug, Clone)]
pub struct Unit {
    values: FieldStore,
    pub name: String,
    pub position: Position,
    pub instance_id: u32,
    pub movement_flags: u32,
    /// Hidden from every client regardless of distance.
    pub invisible: bool,
}

impl Unit {
    pub fn new(guid: ObjectGuid, type_mask: TypeMask, entry: u32, field_count: u32, name: &str) -> Self {
        Unit {
            values: FieldStore::new(field_count, guid, type_mask, entry),
            name: name.to_string(),
            position: Position::default(),
            instance_id: 0,
            movement_flags: 0,
            invisible: false,
        }
    }

    pub fn level(&self) -> u32 {
        self.values.get_u32(UNIT_FIELD_LEVEL)
    }

    pub fn set_level(&mut self, level: u32) {
        self.values.set_u32(UNIT_FIELD_LEVEL, level);
    }

    pub fn set_health(&mut self, health: u32, max_health: u32) {
        self.values.set_u32(UNIT_FIELD_MAXHEALTH, max_health);
        self.values.set_u32(UNIT_FIELD_HEALTH, health.min(max_health));
    }

    pub fn has_aura_state(&self, state: u32) -> bool {
        aura_state_flag(state).is_some_and(|flag| self.values.has_flag(UNIT_FIELD_AURASTATE, flag))
    }

    /// Sets or clears aura state `state` (1..=32). Out-of-range states are ignored.
    pub fn modify_aura_state(&mut self, state: u32, apply: bool) {
        let Some(flag) = aura_state_flag(state) else {
            return;
        };
        if apply {
            self.values.set_flag(UNIT_FIELD_AURASTATE, flag);
        } else {
            self.values.remove_flag(UNIT_FIELD_AURASTATE, flag);
        }
    }

    pub fn clear_aura_states(&mut self) {
        for state in 1..=MAX_AURA_STATE {
            self.modify_aura_state(state, false);
        }
    }

    /// Visibility of this unit to a viewer standing at `viewer`.
    pub fn is_visible_for(&self, viewer: &Position, at_client: bool) -> bool {
        if self.invisible {
            return false;
        }
        let range = if at_client {
            DEFAULT_VISIBILITY_DISTANCE + VISIBILITY_GREY_DISTANCE
        } else {
            DEFAULT_VISIBILITY_DISTANCE
        };
        viewer
            .distance(&self.position)
            .is_some_and(|distance| distance <= range)
    }
}

fn aura_state_flag(state: u32) -> Option<u32> {
    (1..=MAX_AURA_STATE)
        .contains(&state)
        .then(|| 1u32 << (state - 1))
}

impl ValueSlots for Unit {
    fn guid(&self) -> ObjectGuid {
        self.values.get_guid(OBJECT_FIELD_GUID)
    }

    fn values(&self) -> &FieldStore {
        &self.values
    }

    fn values_mut(&mut self) -> &mut FieldStore {
        &mut self.values
    }

    fn guid_str(&self) -> String {
        let guid = self.guid();
        if guid.is_player() {
            format!("Player {} (Guid: {})", self.name, guid.counter())
        } else {
            guid.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::UNIT_END;

    fn unit() -> Unit {
        Unit::new(
            ObjectGuid::creature(100, 7),
            TypeMask::Object | TypeMask::Unit,
            100,
            UNIT_END,
            "Hogger",
        )
    }

    #[test]
    fn test_aura_state() {
        let mut unit = unit();
        unit.modify_aura_state(1, true);
        unit.modify_aura_state(32, true);
        assert_eq!(unit.values().get_u32(UNIT_FIELD_AURASTATE), 0x8000_0001);
        assert!(unit.has_aura_state(32));

        unit.modify_aura_state(1, false);
        assert!(!unit.has_aura_state(1));

        unit.modify_aura_state(0, true);
        unit.modify_aura_state(33, true);
        assert_eq!(unit.values().get_u32(UNIT_FIELD_AURASTATE), 0x8000_0000);

        unit.clear_aura_states();
        assert_eq!(unit.values().get_u32(UNIT_FIELD_AURASTATE), 0);
    }

    #[test]
    fn test_visibility() {
        let mut unit = unit();
        unit.position = Position::new(0, 100.0, 0.0, 0.0, 0.0);

        assert!(unit.is_visible_for(&Position::new(0, 20.0, 0.0, 0.0, 0.0), false));
        assert!(!unit.is_visible_for(&Position::new(0, 8.0, 0.0, 0.0, 0.0), false));
        assert!(unit.is_visible_for(&Position::new(0, 8.0, 0.0, 0.0, 0.0), true));
        assert!(!unit.is_visible_for(&Position::new(1, 100.0, 0.0, 0.0, 0.0), true));

        unit.invisible = true;
        assert!(!unit.is_visible_for(&Position::new(0, 100.0, 0.0, 0.0, 0.0), true));
    }

    #[test]
    fn test_guid_str() {
        assert_eq!(unit().guid_str(), "Creature (Entry: 100 Guid: 7)");
        let player = Unit::new(
            ObjectGuid::player(3),
            TypeMask::Object | TypeMask::Unit | TypeMask::Player,
            0,
            UNIT_END,
            "Arthas",
        );
        assert_eq!(player.guid_str(), "Player Arthas (Guid: 3)");
    }

    #[test]
    fn test_health_is_clamped() {
        let mut unit = unit();
        unit.set_health(500, 100);
        assert_eq!(unit.values().get_u32(UNIT_FIELD_HEALTH), 100);
    }
}
