//! Player structure

use std::collections::HashSet;

use super::{FieldStore, Inventory, ObjectGuid, Position, Unit, ValueSlots};
use crate::constants::{PLAYER_END, PLAYER_FIELD_COINAGE, TypeMask};

/// Account security level, ordered from least to most privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum AccountSecurity {
    Player = 0,
    Moderator = 1,
    GameMaster = 2,
    Administrator = 3,
    Console = 4,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub unit: Unit,
    pub inventory: Inventory,
    pub security: AccountSecurity,
    /// Unit the player currently has targeted.
    pub selection: Option<ObjectGuid>,
    pub taxi_debug: bool,
    /// Battleground instance the player is queued into or fighting in.
    pub battleground_id: Option<u32>,
    /// Objects the client has been told about.
    at_client: HashSet<ObjectGuid>,
}

impl Player {
    pub fn new(counter: u32, name: &str, security: AccountSecurity) -> Self {
        let guid = ObjectGuid::player(counter);
        Player {
            unit: Unit::new(
                guid,
                TypeMask::Object | TypeMask::Unit | TypeMask::Player,
                0,
                PLAYER_END,
                name,
            ),
            inventory: Inventory::new(guid),
            security,
            selection: None,
            taxi_debug: false,
            battleground_id: None,
            at_client: HashSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.unit.name
    }

    pub fn position(&self) -> &Position {
        &self.unit.position
    }

    pub fn money(&self) -> u32 {
        self.unit.values().get_u32(PLAYER_FIELD_COINAGE)
    }

    pub fn toggle_taxi_debug(&mut self) -> bool {
        self.taxi_debug = !self.taxi_debug;
        self.taxi_debug
    }

    pub fn have_at_client(&self, guid: ObjectGuid) -> bool {
        guid == self.guid() || self.at_client.contains(&guid)
    }

    pub fn add_to_client(&mut self, guid: ObjectGuid) {
        self.at_client.insert(guid);
    }

    pub fn remove_from_client(&mut self, guid: ObjectGuid) {
        self.at_client.remove(&guid);
    }
}

impl ValueSlots for Player {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_player() {
        let player = Player::new(1, "Jaina", AccountSecurity::GameMaster);
        assert_eq!(player.guid(), ObjectGuid::player(1));
        assert_eq!(player.values().count(), PLAYER_END);
        assert_eq!(player.inventory.owner(), player.guid());
        assert_eq!(player.guid_str(), "Player Jaina (Guid: 1)");
        assert_eq!(player.money(), 0);
    }

    #[test]
    fn test_client_visibility_set() {
        let mut player = Player::new(1, "Jaina", AccountSecurity::GameMaster);
        let other = ObjectGuid::creature(10, 2);
        assert!(player.have_at_client(player.guid()));
        assert!(!player.have_at_client(other));
        player.add_to_client(other);
        assert!(player.have_at_client(other));
        player.remove_from_client(other);
        assert!(!player.have_at_client(other));
    }

    #[test]
    fn test_security_order() {
        assert!(AccountSecurity::Player < AccountSecurity::GameMaster);
        assert!(AccountSecurity::Console > AccountSecurity::Administrator);
    }

    #[test]
    fn test_taxi_debug_toggle() {
        let mut player = Player::new(1, "Jaina", AccountSecurity::GameMaster);
        assert!(player.toggle_taxi_debug());
        assert!(!player.toggle_taxi_debug());
    }
}
