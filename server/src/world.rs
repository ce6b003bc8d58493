//! World state reachable from a debug command: players with their sessions
//! and the creatures around them.

use std::collections::{BTreeMap, HashMap};

use crate::packet::WorldPacket;
use world_core::constants::DEFAULT_VISIBILITY_DISTANCE;
use world_core::types::{Creature, ObjectGuid, Player, Position, Unit, ValueSlots};

/// Temporary spawns of one map instance, counted per creature entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemporarySpawns {
    pub creatures: BTreeMap<u32, u32>,
    pub pets: BTreeMap<u32, u32>,
}

#[derive(Debug, Default)]
pub struct World {
    players: HashMap<ObjectGuid, Player>,
    creatures: HashMap<ObjectGuid, Creature>,
    /// Packets delivered to each player's session, oldest first.
    sessions: HashMap<ObjectGuid, Vec<WorldPacket>>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_player(&mut self, player: Player) -> ObjectGuid {
        let guid = player.guid();
        log::info!("{} entered the world", player.guid_str());
        self.sessions.entry(guid).or_default();
        self.players.insert(guid, player);
        guid
    }

    pub fn add_creature(&mut self, creature: Creature) -> ObjectGuid {
        let guid = creature.guid();
        self.creatures.insert(guid, creature);
        guid
    }

    pub fn player(&self, guid: ObjectGuid) -> Option<&Player> {
        self.players.get(&guid)
    }

    pub fn player_mut(&mut self, guid: ObjectGuid) -> Option<&mut Player> {
        self.players.get_mut(&guid)
    }

    pub fn creature(&self, guid: ObjectGuid) -> Option<&Creature> {
        self.creatures.get(&guid)
    }

    pub fn creature_mut(&mut self, guid: ObjectGuid) -> Option<&mut Creature> {
        self.creatures.get_mut(&guid)
    }

    pub fn unit(&self, guid: ObjectGuid) -> Option<&Unit> {
        if guid.is_player() {
            self.players.get(&guid).map(|player| &player.unit)
        } else {
            self.creatures.get(&guid).map(|creature| &creature.unit)
        }
    }

    pub fn unit_mut(&mut self, guid: ObjectGuid) -> Option<&mut Unit> {
        if guid.is_player() {
            self.players.get_mut(&guid).map(|player| &mut player.unit)
        } else {
            self.creatures.get_mut(&guid).map(|creature| &mut creature.unit)
        }
    }

    pub fn find_player_by_name(&self, name: &str) -> Option<&Player> {
        self.players
            .values()
            .find(|player| player.name().eq_ignore_ascii_case(name))
    }

    /// Queues `packet` on the session of player `to`. Packets for players
    /// without a session are dropped.
    pub fn send_packet(&mut self, to: ObjectGuid, packet: WorldPacket) {
        match self.sessions.get_mut(&to) {
            Some(session) => {
                log::debug!(
                    "sending {} ({} bytes) to {}",
                    packet.opcode_name(),
                    packet.len(),
                    to
                );
                session.push(packet);
            }
            None => log::warn!("dropping {} for {}: no session", packet.opcode_name(), to),
        }
    }

    /// Sends `packet` to every player that can see `source`.
    pub fn send_to_set(&mut self, source: &Position, packet: WorldPacket) {
        let receivers: Vec<ObjectGuid> = self
            .players
            .values()
            .filter(|player| {
                player
                    .position()
                    .distance(source)
                    .is_some_and(|distance| distance <= DEFAULT_VISIBILITY_DISTANCE)
            })
            .map(|player| player.guid())
            .collect();
        for guid in receivers {
            self.send_packet(guid, packet.clone());
        }
    }

    pub fn sent_packets(&self, guid: ObjectGuid) -> &[WorldPacket] {
        self.sessions.get(&guid).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn take_packets(&mut self, guid: ObjectGuid) -> Vec<WorldPacket> {
        self.sessions
            .get_mut(&guid)
            .map(std::mem::take)
            .unwrap_or_default()
    }

    pub fn temporary_spawns(&self, map_id: u32, instance_id: u32) -> TemporarySpawns {
        let mut spawns = TemporarySpawns::default();
        for creature in self.creatures.values().filter(|creature| {
            creature.temporary
                && creature.unit.position.map_id == map_id
                && creature.unit.instance_id == instance_id
        }) {
            let counts = if creature.is_pet {
                &mut spawns.pets
            } else {
                &mut spawns.creatures
            };
            *counts.entry(creature.entry()).or_default() += 1;
        }
        spawns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet;
    use world_core::types::AccountSecurity;

    fn at(x: f32) -> Position {
        Position::new(0, x, 0.0, 0.0, 0.0)
    }

    #[test]
    fn test_unit_lookup() {
        let mut world = World::new();
        let player = world.add_player(Player::new(1, "Gm", AccountSecurity::Administrator));
        let creature = world.add_creature(Creature::new(100, 1, "Wolf", at(5.0)));

        assert_eq!(world.unit(player).map(|unit| unit.name.as_str()), Some("Gm"));
        assert_eq!(world.unit(creature).map(|unit| unit.name.as_str()), Some("Wolf"));
        assert!(world.unit(ObjectGuid::creature(100, 2)).is_none());
        assert!(world.find_player_by_name("gm").is_some());
    }

    #[test]
    fn test_packets_reach_sessions() {
        let mut world = World::new();
        let near = world.add_player(Player::new(1, "Near", AccountSecurity::Player));
        let mut far_player = Player::new(2, "Far", AccountSecurity::Player);
        far_player.unit.position = at(500.0);
        let far = world.add_player(far_player);

        world.send_to_set(&at(10.0), packet::play_sound(5));
        assert_eq!(world.sent_packets(near).len(), 1);
        assert!(world.sent_packets(far).is_empty());

        world.send_packet(far, packet::play_music(1));
        assert_eq!(world.take_packets(far).len(), 1);
        assert!(world.sent_packets(far).is_empty());

        // no session, silently dropped
        world.send_packet(ObjectGuid::player(9), packet::play_music(1));
        assert!(world.sent_packets(ObjectGuid::player(9)).is_empty());
    }

    #[test]
    fn test_temporary_spawns() {
        let mut world = World::new();
        let mut summon = Creature::new(200, 1, "Imp", at(0.0));
        summon.temporary = true;
        world.add_creature(summon.clone());
        let mut second = Creature::new(200, 2, "Imp", at(0.0));
        second.temporary = true;
        world.add_creature(second);
        world.add_creature(Creature::new(300, 3, "Guard", at(0.0)));
        world.add_creature(Creature::new_pet(400, 4, "Cat", at(0.0)));

        let spawns = world.temporary_spawns(0, 0);
        assert_eq!(spawns.creatures.into_iter().collect::<Vec<_>>(), vec![(200, 2)]);
        assert_eq!(spawns.pets.into_iter().collect::<Vec<_>>(), vec![(400, 1)]);
        assert_eq!(world.temporary_spawns(1, 0), TemporarySpawns::default());
    }
}
