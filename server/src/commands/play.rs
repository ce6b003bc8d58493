//! `play ...` commands plus the two that animate a unit in front of the GM.

use std::f32::consts::PI;

use crate::args::Args;
use crate::chat::{ChatHandler, LANG_SELECT_CHAR_OR_CREATURE};
use crate::packet;

fn you_hear_sound(sound_id: u32) -> String {
    format!("You hear sound {}.", sound_id)
}

impl ChatHandler {
    /// Unknown sound ids are reported and count as an explained failure.
    fn require_sound(&mut self, sound_id: u32) -> bool {
        if self.services().client_data.has_sound(sound_id) {
            return true;
        }
        self.send_sys_message(format!("Sound {} not exist.", sound_id));
        self.set_sent_error();
        false
    }

    /// Starts a cinematic for the GM after dumping its camera path.
    pub fn handle_debug_play_cinematic(&mut self, args: &str) -> bool {
        let Some(sequence_id) = Args::new(args).u32() else {
            return false;
        };

        let client_data = &self.services().client_data;
        let Some(camera_id) = client_data.cinematic_camera(sequence_id) else {
            self.send_sys_message(format!("Cinematic {} not exist.", sequence_id));
            self.set_sent_error();
            return false;
        };

        let mut lines = Vec::new();
        if let Some(waypoints) = client_data.camera_waypoints(camera_id) {
            lines.push(format!("Waypoints for sequence {}, camera {}", sequence_id, camera_id));
            for (count, cam) in waypoints.iter().enumerate() {
                lines.push(format!(
                    "{:02} - {:7}ms [{:.6}, {:.6}, {:.6}] Facing {:.6} ({:.6} degrees)",
                    count + 1,
                    cam.timestamp_ms,
                    cam.x,
                    cam.y,
                    cam.z,
                    cam.facing,
                    cam.facing * (180.0 / PI)
                ));
            }
            lines.push(format!("{} waypoints dumped", waypoints.len()));
        }
        self.send_sys_lines(lines);

        self.send_packet_to_gm(packet::trigger_cinematic(sequence_id));
        true
    }

    pub fn handle_debug_play_movie(&mut self, args: &str) -> bool {
        let Some(movie_id) = Args::new(args).u32() else {
            return false;
        };
        if !self.services().client_data.has_movie(movie_id) {
            self.send_sys_message(format!("Movie {} not exist.", movie_id));
            self.set_sent_error();
            return false;
        }
        self.send_packet_to_gm(packet::trigger_movie(movie_id));
        true
    }

    /// Plays a sound for the GM, sourced at the selected unit when there is a
    /// selection.
    pub fn handle_debug_play_sound(&mut self, args: &str) -> bool {
        let Some(sound_id) = Args::new(args).u32() else {
            return false;
        };
        if !self.require_sound(sound_id) {
            return false;
        }

        let Some(source) = self.selected_unit_guid() else {
            self.send_sys_message(LANG_SELECT_CHAR_OR_CREATURE);
            self.set_sent_error();
            return false;
        };

        let data = if self.selection().is_some() {
            packet::play_object_sound(sound_id, source)
        } else {
            packet::play_sound(sound_id)
        };
        self.send_packet_to_gm(data);

        self.send_sys_message(you_hear_sound(sound_id));
        true
    }

    /// Plays music for the selected player, or the GM.
    pub fn handle_debug_play_music(&mut self, args: &str) -> bool {
        let Some(music_id) = Args::new(args).u32() else {
            return false;
        };
        if !self.require_sound(music_id) {
            return false;
        }

        let listener = self
            .selected_unit_guid()
            .filter(|guid| guid.is_player())
            .unwrap_or_else(|| self.gm_guid());
        self.world_mut().send_packet(listener, packet::play_music(music_id));

        self.send_sys_message(you_hear_sound(music_id));
        true
    }

    pub fn handle_debug_pet_dismiss_sound(&mut self, args: &str) -> bool {
        let Some(sound_id) = Args::new(args).u32() else {
            return false;
        };
        let Some(position) = self.gm().map(|player| *player.position()) else {
            return false;
        };
        self.send_packet_to_gm(packet::pet_dismiss_sound(sound_id, &position));
        self.send_sys_message(you_hear_sound(sound_id));
        true
    }

    /// GM performs an emote, seen by everyone around.
    pub fn handle_debug_anim(&mut self, args: &str) -> bool {
        let Some(emote_id) = Args::new(args).u32() else {
            return false;
        };
        let gm = self.gm_guid();
        let Some(position) = self.gm().map(|player| *player.position()) else {
            return false;
        };
        self.world_mut().send_to_set(&position, packet::emote(emote_id, gm));
        true
    }

    pub fn handle_debug_spell_visual(&mut self, args: &str) -> bool {
        let Some(target) = self.selected_unit_guid() else {
            return false;
        };
        let Some(visual_id) = Args::new(args).u32() else {
            return false;
        };
        let Some(position) = self.world().unit(target).map(|unit| unit.position) else {
            return false;
        };
        self.world_mut()
            .send_to_set(&position, packet::play_spell_visual(target, visual_id));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DebugConfig;
    use crate::packet::opcodes;
    use crate::services::{CameraWaypoint, DebugServices, InMemoryClientData};
    use crate::world::World;
    use world_core::types::{AccountSecurity, Creature, ObjectGuid, Player, Position};

    fn handler() -> ChatHandler {
        let mut world = World::new();
        let gm = world.add_player(Player::new(1, "Admin", AccountSecurity::Administrator));
        let mut near = Player::new(2, "Near", AccountSecurity::Player);
        near.unit.position = Position::new(0, 30.0, 0.0, 0.0, 0.0);
        world.add_player(near);
        let mut far = Player::new(3, "Far", AccountSecurity::Player);
        far.unit.position = Position::new(0, 500.0, 0.0, 0.0, 0.0);
        world.add_player(far);
        world.add_creature(Creature::new(100, 1, "Wolf", Position::new(0, 10.0, 0.0, 0.0, 0.0)));

        let mut client_data = InMemoryClientData::default();
        client_data.add_cinematic(41, 7);
        client_data.add_cinematic(42, 8);
        client_data.add_camera(
            7,
            vec![
                CameraWaypoint { timestamp_ms: 0, x: 1.0, y: 2.0, z: 3.0, facing: 0.0 },
                CameraWaypoint { timestamp_ms: 1500, x: 4.0, y: 5.0, z: 6.0, facing: PI },
            ],
        );
        client_data.add_movie(2);
        client_data.add_sound(1000);
        let mut services = DebugServices::in_memory(1);
        services.client_data = Box::new(client_data);

        ChatHandler::new(world, services, DebugConfig::default(), gm)
    }

    fn gm_opcodes(handler: &mut ChatHandler) -> Vec<u16> {
        let gm = handler.gm_guid();
        handler
            .world_mut()
            .take_packets(gm)
            .iter()
            .map(|p| p.opcode())
            .collect()
    }

    #[test]
    fn test_cinematic_dumps_camera() {
        let mut handler = handler();
        assert!(handler.handle_debug_play_cinematic("41"));
        let messages = handler.take_messages();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0], "Waypoints for sequence 41, camera 7");
        assert_eq!(
            messages[1],
            "01 -       0ms [1.000000, 2.000000, 3.000000] Facing 0.000000 (0.000000 degrees)"
        );
        assert!(messages[2].starts_with("02 -    1500ms [4.000000, 5.000000, 6.000000] Facing 3.141593 (1"));
        assert!(messages[2].ends_with(" degrees)"));
        assert_eq!(messages[3], "2 waypoints dumped");
        assert_eq!(gm_opcodes(&mut handler), vec![opcodes::SMSG_TRIGGER_CINEMATIC]);
    }

    #[test]
    fn test_cinematic_without_camera_data() {
        let mut handler = handler();
        assert!(handler.handle_debug_play_cinematic("42"));
        assert!(handler.take_messages().is_empty());
        assert_eq!(gm_opcodes(&mut handler), vec![opcodes::SMSG_TRIGGER_CINEMATIC]);
    }

    #[test]
    fn test_unknown_client_data_ids() {
        let mut handler = handler();
        assert!(!handler.handle_debug_play_cinematic("9"));
        assert!(!handler.handle_debug_play_movie("9"));
        assert!(!handler.handle_debug_play_sound("9"));
        assert!(!handler.handle_debug_play_music("9"));
        assert!(handler.has_sent_error());
        assert_eq!(
            handler.take_messages(),
            vec![
                "Cinematic 9 not exist.".to_string(),
                "Movie 9 not exist.".to_string(),
                "Sound 9 not exist.".to_string(),
                "Sound 9 not exist.".to_string(),
            ]
        );
        assert!(gm_opcodes(&mut handler).is_empty());
    }

    #[test]
    fn test_movie() {
        let mut handler = handler();
        assert!(handler.handle_debug_play_movie("2"));
        assert_eq!(gm_opcodes(&mut handler), vec![opcodes::SMSG_TRIGGER_MOVIE]);
    }

    #[test]
    fn test_sound_source_follows_selection() {
        let mut handler = handler();
        assert!(handler.handle_debug_play_sound("1000"));
        assert_eq!(gm_opcodes(&mut handler), vec![opcodes::SMSG_PLAY_SOUND]);

        let wolf = ObjectGuid::creature(100, 1);
        handler.gm_mut().unwrap().selection = Some(wolf);
        assert!(handler.handle_debug_play_sound("1000"));
        let gm = handler.gm_guid();
        assert_eq!(
            handler.world_mut().take_packets(gm),
            vec![packet::play_object_sound(1000, wolf)]
        );
        assert_eq!(
            handler.take_messages(),
            vec!["You hear sound 1000.".to_string(), "You hear sound 1000.".to_string()]
        );

        handler.gm_mut().unwrap().selection = Some(ObjectGuid::creature(100, 2));
        assert!(!handler.handle_debug_play_sound("1000"));
        assert_eq!(handler.take_messages(), vec![LANG_SELECT_CHAR_OR_CREATURE.to_string()]);
    }

    #[test]
    fn test_music_goes_to_selected_player() {
        let mut handler = handler();
        let near = ObjectGuid::player(2);
        handler.gm_mut().unwrap().selection = Some(near);
        assert!(handler.handle_debug_play_music("1000"));
        assert_eq!(handler.world().sent_packets(near), &[packet::play_music(1000)]);
        assert!(gm_opcodes(&mut handler).is_empty());

        handler.gm_mut().unwrap().selection = Some(ObjectGuid::creature(100, 1));
        assert!(handler.handle_debug_play_music("1000"));
        assert_eq!(gm_opcodes(&mut handler), vec![opcodes::SMSG_PLAY_MUSIC]);
    }

    #[test]
    fn test_pet_dismiss_sound() {
        let mut handler = handler();
        assert!(handler.handle_debug_pet_dismiss_sound("17"));
        assert_eq!(handler.take_messages(), vec!["You hear sound 17.".to_string()]);
        assert_eq!(gm_opcodes(&mut handler), vec![opcodes::SMSG_PET_DISMISS_SOUND]);
        assert!(!handler.handle_debug_pet_dismiss_sound("x"));
    }

    #[test]
    fn test_anim_reaches_nearby_players() {
        let mut handler = handler();
        assert!(handler.handle_debug_anim("10"));
        let gm = handler.gm_guid();
        assert_eq!(handler.world().sent_packets(gm), &[packet::emote(10, gm)]);
        assert_eq!(handler.world().sent_packets(ObjectGuid::player(2)).len(), 1);
        assert!(handler.world().sent_packets(ObjectGuid::player(3)).is_empty());
    }

    #[test]
    fn test_spell_visual_on_selection() {
        let mut handler = handler();
        let wolf = ObjectGuid::creature(100, 1);
        handler.gm_mut().unwrap().selection = Some(wolf);
        assert!(handler.handle_debug_spell_visual("321"));
        assert_eq!(gm_opcodes(&mut handler), vec![opcodes::SMSG_PLAY_SPELL_VISUAL]);
        assert!(!handler.handle_debug_spell_visual(""));
    }
}
