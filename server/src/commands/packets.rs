//! `send ...` commands: hand-built packets pushed at a client.

use crate::args::{atoi, is_abbrev, Args};
use crate::chat::{ChatHandler, LANG_NO_CHAR_SELECTED, LANG_SELECT_CHAR_OR_CREATURE};
use crate::opcode_script::load_opcode_script;
use crate::packet;
use world_core::constants::{MAX_SPELLMOD, MAX_SPELLMOD_EFFECT_INDEX};

const TEST_CHANNEL: &str = "test";
const TEST_CHAT_MESSAGE: &str = "testtest";
const POI_IMPORTANCE: u32 = 30;
const POI_NAME: &str = "Test POI";
const LARGE_PACKET_SIZE: usize = 128_000;
const LARGE_PACKET_FILLER: &str = "This is a dummy string to push the packet's size beyond 128000 bytes. ";

impl ChatHandler {
    pub fn handle_debug_send_spell_fail(&mut self, args: &str) -> bool {
        let mut args = Args::new(args);
        if args.is_empty() {
            return false;
        }
        let Some(reason) = args.u32().filter(|reason| *reason <= 255) else {
            return false;
        };
        let (Some(arg1), Some(arg2)) = (args.opt_u32(0), args.opt_u32(0)) else {
            return false;
        };
        self.send_packet_to_gm(packet::cast_result(reason as u8, arg1, arg2));
        true
    }

    /// Points the GM's map at the selected unit.
    pub fn handle_debug_send_poi(&mut self, args: &str) -> bool {
        let Some(position) = self.selected_unit().map(|unit| unit.position) else {
            self.send_sys_message(LANG_SELECT_CHAR_OR_CREATURE);
            return true;
        };
        let mut args = Args::new(args);
        let (Some(icon), Some(flags)) = (args.u32(), args.u32()) else {
            return false;
        };

        log::info!(
            "Command : POI, target = {}, icon = {} flags = {}",
            self.selected_unit_guid().map_or_else(String::new, |guid| guid.to_string()),
            icon,
            flags
        );
        self.send_packet_to_gm(packet::gossip_poi(
            position.x,
            position.y,
            icon,
            flags,
            POI_IMPORTANCE,
            POI_NAME,
        ));
        true
    }

    pub fn handle_debug_send_equip_error(&mut self, args: &str) -> bool {
        if args.trim().is_empty() {
            return false;
        }
        self.send_packet_to_gm(packet::equip_error(atoi(args) as u8));
        true
    }

    pub fn handle_debug_send_sell_error(&mut self, args: &str) -> bool {
        if args.trim().is_empty() {
            return false;
        }
        self.send_packet_to_gm(packet::sell_error(atoi(args) as u8));
        true
    }

    pub fn handle_debug_send_buy_error(&mut self, args: &str) -> bool {
        if args.trim().is_empty() {
            return false;
        }
        self.send_packet_to_gm(packet::buy_error(atoi(args) as u8));
        true
    }

    /// Sends the packet described by the opcode script to the selected
    /// player, or to the GM.
    pub fn handle_debug_send_opcode(&mut self, _args: &str) -> bool {
        let target = self
            .selected_unit_guid()
            .filter(|guid| guid.is_player())
            .unwrap_or_else(|| self.gm_guid());

        let data = match load_opcode_script(&self.config().opcode_file, target) {
            Ok(data) => data,
            Err(err) => {
                log::warn!("send opcode: {}", err);
                return false;
            }
        };

        log::debug!("Sending opcode {}, {}", data.opcode(), data.opcode_name());
        log::trace!("{}", data.hexlike());

        let opcode = data.opcode();
        self.world_mut().send_packet(target, data);
        let name = self.unit_name(target);
        self.send_sys_message(format!("Opcode {} sent to {}", opcode, name));
        true
    }

    pub fn handle_debug_update_world_state(&mut self, args: &str) -> bool {
        let mut args = Args::new(args);
        let (Some(state), Some(value)) = (args.u32(), args.u32()) else {
            return false;
        };
        self.send_packet_to_gm(packet::update_world_state(state, value));
        true
    }

    pub fn handle_debug_send_world_state(&mut self, args: &str) -> bool {
        self.handle_debug_update_world_state(args)
    }

    pub fn handle_debug_send_channel_notify(&mut self, args: &str) -> bool {
        let Some(code) = Args::new(args).u32().filter(|code| *code <= 255) else {
            return false;
        };
        self.send_packet_to_gm(packet::channel_notify(code as u8, TEST_CHANNEL));
        true
    }

    pub fn handle_debug_send_chat_message(&mut self, args: &str) -> bool {
        let Some(msg_type) = Args::new(args).u32().filter(|msg_type| *msg_type <= 255) else {
            return false;
        };
        let sender = self.gm_guid();
        self.send_packet_to_gm(packet::chat_message(msg_type as u8, sender, TEST_CHAT_MESSAGE));
        true
    }

    pub fn handle_debug_send_quest_failed(&mut self, args: &str) -> bool {
        let mut args = Args::new(args);
        let (Some(quest_id), Some(reason)) = (args.u32(), args.u32()) else {
            return false;
        };
        self.send_packet_to_gm(packet::quest_failed(quest_id, reason));
        true
    }

    pub fn handle_debug_send_quest_party_msg(&mut self, args: &str) -> bool {
        let Some(msg) = Args::new(args).u32() else {
            return false;
        };
        let gm = self.gm_guid();
        self.send_packet_to_gm(packet::quest_push_result(gm, msg as u8));
        true
    }

    pub fn handle_debug_send_quest_invalid_msg(&mut self, args: &str) -> bool {
        let Some(msg) = Args::new(args).u32() else {
            return false;
        };
        self.send_packet_to_gm(packet::quest_invalid(msg));
        true
    }

    pub fn handle_debug_send_set_phase_shift(&mut self, args: &str) -> bool {
        if args.trim().is_empty() {
            return false;
        }
        self.send_packet_to_gm(packet::set_phase_shift(atoi(args) as u32));
        true
    }

    pub fn handle_debug_send_large_packet(&mut self, _args: &str) -> bool {
        let mut text = String::with_capacity(LARGE_PACKET_SIZE + LARGE_PACKET_FILLER.len());
        while text.len() < LARGE_PACKET_SIZE {
            text.push_str(LARGE_PACKET_FILLER);
        }
        self.send_sys_message(text);
        true
    }

    /// `spellmods flat|pct <family bit> <op> <value>` on the selected player.
    pub fn handle_debug_spell_mods(&mut self, args: &str) -> bool {
        let mut args = Args::new(args);
        let pct = match args.literal() {
            Some(kind) if is_abbrev(kind, "flat") => false,
            Some(kind) if is_abbrev(kind, "pct") => true,
            _ => return false,
        };
        let Some(effect_index) = args.u32().filter(|index| *index < MAX_SPELLMOD_EFFECT_INDEX) else {
            return false;
        };
        let Some(op) = args.u32().filter(|op| *op < MAX_SPELLMOD) else {
            return false;
        };
        let Some(value) = args.i32() else {
            return false;
        };

        let Some(target) = self.selected_player_guid() else {
            self.send_sys_message(LANG_NO_CHAR_SELECTED);
            self.set_sent_error();
            return false;
        };
        if self.has_lower_security(target) {
            return false;
        }

        let kind = if pct { "pct" } else { "flat" };
        let target_name = self.unit_name(target);
        self.send_sys_message(format!(
            "You set {} spellmod {} to value {} for spell family bit {} for {}.",
            kind, op, value, effect_index, target_name
        ));
        if target != self.gm_guid() {
            let gm_name = self.unit_name(self.gm_guid());
            let notice = format!(
                "{} set your {} spellmod {} to value {} for spell family bit {}.",
                gm_name, kind, op, value, effect_index
            );
            self.world_mut().send_packet(target, packet::system_message(&notice));
        }

        self.world_mut()
            .send_packet(target, packet::spell_modifier(pct, effect_index as u8, op as u8, value));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DebugConfig;
    use crate::packet::opcodes;
    use crate::services::DebugServices;
    use crate::world::World;
    use std::path::PathBuf;
    use world_core::types::{AccountSecurity, Creature, ObjectGuid, Player, Position};

    fn handler_with(config: DebugConfig) -> ChatHandler {
        let mut world = World::new();
        let gm = world.add_player(Player::new(1, "Admin", AccountSecurity::Administrator));
        world.add_player(Player::new(2, "Other", AccountSecurity::Player));
        world.add_player(Player::new(3, "Owner", AccountSecurity::Console));
        let mut wolf = Creature::new(100, 1, "Wolf", Position::new(0, 10.0, 20.0, 0.0, 0.0));
        wolf.unit.position.z = 3.0;
        world.add_creature(wolf);
        ChatHandler::new(world, DebugServices::in_memory(1), config, gm)
    }

    fn handler() -> ChatHandler {
        handler_with(DebugConfig::default())
    }

    fn gm_packets(handler: &mut ChatHandler) -> Vec<packet::WorldPacket> {
        let gm = handler.gm_guid();
        handler.world_mut().take_packets(gm)
    }

    #[test]
    fn test_spell_fail() {
        let mut handler = handler();
        assert!(handler.handle_debug_send_spell_fail("12 0 7"));
        let packets = gm_packets(&mut handler);
        assert_eq!(packets.len(), 1);
        assert_eq!(packets[0], packet::cast_result(12, 0, 7));

        assert!(!handler.handle_debug_send_spell_fail(""));
        assert!(!handler.handle_debug_send_spell_fail("256"));
        assert!(!handler.handle_debug_send_spell_fail("12 x"));
        assert!(gm_packets(&mut handler).is_empty());
    }

    #[test]
    fn test_error_packets_use_atoi() {
        let mut handler = handler();
        assert!(handler.handle_debug_send_equip_error("300abc"));
        assert!(handler.handle_debug_send_sell_error("junk"));
        assert!(handler.handle_debug_send_buy_error("4"));
        assert!(!handler.handle_debug_send_buy_error("  "));
        let packets = gm_packets(&mut handler);
        assert_eq!(packets[0], packet::equip_error(44));
        assert_eq!(packets[1], packet::sell_error(0));
        assert_eq!(packets[2], packet::buy_error(4));
    }

    #[test]
    fn test_poi_uses_selected_unit() {
        let mut handler = handler();
        handler.gm_mut().unwrap().selection = Some(ObjectGuid::creature(100, 1));
        assert!(handler.handle_debug_send_poi("7 99"));
        assert_eq!(
            gm_packets(&mut handler),
            vec![packet::gossip_poi(10.0, 20.0, 7, 99, 30, "Test POI")]
        );

        handler.gm_mut().unwrap().selection = Some(ObjectGuid::creature(100, 50));
        assert!(handler.handle_debug_send_poi("7 99"));
        assert_eq!(handler.take_messages(), vec![LANG_SELECT_CHAR_OR_CREATURE.to_string()]);
    }

    #[test]
    fn test_fixed_payload_packets() {
        let mut handler = handler();
        assert!(handler.handle_debug_send_channel_notify("5"));
        assert!(!handler.handle_debug_send_channel_notify("256"));
        assert!(handler.handle_debug_send_chat_message("1"));
        assert!(handler.handle_debug_update_world_state("3000 1"));
        assert!(handler.handle_debug_send_world_state("3001 2"));
        assert!(!handler.handle_debug_send_world_state("3001"));
        assert!(handler.handle_debug_send_quest_failed("10 2"));
        assert!(handler.handle_debug_send_quest_party_msg("3"));
        assert!(handler.handle_debug_send_quest_invalid_msg("1"));
        assert!(!handler.handle_debug_send_quest_invalid_msg("x"));
        assert!(handler.handle_debug_send_set_phase_shift("2"));
        assert!(!handler.handle_debug_send_set_phase_shift(""));

        let sent: Vec<u16> = gm_packets(&mut handler).iter().map(|p| p.opcode()).collect();
        assert_eq!(
            sent,
            vec![
                opcodes::SMSG_CHANNEL_NOTIFY,
                opcodes::SMSG_MESSAGECHAT,
                opcodes::SMSG_UPDATE_WORLD_STATE,
                opcodes::SMSG_UPDATE_WORLD_STATE,
                opcodes::SMSG_QUESTGIVER_QUEST_FAILED,
                opcodes::MSG_QUEST_PUSH_RESULT,
                opcodes::SMSG_QUESTGIVER_QUEST_INVALID,
                opcodes::SMSG_SET_PHASE_SHIFT,
            ]
        );
    }

    #[test]
    fn test_large_packet() {
        let mut handler = handler();
        assert!(handler.handle_debug_send_large_packet(""));
        let messages = handler.take_messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].len() >= LARGE_PACKET_SIZE);
        assert!(messages[0].len() < LARGE_PACKET_SIZE + LARGE_PACKET_FILLER.len());
        assert!(messages[0].starts_with(LARGE_PACKET_FILLER));
    }

    #[test]
    fn test_spell_mods() {
        let mut handler = handler();
        let other = ObjectGuid::player(2);
        handler.gm_mut().unwrap().selection = Some(other);

        assert!(handler.handle_debug_spell_mods("p 3 10 -20"));
        assert_eq!(
            handler.take_messages(),
            vec!["You set pct spellmod 10 to value -20 for spell family bit 3 for Other.".to_string()]
        );
        let packets = handler.world_mut().take_packets(other);
        assert_eq!(packets.len(), 2);
        assert_eq!(packets[1], packet::spell_modifier(true, 3, 10, -20));

        assert!(!handler.handle_debug_spell_mods("flat 96 1 1"));
        assert!(!handler.handle_debug_spell_mods("flat 1 29 1"));
        assert!(!handler.handle_debug_spell_mods("mult 1 1 1"));
    }

    #[test]
    fn test_spell_mods_checks_target() {
        let mut handler = handler();
        handler.gm_mut().unwrap().selection = Some(ObjectGuid::creature(100, 1));
        assert!(!handler.handle_debug_spell_mods("flat 1 1 1"));
        assert_eq!(handler.take_messages(), vec![LANG_NO_CHAR_SELECTED.to_string()]);

        handler.gm_mut().unwrap().selection = Some(ObjectGuid::player(3));
        assert!(!handler.handle_debug_spell_mods("flat 1 1 1"));
        assert!(handler.has_sent_error());
        assert!(handler.world().sent_packets(ObjectGuid::player(3)).is_empty());
    }

    #[test]
    fn test_send_opcode_from_script() {
        let path = std::env::temp_dir().join(format!("world-debug-opcode-{}.txt", std::process::id()));
        std::fs::write(&path, "150 uint32 7 pguid").unwrap();
        let config = DebugConfig {
            opcode_file: path.clone(),
            ..DebugConfig::default()
        };
        let mut handler = handler_with(config);

        assert!(handler.handle_debug_send_opcode(""));
        assert_eq!(handler.take_messages(), vec!["Opcode 150 sent to Admin".to_string()]);
        let packets = gm_packets(&mut handler);
        assert_eq!(packets.len(), 1);
        assert_eq!(&packets[0].data()[..4], &7u32.to_le_bytes());

        // creature selection falls back to the GM
        handler.gm_mut().unwrap().selection = Some(ObjectGuid::creature(100, 1));
        assert!(handler.handle_debug_send_opcode(""));
        assert_eq!(gm_packets(&mut handler).len(), 1);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_send_opcode_missing_file() {
        let config = DebugConfig {
            opcode_file: PathBuf::from("/nonexistent/opcode.txt"),
            ..DebugConfig::default()
        };
        let mut handler = handler_with(config);
        assert!(!handler.handle_debug_send_opcode(""));
        assert!(!handler.has_sent_error());
    }
}
