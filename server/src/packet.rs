//! World packets: an opcode plus a little-endian payload, and builders for
//! the server messages the debug commands emit.

use std::fmt::Write as _;

use world_core::types::{ObjectGuid, Position};

pub mod opcodes {
    pub const SMSG_MESSAGECHAT: u16 = 0x096;
    pub const SMSG_CHANNEL_NOTIFY: u16 = 0x099;
    pub const SMSG_TRIGGER_CINEMATIC: u16 = 0x0FA;
    pub const SMSG_EMOTE: u16 = 0x103;
    pub const SMSG_INVENTORY_CHANGE_FAILURE: u16 = 0x112;
    pub const SMSG_CAST_RESULT: u16 = 0x130;
    pub const SMSG_QUESTGIVER_QUEST_INVALID: u16 = 0x18F;
    pub const SMSG_QUESTGIVER_QUEST_FAILED: u16 = 0x192;
    pub const SMSG_SELL_ITEM: u16 = 0x1A1;
    pub const SMSG_BUY_FAILED: u16 = 0x1A5;
    pub const SMSG_PLAY_SPELL_VISUAL: u16 = 0x1F3;
    pub const SMSG_GOSSIP_POI: u16 = 0x224;
    pub const SMSG_SET_FLAT_SPELL_MODIFIER: u16 = 0x266;
    pub const SMSG_SET_PCT_SPELL_MODIFIER: u16 = 0x267;
    pub const MSG_QUEST_PUSH_RESULT: u16 = 0x276;
    pub const SMSG_PLAY_MUSIC: u16 = 0x277;
    pub const SMSG_PLAY_OBJECT_SOUND: u16 = 0x278;
    pub const SMSG_UPDATE_WORLD_STATE: u16 = 0x2C3;
    pub const SMSG_PLAY_SOUND: u16 = 0x2D2;
    pub const SMSG_PET_DISMISS_SOUND: u16 = 0x325;
    pub const SMSG_TRIGGER_MOVIE: u16 = 0x464;
    pub const SMSG_SET_PHASE_SHIFT: u16 = 0x47C;

    /// Highest opcode the client knows.
    pub const NUM_MSG_TYPES: u32 = 0x51F;

    pub fn name(opcode: u16) -> &'static str {
        match opcode {
            SMSG_MESSAGECHAT => "SMSG_MESSAGECHAT",
            SMSG_CHANNEL_NOTIFY => "SMSG_CHANNEL_NOTIFY",
            SMSG_TRIGGER_CINEMATIC => "SMSG_TRIGGER_CINEMATIC",
            SMSG_EMOTE => "SMSG_EMOTE",
            SMSG_INVENTORY_CHANGE_FAILURE => "SMSG_INVENTORY_CHANGE_FAILURE",
            SMSG_CAST_RESULT => "SMSG_CAST_RESULT",
            SMSG_QUESTGIVER_QUEST_INVALID => "SMSG_QUESTGIVER_QUEST_INVALID",
            SMSG_QUESTGIVER_QUEST_FAILED => "SMSG_QUESTGIVER_QUEST_FAILED",
            SMSG_SELL_ITEM => "SMSG_SELL_ITEM",
            SMSG_BUY_FAILED => "SMSG_BUY_FAILED",
            SMSG_PLAY_SPELL_VISUAL => "SMSG_PLAY_SPELL_VISUAL",
            SMSG_GOSSIP_POI => "SMSG_GOSSIP_POI",
            SMSG_SET_FLAT_SPELL_MODIFIER => "SMSG_SET_FLAT_SPELL_MODIFIER",
            SMSG_SET_PCT_SPELL_MODIFIER => "SMSG_SET_PCT_SPELL_MODIFIER",
            MSG_QUEST_PUSH_RESULT => "MSG_QUEST_PUSH_RESULT",
            SMSG_PLAY_MUSIC => "SMSG_PLAY_MUSIC",
            SMSG_PLAY_OBJECT_SOUND => "SMSG_PLAY_OBJECT_SOUND",
            SMSG_UPDATE_WORLD_STATE => "SMSG_UPDATE_WORLD_STATE",
            SMSG_PLAY_SOUND => "SMSG_PLAY_SOUND",
            SMSG_PET_DISMISS_SOUND => "SMSG_PET_DISMISS_SOUND",
            SMSG_TRIGGER_MOVIE => "SMSG_TRIGGER_MOVIE",
            SMSG_SET_PHASE_SHIFT => "SMSG_SET_PHASE_SHIFT",
            _ => "UNKNOWN",
        }
    }
}

/// Chat message types used by the builders below.
pub const CHAT_MSG_SYSTEM: u8 = 0x00;
pub const LANG_UNIVERSAL: u32 = 0;
pub const CHAT_TAG_NONE: u8 = 0;

/// Spell id reported by the fake cast failure.
const SPELL_FAIL_SPELL_ID: u32 = 133;
const EQUIP_ERR_OK: u8 = 0;
const EQUIP_ERR_CANT_EQUIP_LEVEL_I: u8 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldPacket {
    opcode: u16,
    data: Vec<u8>,
}

impl WorldPacket {
    pub fn new(opcode: u16, capacity: usize) -> Self {
        WorldPacket {
            opcode,
            data: Vec::with_capacity(capacity),
        }
    }

    pub fn opcode(&self) -> u16 {
        self.opcode
    }

    pub fn opcode_name(&self) -> &'static str {
        opcodes::name(self.opcode)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn put_u8(&mut self, value: u8) -> &mut Self {
        self.data.push(value);
        self
    }

    pub fn put_u16(&mut self, value: u16) -> &mut Self {
        self.data.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn put_u32(&mut self, value: u32) -> &mut Self {
        self.data.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn put_i32(&mut self, value: i32) -> &mut Self {
        self.data.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn put_u64(&mut self, value: u64) -> &mut Self {
        self.data.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn put_f32(&mut self, value: f32) -> &mut Self {
        self.data.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn put_guid(&mut self, guid: ObjectGuid) -> &mut Self {
        self.put_u64(guid.raw())
    }

    pub fn put_packed_guid(&mut self, guid: ObjectGuid) -> &mut Self {
        self.data.extend_from_slice(&guid.pack());
        self
    }

    /// NUL-terminated string.
    pub fn put_cstring(&mut self, value: &str) -> &mut Self {
        self.data.extend_from_slice(value.as_bytes());
        self.data.push(0);
        self
    }

    /// Hex dump, sixteen bytes per row.
    pub fn hexlike(&self) -> String {
        let mut out = format!(
            "opcode 0x{:04X} ({}) size {}\n",
            self.opcode,
            self.opcode_name(),
            self.data.len()
        );
        for (row, chunk) in self.data.chunks(16).enumerate() {
            let _ = write!(out, "{:04X} |", row * 16);
            for byte in chunk {
                let _ = write!(out, " {:02X}", byte);
            }
            out.push('\n');
        }
        out
    }
}

pub fn cast_result(fail: u8, arg1: u32, arg2: u32) -> WorldPacket {
    let mut data = WorldPacket::new(opcodes::SMSG_CAST_RESULT, 5);
    data.put_u8(0).put_u32(SPELL_FAIL_SPELL_ID).put_u8(fail);
    if arg1 != 0 || arg2 != 0 {
        data.put_u32(arg1);
    }
    if arg2 != 0 {
        data.put_u32(arg2);
    }
    data
}

pub fn equip_error(msg: u8) -> WorldPacket {
    let mut data = WorldPacket::new(opcodes::SMSG_INVENTORY_CHANGE_FAILURE, 18);
    data.put_u8(msg);
    if msg != EQUIP_ERR_OK {
        data.put_guid(ObjectGuid::EMPTY)
            .put_guid(ObjectGuid::EMPTY)
            .put_u8(0);
        if msg == EQUIP_ERR_CANT_EQUIP_LEVEL_I {
            data.put_u32(0);
        }
    }
    data
}

pub fn sell_error(msg: u8) -> WorldPacket {
    let mut data = WorldPacket::new(opcodes::SMSG_SELL_ITEM, 17);
    data.put_guid(ObjectGuid::EMPTY)
        .put_guid(ObjectGuid::EMPTY)
        .put_u8(msg);
    data
}

pub fn buy_error(msg: u8) -> WorldPacket {
    let mut data = WorldPacket::new(opcodes::SMSG_BUY_FAILED, 13);
    data.put_guid(ObjectGuid::EMPTY).put_u32(0).put_u8(msg);
    data
}

pub fn update_world_state(state: u32, value: u32) -> WorldPacket {
    let mut data = WorldPacket::new(opcodes::SMSG_UPDATE_WORLD_STATE, 8);
    data.put_u32(state).put_u32(value);
    data
}

pub fn channel_notify(code: u8, channel: &str) -> WorldPacket {
    let mut data = WorldPacket::new(opcodes::SMSG_CHANNEL_NOTIFY, 1 + 10);
    data.put_u8(code).put_cstring(channel).put_u32(0).put_u32(0);
    data
}

pub fn chat_message(msg_type: u8, sender: ObjectGuid, message: &str) -> WorldPacket {
    let mut data = WorldPacket::new(opcodes::SMSG_MESSAGECHAT, 32 + message.len());
    data.put_u8(msg_type)
        .put_u32(LANG_UNIVERSAL)
        .put_guid(sender)
        .put_u32(0)
        .put_guid(sender)
        .put_u32(message.len() as u32 + 1)
        .put_cstring(message)
        .put_u8(CHAT_TAG_NONE);
    data
}

pub fn system_message(message: &str) -> WorldPacket {
    chat_message(CHAT_MSG_SYSTEM, ObjectGuid::EMPTY, message)
}

pub fn quest_failed(quest_id: u32, reason: u32) -> WorldPacket {
    let mut data = WorldPacket::new(opcodes::SMSG_QUESTGIVER_QUEST_FAILED, 8);
    data.put_u32(quest_id).put_u32(reason);
    data
}

pub fn quest_push_result(player: ObjectGuid, msg: u8) -> WorldPacket {
    let mut data = WorldPacket::new(opcodes::MSG_QUEST_PUSH_RESULT, 9);
    data.put_guid(player).put_u8(msg);
    data
}

pub fn quest_invalid(msg: u32) -> WorldPacket {
    let mut data = WorldPacket::new(opcodes::SMSG_QUESTGIVER_QUEST_INVALID, 4);
    data.put_u32(msg);
    data
}

pub fn set_phase_shift(phase: u32) -> WorldPacket {
    let mut data = WorldPacket::new(opcodes::SMSG_SET_PHASE_SHIFT, 4);
    data.put_u32(phase);
    data
}

pub fn spell_modifier(pct: bool, effect_index: u8, op: u8, value: i32) -> WorldPacket {
    let opcode = if pct {
        opcodes::SMSG_SET_PCT_SPELL_MODIFIER
    } else {
        opcodes::SMSG_SET_FLAT_SPELL_MODIFIER
    };
    let mut data = WorldPacket::new(opcode, 1 + 1 + 2 + 2);
    data.put_u8(effect_index).put_u8(op).put_i32(value);
    data
}

pub fn gossip_poi(x: f32, y: f32, icon: u32, flags: u32, importance: u32, name: &str) -> WorldPacket {
    let mut data = WorldPacket::new(opcodes::SMSG_GOSSIP_POI, 4 + 4 + 4 + 4 + 4 + 10);
    data.put_u32(flags)
        .put_f32(x)
        .put_f32(y)
        .put_u32(icon)
        .put_u32(importance)
        .put_cstring(name);
    data
}

pub fn trigger_cinematic(id: u32) -> WorldPacket {
    let mut data = WorldPacket::new(opcodes::SMSG_TRIGGER_CINEMATIC, 4);
    data.put_u32(id);
    data
}

pub fn trigger_movie(id: u32) -> WorldPacket {
    let mut data = WorldPacket::new(opcodes::SMSG_TRIGGER_MOVIE, 4);
    data.put_u32(id);
    data
}

/// Sound played at the listener, without a source object.
pub fn play_sound(id: u32) -> WorldPacket {
    let mut data = WorldPacket::new(opcodes::SMSG_PLAY_SOUND, 4);
    data.put_u32(id);
    data
}

/// Sound attenuated by distance to `source`.
pub fn play_object_sound(id: u32, source: ObjectGuid) -> WorldPacket {
    let mut data = WorldPacket::new(opcodes::SMSG_PLAY_OBJECT_SOUND, 12);
    data.put_u32(id).put_guid(source);
    data
}

pub fn play_music(id: u32) -> WorldPacket {
    let mut data = WorldPacket::new(opcodes::SMSG_PLAY_MUSIC, 4);
    data.put_u32(id);
    data
}

pub fn pet_dismiss_sound(sound: u32, position: &Position) -> WorldPacket {
    let mut data = WorldPacket::new(opcodes::SMSG_PET_DISMISS_SOUND, 16);
    data.put_u32(sound)
        .put_f32(position.x)
        .put_f32(position.y)
        .put_f32(position.z);
    data
}

pub fn emote(emote_id: u32, source: ObjectGuid) -> WorldPacket {
    let mut data = WorldPacket::new(opcodes::SMSG_EMOTE, 12);
    data.put_u32(emote_id).put_guid(source);
    data
}

pub fn play_spell_visual(source: ObjectGuid, visual_id: u32) -> WorldPacket {
    let mut data = WorldPacket::new(opcodes::SMSG_PLAY_SPELL_VISUAL, 12);
    data.put_guid(source).put_u32(visual_id);
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writers_are_little_endian() {
        let mut data = WorldPacket::new(0x1234, 0);
        data.put_u8(1).put_u16(0x0203).put_u32(0x0405_0607).put_f32(1.0);
        assert_eq!(
            data.data(),
            &[1, 0x03, 0x02, 0x07, 0x06, 0x05, 0x04, 0x00, 0x00, 0x80, 0x3F]
        );
    }

    #[test]
    fn test_cast_result_optional_args() {
        assert_eq!(cast_result(12, 0, 0).data(), &[0, 133, 0, 0, 0, 12]);
        assert_eq!(cast_result(12, 5, 0).len(), 10);
        assert_eq!(cast_result(12, 0, 5).len(), 14);
        assert_eq!(cast_result(12, 0, 5).opcode(), opcodes::SMSG_CAST_RESULT);
    }

    #[test]
    fn test_equip_error_layout() {
        assert_eq!(equip_error(0).data(), &[0]);
        assert_eq!(equip_error(3).len(), 1 + 8 + 8 + 1);
        assert_eq!(equip_error(1).len(), 1 + 8 + 8 + 1 + 4);
    }

    #[test]
    fn test_channel_notify() {
        let packet = channel_notify(7, "test");
        assert_eq!(&packet.data()[..6], &[7, b't', b'e', b's', b't', 0]);
        assert_eq!(packet.len(), 6 + 8);
    }

    #[test]
    fn test_spell_modifier() {
        let packet = spell_modifier(true, 3, 10, -5);
        assert_eq!(packet.opcode(), opcodes::SMSG_SET_PCT_SPELL_MODIFIER);
        assert_eq!(packet.data(), &[3, 10, 0xFB, 0xFF, 0xFF, 0xFF]);
        assert_eq!(
            spell_modifier(false, 0, 0, 0).opcode_name(),
            "SMSG_SET_FLAT_SPELL_MODIFIER"
        );
    }

    #[test]
    fn test_packed_guid() {
        let mut packet = WorldPacket::new(0, 0);
        packet.put_packed_guid(ObjectGuid::player(0x0102));
        assert_eq!(packet.data(), &[0b11, 0x02, 0x01]);
    }

    #[test]
    fn test_hexlike() {
        let mut packet = WorldPacket::new(opcodes::SMSG_EMOTE, 0);
        for byte in 0..17u8 {
            packet.put_u8(byte);
        }
        let dump = packet.hexlike();
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines[0], "opcode 0x0103 (SMSG_EMOTE) size 17");
        assert!(lines[1].starts_with("0000 | 00 01 02"));
        assert_eq!(lines[2], "0010 | 10");
    }

    #[test]
    fn test_system_message_carries_text() {
        let packet = system_message("hi");
        assert_eq!(packet.data()[0], CHAT_MSG_SYSTEM);
        // type + lang + guid + u32 + guid + len
        let text_start = 1 + 4 + 8 + 4 + 8 + 4;
        assert_eq!(&packet.data()[text_start..text_start + 3], b"hi\0");
    }
}
