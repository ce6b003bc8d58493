//! Constants module - update-field layout, inventory slot ranges and limits
//! of the 3.3.5a client the world server talks to.

use bitflags::bitflags;

// =============================================================================
// Object update fields
// =============================================================================

/// Two slots, low word first.
pub const OBJECT_FIELD_GUID: u32 = 0x0000;
pub const OBJECT_FIELD_TYPE: u32 = 0x0002;
/// Last identity-critical slot. Debug writes must stay above it.
pub const OBJECT_FIELD_ENTRY: u32 = 0x0003;
pub const OBJECT_FIELD_SCALE_X: u32 = 0x0004;
pub const OBJECT_FIELD_PADDING: u32 = 0x0005;
pub const OBJECT_END: u32 = 0x0006;

// =============================================================================
// Item / container update fields
// =============================================================================

pub const ITEM_FIELD_OWNER: u32 = OBJECT_END; // 2 slots
pub const ITEM_FIELD_CONTAINED: u32 = OBJECT_END + 0x0002; // 2 slots
pub const ITEM_FIELD_CREATOR: u32 = OBJECT_END + 0x0004; // 2 slots
pub const ITEM_FIELD_GIFTCREATOR: u32 = OBJECT_END + 0x0006; // 2 slots
pub const ITEM_FIELD_STACK_COUNT: u32 = OBJECT_END + 0x0008;
pub const ITEM_FIELD_DURATION: u32 = OBJECT_END + 0x0009;
pub const ITEM_FIELD_SPELL_CHARGES: u32 = OBJECT_END + 0x000A; // 5 slots
pub const ITEM_FIELD_FLAGS: u32 = OBJECT_END + 0x000F;
pub const ITEM_FIELD_PROPERTY_SEED: u32 = OBJECT_END + 0x0034;
pub const ITEM_FIELD_RANDOM_PROPERTIES_ID: u32 = OBJECT_END + 0x0035;
pub const ITEM_FIELD_DURABILITY: u32 = OBJECT_END + 0x0036;
pub const ITEM_FIELD_MAXDURABILITY: u32 = OBJECT_END + 0x0037;
pub const ITEM_FIELD_CREATE_PLAYED_TIME: u32 = OBJECT_END + 0x0038;
pub const ITEM_END: u32 = OBJECT_END + 0x003A;

pub const CONTAINER_FIELD_NUM_SLOTS: u32 = ITEM_END;
pub const CONTAINER_ALIGN_PAD: u32 = ITEM_END + 0x0001;
/// 36 guids, two slots each.
pub const CONTAINER_FIELD_SLOT_1: u32 = ITEM_END + 0x0002;
pub const CONTAINER_END: u32 = ITEM_END + 0x004A;

// =============================================================================
// Unit / player update fields
// =============================================================================

pub const UNIT_FIELD_BYTES_0: u32 = OBJECT_END + 0x0011;
pub const UNIT_FIELD_HEALTH: u32 = OBJECT_END + 0x0012;
pub const UNIT_FIELD_MAXHEALTH: u32 = OBJECT_END + 0x001A;
pub const UNIT_FIELD_LEVEL: u32 = OBJECT_END + 0x0030;
pub const UNIT_FIELD_FACTIONTEMPLATE: u32 = OBJECT_END + 0x0031;
pub const UNIT_FIELD_FLAGS: u32 = OBJECT_END + 0x0035;
pub const UNIT_FIELD_AURASTATE: u32 = OBJECT_END + 0x0038;
pub const UNIT_FIELD_DISPLAYID: u32 = OBJECT_END + 0x003D;
pub const UNIT_FIELD_BYTES_1: u32 = OBJECT_END + 0x0044;
pub const UNIT_FIELD_BYTES_2: u32 = OBJECT_END + 0x0074;
pub const UNIT_END: u32 = OBJECT_END + 0x008E;

pub const PLAYER_FIELD_COINAGE: u32 = UNIT_END + 0x03FE;
pub const PLAYER_END: u32 = UNIT_END + 0x049A;

bitflags! {
    /// Value of `OBJECT_FIELD_TYPE`: every class an object belongs to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TypeMask: u32 {
        const Object = 0x0001;
        const Item = 0x0002;
        const Container = 0x0004;
        const Unit = 0x0008;
        const Player = 0x0010;
        const GameObject = 0x0020;
        const DynamicObject = 0x0040;
        const Corpse = 0x0080;
    }
}

bitflags! {
    /// `ITEM_FIELD_FLAGS` bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ItemFlags: u32 {
        const Soulbound = 0x0000_0001;
        const Conjured = 0x0000_0002;
        const Openable = 0x0000_0004;
        const Wrapped = 0x0000_0008;
        const Broken = 0x0000_0010;
        const Wrapper = 0x0000_0200;
        const PartyLoot = 0x0000_0800;
        const Refundable = 0x0000_1000;
        const Unique = 0x0008_0000;
    }
}

bitflags! {
    /// Client movement state bits carried in movement packets.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MovementFlags: u32 {
        const Forward = 0x0000_0001;
        const Backward = 0x0000_0002;
        const StrafeLeft = 0x0000_0004;
        const StrafeRight = 0x0000_0008;
        const TurnLeft = 0x0000_0010;
        const TurnRight = 0x0000_0020;
        const Levitating = 0x0000_0200;
        const Root = 0x0000_0800;
        const Falling = 0x0000_1000;
        const Swimming = 0x0020_0000;
        const CanFly = 0x0080_0000;
        const Flying = 0x0200_0000;
    }
}

// =============================================================================
// Inventory layout
// =============================================================================

/// Bag value that addresses the player's own top-level slots.
pub const INVENTORY_SLOT_BAG_0: u8 = 255;
/// Slot value of an item that is not placed anywhere.
pub const NULL_SLOT: u8 = 255;

pub const EQUIPMENT_SLOT_START: u8 = 0;
pub const EQUIPMENT_SLOT_END: u8 = 19;
pub const INVENTORY_SLOT_BAG_START: u8 = 19;
pub const INVENTORY_SLOT_BAG_END: u8 = 23;
pub const INVENTORY_SLOT_ITEM_START: u8 = 23;
pub const INVENTORY_SLOT_ITEM_END: u8 = 39;
pub const BANK_SLOT_ITEM_START: u8 = 39;
pub const BANK_SLOT_ITEM_END: u8 = 67;
pub const BANK_SLOT_BAG_START: u8 = 67;
pub const BANK_SLOT_BAG_END: u8 = 74;
pub const BUYBACK_SLOT_START: u8 = 74;
pub const BUYBACK_SLOT_END: u8 = 86;
pub const KEYRING_SLOT_START: u8 = 86;
pub const KEYRING_SLOT_END: u8 = 118;
pub const CURRENCYTOKEN_SLOT_START: u8 = 118;
pub const CURRENCYTOKEN_SLOT_END: u8 = 150;

pub const PLAYER_SLOT_START: u8 = 0;
pub const PLAYER_SLOT_END: u8 = 150;

pub const MAX_BAG_SIZE: u8 = 36;

// =============================================================================
// Misc limits
// =============================================================================

/// Number of spell modifier operations known to the client.
pub const MAX_SPELLMOD: u32 = 29;
/// Spell effect family bits addressable by a spell modifier packet.
pub const MAX_SPELLMOD_EFFECT_INDEX: u32 = 64 + 32;
pub const MAX_AURA_STATE: u32 = 32;
/// Longest player name, in characters.
pub const MAX_PLAYER_NAME: usize = 12;
/// Longest name accepted by normalisation, in characters.
pub const MAX_INTERNAL_PLAYER_NAME: usize = 15;

pub const DEFAULT_VISIBILITY_DISTANCE: f32 = 90.0;

/// Maps reported by the update-time statistics command.
pub const CONTINENT_MAP_IDS: [u32; 3] = [0, 1, 530];

/// Highest waypoint path id a creature can be told to follow.
pub const MAX_WAYPOINT_PATH: u32 = 256;

pub const DEFAULT_LOOT_DROP_CHECKS: u32 = 100_000;
