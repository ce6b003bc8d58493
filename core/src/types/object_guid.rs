//! 64-bit object identity.

use std::fmt;

/// High word tag of an object guid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum HighGuid {
    Player = 0x0000,
    Item = 0x4000,
    GameObject = 0xF110,
    Unit = 0xF130,
    Pet = 0xF140,
}

impl HighGuid {
    pub fn from_raw(raw: u16) -> Option<Self> {
        match raw {
            0x0000 => Some(HighGuid::Player),
            0x4000 => Some(HighGuid::Item),
            0xF110 => Some(HighGuid::GameObject),
            0xF130 => Some(HighGuid::Unit),
            0xF140 => Some(HighGuid::Pet),
            _ => None,
        }
    }

    /// Whether the guid carries an entry id between the high tag and the counter.
    pub fn has_entry(self) -> bool {
        matches!(
            self,
            HighGuid::GameObject | HighGuid::Unit | HighGuid::Pet
        )
    }

    pub fn type_name(self) -> &'static str {
        match self {
            HighGuid::Player => "Player",
            HighGuid::Item => "Item",
            HighGuid::GameObject => "Gameobject",
            HighGuid::Unit => "Creature",
            HighGuid::Pet => "Pet",
        }
    }
}

/// Object guid laid out as `high:16 | entry:24 | counter:24` for world
/// objects and `high:16 | counter:48` (counter limited to 32 bits) otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ObjectGuid(u64);

impl ObjectGuid {
    pub const EMPTY: ObjectGuid = ObjectGuid(0);

    pub fn new(high: HighGuid, entry: u32, counter: u32) -> Self {
        let high_bits = (high as u64) << 48;
        if high.has_entry() {
            ObjectGuid(high_bits | ((entry as u64 & 0x00FF_FFFF) << 24) | (counter as u64 & 0x00FF_FFFF))
        } else {
            ObjectGuid(high_bits | counter as u64)
        }
    }

    pub fn item(counter: u32) -> Self {
        Self::new(HighGuid::Item, 0, counter)
    }

    pub fn player(counter: u32) -> Self {
        Self::new(HighGuid::Player, 0, counter)
    }

    pub fn creature(entry: u32, counter: u32) -> Self {
        Self::new(HighGuid::Unit, entry, counter)
    }

    pub fn pet(entry: u32, counter: u32) -> Self {
        Self::new(HighGuid::Pet, entry, counter)
    }

    pub fn from_raw(raw: u64) -> Self {
        ObjectGuid(raw)
    }

    /// Rebuilds a guid from the two value slots it is stored in.
    pub fn from_words(low: u32, high: u32) -> Self {
        ObjectGuid((high as u64) << 32 | low as u64)
    }

    pub fn raw(self) -> u64 {
        self.0
    }

    pub fn low_word(self) -> u32 {
        self.0 as u32
    }

    pub fn high_word(self) -> u32 {
        (self.0 >> 32) as u32
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn high(self) -> Option<HighGuid> {
        HighGuid::from_raw((self.0 >> 48) as u16)
    }

    pub fn entry(self) -> u32 {
        match self.high() {
            Some(high) if high.has_entry() => ((self.0 >> 24) & 0x00FF_FFFF) as u32,
            _ => 0,
        }
    }

    pub fn counter(self) -> u32 {
        match self.high() {
            Some(high) if high.has_entry() => (self.0 & 0x00FF_FFFF) as u32,
            _ => self.0 as u32,
        }
    }

    pub fn is_player(self) -> bool {
        !self.is_empty() && self.high() == Some(HighGuid::Player)
    }

    pub fn is_item(self) -> bool {
        self.high() == Some(HighGuid::Item)
    }

    pub fn is_creature_or_pet(self) -> bool {
        matches!(self.high(), Some(HighGuid::Unit) | Some(HighGuid::Pet))
    }

    /// Client "packed guid" form: a mask byte followed by the non-zero bytes.
    pub fn pack(self) -> Vec<u8> {
        let mut mask = 0u8;
        let mut bytes = Vec::with_capacity(9);
        bytes.push(0);
        for (i, byte) in self.0.to_le_bytes().iter().enumerate() {
            if *byte != 0 {
                mask |= 1 << i;
                bytes.push(*byte);
            }
        }
        bytes[0] = mask;
        bytes
    }
}

impl fmt::Display for ObjectGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.high() {
            Some(high) if high.has_entry() => write!(
                f,
                "{} (Entry: {} Guid: {})",
                high.type_name(),
                self.entry(),
                self.counter()
            ),
            Some(high) => write!(f, "{} (Guid: {})", high.type_name(), self.counter()),
            None => write!(f, "Object (Guid: 0x{:016X})", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guid_parts() {
        let guid = ObjectGuid::creature(1234, 77);
        assert_eq!(guid.high(), Some(HighGuid::Unit));
        assert_eq!(guid.entry(), 1234);
        assert_eq!(guid.counter(), 77);
        assert!(guid.is_creature_or_pet());

        let item = ObjectGuid::item(5);
        assert_eq!(item.entry(), 0);
        assert_eq!(item.counter(), 5);
        assert_eq!(ObjectGuid::from_words(item.low_word(), item.high_word()), item);
    }

    #[test]
    fn test_guid_display() {
        assert_eq!(ObjectGuid::item(5).to_string(), "Item (Guid: 5)");
        assert_eq!(
            ObjectGuid::creature(100, 7).to_string(),
            "Creature (Entry: 100 Guid: 7)"
        );
        assert_eq!(ObjectGuid::player(3).to_string(), "Player (Guid: 3)");
    }

    #[test]
    fn test_guid_pack() {
        assert_eq!(ObjectGuid::EMPTY.pack(), vec![0]);
        assert_eq!(ObjectGuid::player(0x0102).pack(), vec![0b0000_0011, 0x02, 0x01]);
        // Item high tag lands in byte 7.
        assert_eq!(ObjectGuid::item(1).pack(), vec![0b1000_0001, 0x01, 0x40]);
    }

    #[test]
    fn test_empty_guid_is_not_player() {
        assert!(!ObjectGuid::EMPTY.is_player());
        assert!(ObjectGuid::player(1).is_player());
    }
}
