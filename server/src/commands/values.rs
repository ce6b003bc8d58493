//! Raw value slot commands: get/set/mod on units and items, byte flags and
//! aura states.

use crate::args::Args;
use crate::chat::{ChatHandler, LANG_SELECT_CHAR_OR_CREATURE};
use crate::field_access::{modify_field, read_field, write_field, FieldError, FieldReport};
use world_core::constants::{UNIT_FIELD_BYTES_0, UNIT_FIELD_BYTES_1, UNIT_FIELD_BYTES_2};
use world_core::types::{Item, ObjectGuid, ValueSlots};

/// Which slot operation a command performs.
enum FieldOp<'a> {
    Read { format: Option<&'a str> },
    Write { format: &'a str, literal: &'a str },
    Modify { modifier: &'a str, literal: &'a str },
}

impl ChatHandler {
    fn report_field(&mut self, result: Result<FieldReport, FieldError>) -> bool {
        match result {
            Ok(report) => {
                self.send_sys_message(report.to_string());
                true
            }
            Err(err) if err.is_usage_error() => false,
            Err(err) => {
                self.send_sys_message(err.to_string());
                self.set_sent_error();
                false
            }
        }
    }

    /// Selected unit, or an error message for the GM.
    fn require_selected_unit(&mut self) -> Option<ObjectGuid> {
        let guid = self.selected_unit_guid();
        if guid.is_none() {
            self.send_sys_message(LANG_SELECT_CHAR_OR_CREATURE);
            self.set_sent_error();
        }
        guid
    }

    fn apply_to_unit(&mut self, target: ObjectGuid, field: u32, op: FieldOp<'_>) -> bool {
        let Some(unit) = self.world_mut().unit_mut(target) else {
            return false;
        };
        let result = match op {
            FieldOp::Read { format } => read_field(&*unit, field, format),
            FieldOp::Write { format, literal } => write_field(unit, field, Some(format), literal),
            FieldOp::Modify { modifier, literal } => modify_field(unit, field, modifier, literal),
        };
        self.report_field(result)
    }

    fn apply_to_item(&mut self, counter: u32, field: u32, op: FieldOp<'_>) -> bool {
        let Some(item) = self.gm_item_mut(counter) else {
            return false;
        };
        let result = match op {
            FieldOp::Read { format } => read_field(&*item, field, format),
            FieldOp::Write { format, literal } => write_field(item, field, Some(format), literal),
            FieldOp::Modify { modifier, literal } => modify_field(item, field, modifier, literal),
        };
        self.report_field(result)
    }

    fn gm_item_mut(&mut self, counter: u32) -> Option<&mut Item> {
        self.gm_mut()?.inventory.item_by_counter_mut(counter)
    }

    pub fn handle_debug_get_value(&mut self, args: &str) -> bool {
        let Some(target) = self.require_selected_unit() else {
            return false;
        };
        let mut args = Args::new(args);
        let Some(field) = args.u32() else {
            return false;
        };
        let format = args.literal();
        if format.is_none() && !args.is_empty() {
            return false;
        }
        self.apply_to_unit(target, field, FieldOp::Read { format })
    }

    pub fn handle_debug_set_value(&mut self, args: &str) -> bool {
        let Some(target) = self.require_selected_unit() else {
            return false;
        };
        let mut args = Args::new(args);
        let Some(field) = args.u32() else {
            return false;
        };
        let Some(format) = args.opt_not_last() else {
            return false;
        };
        let Some(literal) = args.literal() else {
            return false;
        };
        self.apply_to_unit(target, field, FieldOp::Write { format, literal })
    }

    pub fn handle_debug_mod_value(&mut self, args: &str) -> bool {
        let Some(target) = self.require_selected_unit() else {
            return false;
        };
        let mut args = Args::new(args);
        let Some(field) = args.u32() else {
            return false;
        };
        let Some(modifier) = args.literal() else {
            return false;
        };
        let Some(literal) = args.literal() else {
            return false;
        };
        self.apply_to_unit(target, field, FieldOp::Modify { modifier, literal })
    }

    pub fn handle_debug_get_item_value(&mut self, args: &str) -> bool {
        let mut args = Args::new(args);
        let (Some(counter), Some(field)) = (args.u32(), args.u32()) else {
            return false;
        };
        let format = args.literal();
        if format.is_none() && !args.is_empty() {
            return false;
        }
        self.apply_to_item(counter, field, FieldOp::Read { format })
    }

    pub fn handle_debug_set_item_value(&mut self, args: &str) -> bool {
        let mut args = Args::new(args);
        let (Some(counter), Some(field)) = (args.u32(), args.u32()) else {
            return false;
        };
        let Some(format) = args.opt_not_last() else {
            return false;
        };
        let Some(literal) = args.literal() else {
            return false;
        };
        self.apply_to_item(counter, field, FieldOp::Write { format, literal })
    }

    pub fn handle_debug_mod_item_value(&mut self, args: &str) -> bool {
        let mut args = Args::new(args);
        let (Some(counter), Some(field)) = (args.u32(), args.u32()) else {
            return false;
        };
        let (Some(modifier), Some(literal)) = (args.literal(), args.literal()) else {
            return false;
        };
        self.apply_to_item(counter, field, FieldOp::Modify { modifier, literal })
    }

    /// `bytefields <field> <byte> <flag>`: fields 0, 1, 2 set a flag in
    /// UNIT_FIELD_BYTES_0/1/2, fields -10, -1, -2 remove it.
    pub fn handle_debug_byte_fields(&mut self, args: &str) -> bool {
        let Some(target) = self.selected_creature_guid() else {
            return false;
        };
        let mut args = Args::new(args);
        let (Some(field), Some(offset), Some(flag)) = (args.i32(), args.u32(), args.u32()) else {
            return false;
        };
        let Ok(offset) = u8::try_from(offset) else {
            return false;
        };
        if offset > 3 {
            return false;
        }
        let Some(creature) = self.world_mut().creature_mut(target) else {
            return false;
        };

        let values = creature.unit.values_mut();
        let flag = flag as u8;
        match field {
            0 => values.set_byte_flag(UNIT_FIELD_BYTES_0, offset, flag),
            1 => values.set_byte_flag(UNIT_FIELD_BYTES_1, offset, flag),
            2 => values.set_byte_flag(UNIT_FIELD_BYTES_2, offset, flag),
            -10 => values.remove_byte_flag(UNIT_FIELD_BYTES_0, offset, flag),
            -1 => values.remove_byte_flag(UNIT_FIELD_BYTES_1, offset, flag),
            -2 => values.remove_byte_flag(UNIT_FIELD_BYTES_2, offset, flag),
            _ => {}
        }
        true
    }

    /// `setaurastate <n>`: positive sets state n, negative clears state -n,
    /// zero clears all of them.
    pub fn handle_debug_set_aura_state(&mut self, args: &str) -> bool {
        let Some(state) = Args::new(args).i32() else {
            return false;
        };
        let Some(unit) = self.selected_unit_mut() else {
            self.send_sys_message(LANG_SELECT_CHAR_OR_CREATURE);
            self.set_sent_error();
            return false;
        };

        if state == 0 {
            unit.clear_aura_states();
        } else {
            unit.modify_aura_state(state.unsigned_abs(), state > 0);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DebugConfig;
    use crate::services::DebugServices;
    use crate::world::World;
    use world_core::constants::{
        INVENTORY_SLOT_BAG_0, INVENTORY_SLOT_ITEM_START, ITEM_FIELD_DURABILITY, OBJECT_FIELD_SCALE_X,
        UNIT_FIELD_AURASTATE, UNIT_FIELD_LEVEL,
    };
    use world_core::types::{AccountSecurity, Creature, Player, Position};

    fn handler() -> ChatHandler {
        let mut world = World::new();
        let mut gm = Player::new(1, "Admin", AccountSecurity::Administrator);
        gm.unit.set_level(80);
        gm.inventory
            .load_item(INVENTORY_SLOT_BAG_0, INVENTORY_SLOT_ITEM_START, Item::new(42, 25, ObjectGuid::player(1)))
            .unwrap();
        let gm = world.add_player(gm);
        world.add_creature(Creature::new(100, 1, "Wolf", Position::default()));
        ChatHandler::new(world, DebugServices::in_memory(1), DebugConfig::default(), gm)
    }

    #[test]
    fn test_get_value_on_self() {
        let mut handler = handler();
        assert!(handler.handle_debug_get_value(&UNIT_FIELD_LEVEL.to_string()));
        assert_eq!(
            handler.take_messages(),
            vec![format!(
                "The uint32 value of Player Admin (Guid: 1) in {} is: 80",
                UNIT_FIELD_LEVEL
            )]
        );

        assert!(handler.handle_debug_get_value(&format!("{} h", UNIT_FIELD_LEVEL)));
        assert!(handler.take_messages()[0].ends_with(" is: 50"));
    }

    #[test]
    fn test_set_value_needs_type() {
        let mut handler = handler();
        assert!(!handler.handle_debug_set_value(&format!("{} 70", UNIT_FIELD_LEVEL)));
        assert!(!handler.has_sent_error());

        assert!(handler.handle_debug_set_value(&format!("{} int 70", UNIT_FIELD_LEVEL)));
        assert_eq!(handler.gm().unwrap().unit.level(), 70);
    }

    #[test]
    fn test_set_value_on_selected_creature() {
        let mut handler = handler();
        let wolf = ObjectGuid::creature(100, 1);
        handler.gm_mut().unwrap().selection = Some(wolf);

        assert!(handler.handle_debug_set_value(&format!("{} float 2.5", OBJECT_FIELD_SCALE_X)));
        let scale = handler.world().creature(wolf).unwrap().values().get_f32(OBJECT_FIELD_SCALE_X);
        assert_eq!(scale, 2.5);
    }

    #[test]
    fn test_protected_and_missing_target() {
        let mut handler = handler();
        assert!(!handler.handle_debug_set_value("2 int 5"));
        assert!(handler.has_sent_error());

        let mut handler = self::handler();
        handler.gm_mut().unwrap().selection = Some(ObjectGuid::creature(100, 77));
        assert!(!handler.handle_debug_get_value("5"));
        assert_eq!(handler.take_messages(), vec![LANG_SELECT_CHAR_OR_CREATURE.to_string()]);
    }

    #[test]
    fn test_item_values() {
        let mut handler = handler();
        assert!(handler.handle_debug_set_item_value(&format!("42 {} int 35", ITEM_FIELD_DURABILITY)));
        assert!(handler.handle_debug_mod_item_value(&format!("42 {} int -5", ITEM_FIELD_DURABILITY)));
        let item = handler.gm().unwrap().inventory.item_by_counter(42).unwrap();
        assert_eq!(item.durability().0, 30);

        assert!(handler.handle_debug_get_item_value(&format!("42 {}", ITEM_FIELD_DURABILITY)));
        assert!(handler.messages().last().unwrap().ends_with(" is: 30"));

        // unknown item
        assert!(!handler.handle_debug_get_item_value("43 5"));
    }

    #[test]
    fn test_bad_format_token() {
        let mut handler = handler();
        assert!(!handler.handle_debug_get_value(&format!("{} octal", UNIT_FIELD_LEVEL)));
        assert!(handler.has_sent_error());
    }

    #[test]
    fn test_byte_fields() {
        let mut handler = handler();
        // needs a creature target
        assert!(!handler.handle_debug_byte_fields("1 0 8"));

        let wolf = ObjectGuid::creature(100, 1);
        handler.gm_mut().unwrap().selection = Some(wolf);
        assert!(handler.handle_debug_byte_fields("1 2 8"));
        let bytes = |handler: &ChatHandler| {
            handler
                .world()
                .creature(wolf)
                .unwrap()
                .values()
                .get_byte(UNIT_FIELD_BYTES_1, 2)
        };
        assert_eq!(bytes(&handler), 8);
        assert!(handler.handle_debug_byte_fields("-1 2 8"));
        assert_eq!(bytes(&handler), 0);
        // other field numbers are accepted and ignored
        assert!(handler.handle_debug_byte_fields("5 2 8"));
        assert!(!handler.handle_debug_byte_fields("1 4 8"));
    }

    #[test]
    fn test_aura_state() {
        let mut handler = handler();
        assert!(handler.handle_debug_set_aura_state("3"));
        assert!(handler.handle_debug_set_aura_state("5"));
        let aura = |handler: &ChatHandler| handler.gm().unwrap().values().get_u32(UNIT_FIELD_AURASTATE);
        assert_eq!(aura(&handler), 0b10100);

        assert!(handler.handle_debug_set_aura_state("-3"));
        assert_eq!(aura(&handler), 0b10000);
        assert!(handler.handle_debug_set_aura_state("0"));
        assert_eq!(aura(&handler), 0);
        assert!(!handler.handle_debug_set_aura_state("x"));
    }
}
