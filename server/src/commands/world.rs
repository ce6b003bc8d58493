//! Commands that inspect the GM's surroundings and the server collaborators:
//! movement, loot, battlegrounds, maps and instance scripts.

use crate::args::Args;
use crate::chat::{ChatHandler, LANG_SELECT_CHAR_OR_CREATURE};
use crate::services::LootStore;
use world_core::constants::{CONTINENT_MAP_IDS, MAX_WAYPOINT_PATH};
use world_core::string_operations::normalize_player_name;
use world_core::types::{LootRecipient, ValueSlots, PATH_FROM_EXTERNAL};

const LOOT_DROP_STATS_USAGE: &str = "Usage: .debug lootdropstats lootId [lootTemplate amountOfCheck]";
const NO_MAP_SCRIPT: &str = "Map script does not support chat commands.";
/// Twelve cuneiform and hieroglyph characters, all outside the BMP.
const OVERFLOW_NAME: &str =
    "\u{12325}\u{12463}\u{12469}\u{132CD}\u{132C8}\u{13261}\u{12325}\u{12463}\u{12469}\u{132CD}\u{132C8}\u{13261}";

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

impl ChatHandler {
    /// Map id and instance id the GM stands in.
    fn gm_map(&self) -> Option<(u32, u32)> {
        self.gm()
            .map(|player| (player.position().map_id, player.unit.instance_id))
    }

    pub fn handle_debug_moveflags(&mut self, _args: &str) -> bool {
        let Some(flags) = self.selected_unit().map(|unit| unit.movement_flags) else {
            return false;
        };
        self.send_sys_message(format!("Moveflags on target {}", flags));
        true
    }

    pub fn handle_debug_taxi(&mut self, _args: &str) -> bool {
        let Some(player) = self.gm_mut() else {
            return false;
        };
        let enabled = player.toggle_taxi_debug();
        self.send_sys_message(format!("Taxi node debug mode {}.", on_off(enabled)));
        true
    }

    /// Shows the selected creature's path, or starts it on `path id`.
    pub fn handle_debug_waypoint(&mut self, args: &str) -> bool {
        let Some(creature) = self.selected_creature_mut() else {
            return false;
        };
        match Args::new(args).u32().filter(|path| *path < MAX_WAYPOINT_PATH) {
            Some(path_id) => {
                creature.move_waypoint(path_id, PATH_FROM_EXTERNAL);
                log::debug!("{} moves on path {}", creature.guid_str(), path_id);
            }
            None => {
                let path_id = creature.path_id();
                self.send_sys_message(format!("Current target path ID: {}", path_id));
            }
        }
        true
    }

    pub fn handle_debug_loot_recipient(&mut self, _args: &str) -> bool {
        let Some(recipient) = self
            .selected_creature_guid()
            .and_then(|guid| self.world().creature(guid))
            .map(|creature| creature.loot_recipient)
        else {
            return false;
        };

        let message = match recipient {
            LootRecipient::None => "loot recipient: no loot recipient".to_string(),
            LootRecipient::Player { guid, group_id } => match self.world().player(guid) {
                Some(player) => format!(
                    "loot recipient: {} with raw data {} from group {}",
                    player.guid_str(),
                    guid,
                    group_id
                ),
                None => "loot recipient: offline ".to_string(),
            },
        };
        self.send_sys_message(message);
        true
    }

    /// `lootdropstats [lootId [store [amount]]]`. With a creature selected
    /// its own loot template is rolled and the only argument is the amount.
    pub fn handle_debug_loot_drop_stats(&mut self, args: &str) -> bool {
        let mut args = Args::new(args);
        let mut rolls = self.config().loot_rolls;

        let selected_loot = self
            .selected_creature_guid()
            .and_then(|guid| self.world().creature(guid))
            .map(|creature| creature.loot_id);

        let (loot_id, store) = match selected_loot {
            Some(loot_id) => {
                if let Some(amount) = args.u32() {
                    rolls = amount;
                }
                (loot_id, LootStore::Creature)
            }
            None => {
                let Some(loot_id) = args.u32() else {
                    self.send_sys_message(LOOT_DROP_STATS_USAGE);
                    self.set_sent_error();
                    return false;
                };
                let store_token = args.literal();
                if !args.is_empty() {
                    match args.u32() {
                        Some(amount) => rolls = amount,
                        None => {
                            self.send_sys_message(LOOT_DROP_STATS_USAGE);
                            self.set_sent_error();
                            return false;
                        }
                    }
                }

                let store = match store_token {
                    None => LootStore::Creature,
                    Some(token) => match LootStore::parse(token) {
                        Some(store) => store,
                        None => {
                            self.send_sys_message("Provided loot template is not valid should be:");
                            self.send_sys_lines(LootStore::ALL.iter().map(|store| store.name().to_string()));
                            return true;
                        }
                    },
                };
                (loot_id, store)
            }
        };

        match self.services_mut().loot.drop_stats(rolls, loot_id, store) {
            Ok(lines) => self.send_sys_lines(lines),
            Err(err) => {
                log::debug!("lootdropstats: {}", err);
                self.send_sys_message(err.to_string());
            }
        }
        true
    }

    pub fn handle_debug_battleground(&mut self, _args: &str) -> bool {
        let testing = self.services_mut().battlegrounds.toggle_testing();
        self.send_sys_message(if testing {
            "Battlegrounds are set to 1v0 for debugging."
        } else {
            "Battlegrounds are set to normal playercount."
        });
        true
    }

    pub fn handle_debug_arena(&mut self, _args: &str) -> bool {
        let testing = self.services_mut().battlegrounds.toggle_arena_testing();
        self.send_sys_message(if testing {
            "Arenas are set to 1v1 for debugging. So, don't join as group."
        } else {
            "Arenas are set to normal playercount."
        });
        true
    }

    /// Skips the start countdown of the GM's battleground.
    pub fn handle_debug_battleground_start(&mut self, _args: &str) -> bool {
        let Some(battleground_id) = self.gm().and_then(|player| player.battleground_id) else {
            return false;
        };
        if !self.services_mut().battlegrounds.start_now(battleground_id) {
            return false;
        }
        self.send_sys_message(format!("Battleground {} starts now.", battleground_id));
        true
    }

    pub fn handle_debug_maps(&mut self, _args: &str) -> bool {
        let mut lines = vec!["Update time statistics:".to_string()];
        for map_id in CONTINENT_MAP_IDS {
            let times = self.services().maps.update_times(map_id, 0);
            lines.push(format!(
                "Map[{}] >> Min: {}ms, Max: {}ms, Avg: {}ms",
                map_id, times.min, times.max, times.avg
            ));
        }

        if let Some((map_id, instance_id)) = self.gm_map() {
            if !CONTINENT_MAP_IDS.contains(&map_id) {
                let times = self.services().maps.update_times(map_id, instance_id);
                lines.push("Instance update time statistics:".to_string());
                lines.push(format!(
                    "Map[{}] (Instance: {}) >> Min: {}ms, Max: {}ms, Avg: {}ms",
                    map_id, instance_id, times.min, times.max, times.avg
                ));
            }
        }

        self.send_sys_lines(lines);
        true
    }

    pub fn handle_debug_temporary_spawns(&mut self, _args: &str) -> bool {
        let Some((map_id, instance_id)) = self.gm_map() else {
            return false;
        };
        let spawns = self.world().temporary_spawns(map_id, instance_id);

        let entry_line = |(entry, count): (&u32, &u32)| format!("Entry: {}, Count: {} ", entry, count);
        let mut lines = vec!["Current temporary creatures in player map.".to_string()];
        lines.extend(spawns.creatures.iter().map(entry_line));
        lines.push("Current temporary pets in player map.".to_string());
        lines.extend(spawns.pets.iter().map(entry_line));
        self.send_sys_lines(lines);
        true
    }

    pub fn handle_debug_grids(&mut self, _args: &str) -> bool {
        let Some((map_id, instance_id)) = self.gm_map() else {
            return false;
        };
        let grids = self.services().maps.loaded_grids(map_id, instance_id);
        self.send_sys_message(format!("There are currently {} loaded grids.", grids));
        true
    }

    pub fn handle_debug_sd2_help(&mut self, _args: &str) -> bool {
        let lines = self.gm_map().and_then(|(map_id, instance_id)| {
            self.services_mut()
                .scripts
                .script_mut(map_id, instance_id)
                .map(|script| script.show_chat_commands())
        });
        match lines {
            Some(lines) => self.send_sys_lines(lines),
            None => self.send_sys_message(NO_MAP_SCRIPT),
        }
        true
    }

    pub fn handle_debug_sd2_script(&mut self, args: &str) -> bool {
        let lines = self.gm_map().and_then(|(map_id, instance_id)| {
            self.services_mut()
                .scripts
                .script_mut(map_id, instance_id)
                .map(|script| script.execute_chat_command(args))
        });
        match lines {
            Some(lines) => self.send_sys_lines(lines),
            None => self.send_sys_message(NO_MAP_SCRIPT),
        }
        true
    }

    pub fn handle_debug_have_at_client(&mut self, _args: &str) -> bool {
        let Some(target) = self.selected_unit_guid() else {
            self.send_sys_message(LANG_SELECT_CHAR_OR_CREATURE);
            return false;
        };
        let at_client = self
            .gm()
            .is_some_and(|player| player.have_at_client(target));
        let name = self.unit_name(target);
        self.send_sys_message(if at_client {
            format!("Target {} is at your client.", name)
        } else {
            format!("Target {} is not at your client.", name)
        });
        true
    }

    pub fn handle_debug_is_visible(&mut self, _args: &str) -> bool {
        let Some(target) = self.selected_unit_guid() else {
            self.send_sys_message(LANG_SELECT_CHAR_OR_CREATURE);
            return false;
        };
        let visible = match (self.gm(), self.world().unit(target)) {
            (Some(player), Some(unit)) => {
                unit.is_visible_for(player.position(), player.have_at_client(target))
            }
            _ => false,
        };
        let name = self.unit_name(target);
        self.send_sys_message(if visible {
            format!("Target {} should be visible at client.", name)
        } else {
            format!("Target {} should not be visible at client.", name)
        });
        true
    }

    /// Normalises a name whose characters all need surrogate pairs in UTF-16.
    pub fn handle_debug_overflow(&mut self, _args: &str) -> bool {
        match normalize_player_name(OVERFLOW_NAME) {
            Some(name) => log::debug!("overflow name normalised to {} ({} chars)", name, name.chars().count()),
            None => log::debug!("overflow name rejected"),
        }
        true
    }
}
