//! GM chat handler: owns the world the commands act on and collects the
//! system messages a command produces for the GM.

use crate::args::{is_abbrev, Args};
use crate::commands::{self, DEBUG_COMMAND_NAME};
use crate::config::DebugConfig;
use crate::packet::WorldPacket;
use crate::services::DebugServices;
use crate::world::World;
use world_core::types::{AccountSecurity, Creature, ObjectGuid, Player, Unit, ValueSlots};

pub const LANG_SELECT_CHAR_OR_CREATURE: &str = "Please select a character or creature.";
pub const LANG_NO_CHAR_SELECTED: &str = "No character selected.";
pub const LANG_YOURS_SECURITY_IS_LOW: &str = "Your security level is too low for this.";
pub const LANG_NO_SUCH_COMMAND: &str = "There is no such command.";

pub struct ChatHandler {
    world: World,
    services: DebugServices,
    config: DebugConfig,
    /// Player whose chat line is being handled.
    gm: ObjectGuid,
    messages: Vec<String>,
    sent_error: bool,
}

impl ChatHandler {
    pub fn new(world: World, services: DebugServices, config: DebugConfig, gm: ObjectGuid) -> Self {
        ChatHandler {
            world,
            services,
            config,
            gm,
            messages: Vec::new(),
            sent_error: false,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn services(&self) -> &DebugServices {
        &self.services
    }

    pub fn services_mut(&mut self) -> &mut DebugServices {
        &mut self.services
    }

    pub fn config(&self) -> &DebugConfig {
        &self.config
    }

    pub fn gm_guid(&self) -> ObjectGuid {
        self.gm
    }

    /// Handles the next lines as player `gm`.
    pub fn set_gm(&mut self, gm: ObjectGuid) {
        self.gm = gm;
    }

    pub(crate) fn gm(&self) -> Option<&Player> {
        self.world.player(self.gm)
    }

    pub(crate) fn gm_mut(&mut self) -> Option<&mut Player> {
        self.world.player_mut(self.gm)
    }

    /// Queues a packet on the GM's own session.
    pub fn send_packet_to_gm(&mut self, packet: WorldPacket) {
        self.world.send_packet(self.gm, packet);
    }

    pub fn security(&self) -> AccountSecurity {
        self.gm()
            .map_or(AccountSecurity::Player, |player| player.security)
    }

    pub fn send_sys_message(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn send_sys_lines(&mut self, lines: impl IntoIterator<Item = String>) {
        self.messages.extend(lines);
    }

    /// Marks that the running command already explained its failure, so no
    /// usage line is added.
    pub fn set_sent_error(&mut self) {
        self.sent_error = true;
    }

    pub fn has_sent_error(&self) -> bool {
        self.sent_error
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn take_messages(&mut self) -> Vec<String> {
        std::mem::take(&mut self.messages)
    }

    /// Raw selection of the GM, `None` when nothing is selected.
    pub(crate) fn selection(&self) -> Option<ObjectGuid> {
        self.gm()
            .and_then(|player| player.selection)
            .filter(|guid| !guid.is_empty())
    }

    /// Selected unit, the GM itself when nothing is selected, `None` when
    /// the selection no longer exists.
    pub fn selected_unit_guid(&self) -> Option<ObjectGuid> {
        match self.selection() {
            None => Some(self.gm),
            Some(guid) => self.world.unit(guid).map(|_| guid),
        }
    }

    /// Selected player, the GM itself when nothing is selected.
    pub fn selected_player_guid(&self) -> Option<ObjectGuid> {
        match self.selection() {
            None => Some(self.gm),
            Some(guid) => self.world.player(guid).map(|_| guid),
        }
    }

    /// Selected creature or pet. Never falls back to the GM.
    pub fn selected_creature_guid(&self) -> Option<ObjectGuid> {
        self.selection()
            .filter(|guid| guid.is_creature_or_pet())
            .filter(|guid| self.world.creature(*guid).is_some())
    }

    pub fn selected_unit(&self) -> Option<&Unit> {
        self.selected_unit_guid().and_then(|guid| self.world.unit(guid))
    }

    pub fn selected_unit_mut(&mut self) -> Option<&mut Unit> {
        let guid = self.selected_unit_guid()?;
        self.world.unit_mut(guid)
    }

    pub fn selected_creature_mut(&mut self) -> Option<&mut Creature> {
        let guid = self.selected_creature_guid()?;
        self.world.creature_mut(guid)
    }

    /// True (after telling the GM) when `target` outranks the GM.
    pub fn has_lower_security(&mut self, target: ObjectGuid) -> bool {
        if target == self.gm {
            return false;
        }
        let Some(target_security) = self.world.player(target).map(|player| player.security) else {
            return false;
        };
        if target_security > self.security() {
            self.send_sys_message(LANG_YOURS_SECURITY_IS_LOW);
            self.set_sent_error();
            return true;
        }
        false
    }

    /// Name of a unit the way chat lines show it.
    pub fn unit_name(&self, guid: ObjectGuid) -> String {
        self.world
            .unit(guid)
            .map_or_else(|| guid.to_string(), |unit| unit.name.clone())
    }

    /// Runs one chat line such as `.debug getvalue 10 hex`. Returns whether
    /// the command accepted its arguments.
    pub fn execute(&mut self, line: &str) -> bool {
        self.sent_error = false;

        let mut args = Args::new(line.trim().trim_start_matches('.'));
        match args.literal() {
            Some(word) if is_abbrev(word, DEBUG_COMMAND_NAME) => {}
            _ => {
                self.send_sys_message(LANG_NO_SUCH_COMMAND);
                return false;
            }
        }

        let resolved = match commands::resolve(args.rest(), self.security()) {
            Ok(resolved) => resolved,
            Err(err) => {
                log::debug!("rejected '{}': {}", line.trim(), err);
                self.send_sys_message(err.to_string());
                return false;
            }
        };

        log::info!(
            "{} ran .{} {} {}",
            self.gm()
                .map_or_else(|| self.gm.to_string(), |player| player.guid_str()),
            DEBUG_COMMAND_NAME,
            resolved.path,
            resolved.args
        );

        let accepted = (resolved.command.handler)(self, resolved.args);
        if !accepted && !self.sent_error {
            let usage = format!(
                "Syntax: .{} {} {}",
                DEBUG_COMMAND_NAME, resolved.path, resolved.command.usage
            );
            self.send_sys_message(usage.trim_end());
        }
        accepted
    }
}
