//! The `.debug` command table and its resolution.
//!
//! Handlers take the raw argument text and return whether it was well
//! formed. A `false` without an error message of their own makes the chat
//! handler print the usage line of the command.

use std::fmt;
use thiserror::Error;

use crate::args::{is_abbrev, Args};
use crate::chat::ChatHandler;
use world_core::types::AccountSecurity;
use world_core::types::AccountSecurity::{Administrator, GameMaster, Moderator};

mod items;
mod packets;
mod play;
mod values;
mod world;

pub const DEBUG_COMMAND_NAME: &str = "debug";

pub type Handler = fn(&mut ChatHandler, &str) -> bool;

pub struct DebugCommand {
    pub name: &'static str,
    pub security: AccountSecurity,
    pub handler: Handler,
    pub usage: &'static str,
    /// Non-empty for groups such as `play` and `send`.
    pub subcommands: &'static [DebugCommand],
}

impl fmt::Debug for DebugCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugCommand")
            .field("name", &self.name)
            .field("security", &self.security)
            .field("subcommands", &self.subcommands.len())
            .finish()
    }
}

const fn command(name: &'static str, security: AccountSecurity, handler: Handler, usage: &'static str) -> DebugCommand {
    DebugCommand {
        name,
        security,
        handler,
        usage,
        subcommands: &[],
    }
}

const fn group(name: &'static str, subcommands: &'static [DebugCommand]) -> DebugCommand {
    DebugCommand {
        name,
        security: AccountSecurity::Moderator,
        handler: group_without_subcommand,
        usage: "",
        subcommands,
    }
}

fn group_without_subcommand(_handler: &mut ChatHandler, _args: &str) -> bool {
    false
}

static PLAY_COMMANDS: [DebugCommand; 5] = [
    command("cinematic", Moderator, ChatHandler::handle_debug_play_cinematic, "<cinematic id>"),
    command("movie", Moderator, ChatHandler::handle_debug_play_movie, "<movie id>"),
    command("sound", Moderator, ChatHandler::handle_debug_play_sound, "<sound id>"),
    command("music", Moderator, ChatHandler::handle_debug_play_music, "<sound id>"),
    command("petdismiss", Moderator, ChatHandler::handle_debug_pet_dismiss_sound, "<sound id>"),
];

static SEND_COMMANDS: [DebugCommand; 14] = [
    command("buyerror", Administrator, ChatHandler::handle_debug_send_buy_error, "<error>"),
    command("channelnotify", Administrator, ChatHandler::handle_debug_send_channel_notify, "<code>"),
    command("chatmessage", Administrator, ChatHandler::handle_debug_send_chat_message, "<type>"),
    command("equiperror", Administrator, ChatHandler::handle_debug_send_equip_error, "<error>"),
    command("largepacket", Administrator, ChatHandler::handle_debug_send_large_packet, ""),
    command("opcode", Administrator, ChatHandler::handle_debug_send_opcode, ""),
    command("poi", Administrator, ChatHandler::handle_debug_send_poi, "<icon> <flags>"),
    command("qpartymsg", Administrator, ChatHandler::handle_debug_send_quest_party_msg, "<message>"),
    command("qinvalidmsg", Administrator, ChatHandler::handle_debug_send_quest_invalid_msg, "<message>"),
    command("questfailed", Administrator, ChatHandler::handle_debug_send_quest_failed, "<quest id> <reason>"),
    command("sellerror", Administrator, ChatHandler::handle_debug_send_sell_error, "<error>"),
    command("setphaseshift", Administrator, ChatHandler::handle_debug_send_set_phase_shift, "<phase>"),
    command("spellfail", Administrator, ChatHandler::handle_debug_send_spell_fail, "<reason> [arg1] [arg2]"),
    command("worldstate", Administrator, ChatHandler::handle_debug_send_world_state, "<state> <value>"),
];

pub static DEBUG_COMMANDS: [DebugCommand; 31] = [
    command("anim", GameMaster, ChatHandler::handle_debug_anim, "<emote>"),
    command("arena", Administrator, ChatHandler::handle_debug_arena, ""),
    command("bg", Administrator, ChatHandler::handle_debug_battleground, ""),
    command("bgstart", Administrator, ChatHandler::handle_debug_battleground_start, ""),
    command("bytefields", Administrator, ChatHandler::handle_debug_byte_fields, "<field> <byte> <value>"),
    command("getitemvalue", Administrator, ChatHandler::handle_debug_get_item_value, "<item guid> <field> [int|hex|bit|float]"),
    command("getvalue", Administrator, ChatHandler::handle_debug_get_value, "<field> [int|hex|bit|float]"),
    command("grids", Administrator, ChatHandler::handle_debug_grids, ""),
    command("haveatclient", Administrator, ChatHandler::handle_debug_have_at_client, ""),
    command("isvisible", Administrator, ChatHandler::handle_debug_is_visible, ""),
    command("itemstate", Administrator, ChatHandler::handle_debug_item_state, "[unchanged|changed|new|removed|queue|all]"),
    command("lootdropstats", Administrator, ChatHandler::handle_debug_loot_drop_stats, "lootId [lootTemplate amountOfCheck]"),
    command("lootrecipient", GameMaster, ChatHandler::handle_debug_loot_recipient, ""),
    command("maps", Administrator, ChatHandler::handle_debug_maps, ""),
    command("moditemvalue", Administrator, ChatHandler::handle_debug_mod_item_value, "<item guid> <field> <int|float|\\|=|&=|&=~> <value>"),
    command("modvalue", Administrator, ChatHandler::handle_debug_mod_value, "<field> <int|float|\\|=|&=|&=~> <value>"),
    command("moveflags", Administrator, ChatHandler::handle_debug_moveflags, ""),
    command("overflow", Administrator, ChatHandler::handle_debug_overflow, ""),
    group("play", &PLAY_COMMANDS),
    command("sd2", Administrator, ChatHandler::handle_debug_sd2_script, "<script command>"),
    command("sd2help", Administrator, ChatHandler::handle_debug_sd2_help, ""),
    group("send", &SEND_COMMANDS),
    command("setaurastate", Administrator, ChatHandler::handle_debug_set_aura_state, "<state>"),
    command("setitemvalue", Administrator, ChatHandler::handle_debug_set_item_value, "<item guid> <field> [int|hex|bit|float] <value>"),
    command("setvalue", Administrator, ChatHandler::handle_debug_set_value, "<field> [int|hex|bit|float] <value>"),
    command("spellmods", Administrator, ChatHandler::handle_debug_spell_mods, "<flat|pct> <spell family bit> <op> <value>"),
    command("spellvisual", Administrator, ChatHandler::handle_debug_spell_visual, "<visual id>"),
    command("taxi", Administrator, ChatHandler::handle_debug_taxi, ""),
    command("tempspawns", Administrator, ChatHandler::handle_debug_temporary_spawns, ""),
    command("updateworldstate", Administrator, ChatHandler::handle_debug_update_world_state, "<state> <value>"),
    command("waypoint", Administrator, ChatHandler::handle_debug_waypoint, "[path id]"),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("There is no such command.")]
    UnknownCommand(String),
    #[error("Command '{word}' is ambiguous: {}.", .candidates.join(", "))]
    AmbiguousCommand {
        word: String,
        candidates: Vec<&'static str>,
    },
    #[error("Command .debug {group} needs a subcommand: {}.", .subcommands.join(", "))]
    MissingSubcommand {
        group: &'static str,
        subcommands: Vec<&'static str>,
    },
}

/// A command picked from the table together with its arguments.
#[derive(Debug)]
pub struct ResolvedCommand<'a> {
    pub command: &'static DebugCommand,
    /// Full names of the words that selected it, e.g. `play sound`.
    pub path: String,
    pub args: &'a str,
}

fn visible(table: &'static [DebugCommand], security: AccountSecurity) -> impl Iterator<Item = &'static DebugCommand> {
    table.iter().filter(move |command| command.security <= security)
}

/// Exact name first, then the only command the word abbreviates.
fn find(
    table: &'static [DebugCommand],
    word: &str,
    security: AccountSecurity,
) -> Result<&'static DebugCommand, DispatchError> {
    if let Some(command) = visible(table, security).find(|command| command.name.eq_ignore_ascii_case(word)) {
        return Ok(command);
    }

    let candidates: Vec<&'static DebugCommand> = visible(table, security)
        .filter(|command| is_abbrev(word, command.name))
        .collect();
    match candidates.as_slice() {
        [] => Err(DispatchError::UnknownCommand(word.to_string())),
        [command] => Ok(*command),
        _ => Err(DispatchError::AmbiguousCommand {
            word: word.to_string(),
            candidates: candidates.iter().map(|command| command.name).collect(),
        }),
    }
}

/// Resolves the text after `.debug` against the command table.
pub fn resolve(text: &str, security: AccountSecurity) -> Result<ResolvedCommand<'_>, DispatchError> {
    let mut args = Args::new(text);
    let word = args
        .literal()
        .ok_or_else(|| DispatchError::UnknownCommand(String::new()))?;
    let mut command = find(&DEBUG_COMMANDS, word, security)?;
    let mut path = command.name.to_string();

    if !command.subcommands.is_empty() {
        let group = command;
        let Some(word) = args.literal() else {
            return Err(DispatchError::MissingSubcommand {
                group: group.name,
                subcommands: visible(group.subcommands, security)
                    .map(|command| command.name)
                    .collect(),
            });
        };
        command = find(group.subcommands, word, security)?;
        path = format!("{} {}", group.name, command.name);
    }

    Ok(ResolvedCommand {
        command,
        path,
        args: args.rest(),
    })
}
