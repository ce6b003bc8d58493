/// World server debug command library.
///
/// Everything a GM reaches through `.debug ...` chat lines lives here, so the
/// console binary and the integration tests drive the same code path through
/// [`chat::ChatHandler::execute`].

/// Argument extraction for chat commands.
///
/// Provides [`args::Args`] (a cursor over the argument text) plus the
/// [`args::is_abbrev`] and [`args::atoi`] helpers the command parsers share.
pub mod args;

/// The chat handler: owns the world, collects system messages and resolves
/// the GM's selection.
pub mod chat;

/// The `.debug` command table and every handler in it.
pub mod commands;

/// Environment-driven settings for logging, the opcode script and loot rolls.
pub mod config;

/// Typed read, write and modify access to the update fields of an object.
///
/// Backs `getvalue`, `setvalue`, `modvalue` and their item variants.
pub mod field_access;

/// Consistency checks over a player's inventory and its save queue.
pub mod inventory_check;

/// Text-described packets for `.debug send opcode`.
pub mod opcode_script;

/// Little-endian packet buffer and the packet builders the commands send.
pub mod packet;

/// Battleground, map, loot, instance script and client data collaborators.
pub mod services;

/// Players, creatures and the packets queued on each session.
pub mod world;
