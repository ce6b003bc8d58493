use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Context;

use world_core::constants::{
    INVENTORY_SLOT_BAG_0, INVENTORY_SLOT_BAG_START, INVENTORY_SLOT_ITEM_START, UNIT_FIELD_FLAGS,
};
use world_core::types::{
    AccountSecurity, Creature, Item, LootRecipient, ObjectGuid, Player, Position, ValueSlots,
};
use world_server::chat::ChatHandler;
use world_server::config::DebugConfig;
use world_server::services::{
    CameraWaypoint, DebugServices, EncounterScript, InMemoryBattlegrounds, InMemoryClientData,
    InMemoryInstanceScripts, InMemoryMapStats, LootEntry, LootSimulator, LootStore,
};
use world_server::world::World;

const QUIT_COMMAND: &str = "quit";
const LOOT_SEED: u64 = 0x5EED;
const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(100);

fn main() -> anyhow::Result<()> {
    let (config, warnings) = DebugConfig::from_env();
    world_core::initialize_logger(config.log_level, config.log_file.as_deref())
        .context("failed to initialize logging")?;
    for warning in &warnings {
        log::warn!("{}", warning);
    }

    log::info!("Starting world debug console");
    log::debug!("{:?}", config);

    let quit_flag = Arc::new(AtomicBool::new(false));
    let quit_flag_handler = quit_flag.clone();
    ctrlc::set_handler(move || {
        if quit_flag_handler.swap(true, Ordering::SeqCst) {
            log::info!("Already shutting down");
        } else {
            log::info!("Got signal to terminate. Shutdown initiated...");
        }
    })
    .context("failed to install Ctrl-C handler")?;

    let (world, sessions) = build_sandbox_world().context("failed to build sandbox world")?;
    let gm = sessions[0];
    let mut handler = ChatHandler::new(world, build_sandbox_services(), config, gm);

    // stdin blocks, so it is read on its own thread and the main loop keeps
    // watching the quit flag
    let (line_tx, line_rx) = mpsc::channel();
    thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                if line_tx.send(line).is_err() {
                    break;
                }
            }
        })
        .context("failed to spawn stdin reader")?;

    let mut stdout = io::stdout();
    writeln!(stdout, "Type .debug commands, '{}' to exit.", QUIT_COMMAND)?;

    while let Some(line) = next_line(&line_rx, &quit_flag, INPUT_POLL_INTERVAL)? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case(QUIT_COMMAND) {
            break;
        }

        let accepted = handler.execute(line);
        for message in handler.take_messages() {
            writeln!(stdout, "{}", message)?;
        }
        for guid in &sessions {
            for packet in handler.world_mut().take_packets(*guid) {
                writeln!(
                    stdout,
                    "  -> {}: {} ({} bytes)",
                    guid,
                    packet.opcode_name(),
                    packet.len()
                )?;
                log::trace!("{}", packet.hexlike());
            }
        }
        if !accepted {
            log::debug!("command rejected: {}", line);
        }
        stdout.flush()?;
    }

    log::info!("World debug console stopped");
    Ok(())
}

/// Waits for the next input line. `None` once the quit flag is set or the
/// input is closed.
fn next_line(
    lines: &Receiver<io::Result<String>>,
    quit_flag: &AtomicBool,
    poll_interval: Duration,
) -> anyhow::Result<Option<String>> {
    loop {
        if quit_flag.load(Ordering::SeqCst) {
            return Ok(None);
        }
        match lines.recv_timeout(poll_interval) {
            Ok(line) => return line.map(Some).context("failed to read from stdin"),
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => return Ok(None),
        }
    }
}

/// A GM with a bag and a few items, a second player and a creature next to
/// them. Returns the world and the players with sessions, GM first.
fn build_sandbox_world() -> anyhow::Result<(World, Vec<ObjectGuid>)> {
    let mut world = World::new();

    let mut gm = Player::new(1, "Admin", AccountSecurity::Administrator);
    let owner = gm.guid();
    gm.inventory
        .load_item(INVENTORY_SLOT_BAG_0, INVENTORY_SLOT_BAG_START, Item::new_bag(10, 4496, owner, 6))?;
    gm.inventory
        .load_item(INVENTORY_SLOT_BAG_START, 0, Item::new(11, 2589, owner))?;
    gm.inventory
        .store_item(INVENTORY_SLOT_BAG_0, INVENTORY_SLOT_ITEM_START, Item::new(12, 6948, owner))?;
    gm.battleground_id = Some(1);
    let gm = world.add_player(gm);

    let mut tester = Player::new(2, "Tester", AccountSecurity::Player);
    tester.unit.position = Position::new(0, 5.0, 5.0, 0.0, 0.0);
    let tester = world.add_player(tester);

    let mut wolf = Creature::new(299, 1, "Young Wolf", Position::new(0, 10.0, 0.0, 0.0, 0.0));
    wolf.unit.values_mut().set_u32(UNIT_FIELD_FLAGS, 0x8);
    wolf.loot_recipient = LootRecipient::Player {
        guid: tester,
        group_id: 0,
    };
    world.add_creature(wolf);

    Ok((world, vec![gm, tester]))
}

fn build_sandbox_services() -> DebugServices {
    let mut battlegrounds = InMemoryBattlegrounds::default();
    battlegrounds.open(1, 120_000);

    let mut maps = InMemoryMapStats::default();
    for diff in [12, 18, 25] {
        maps.record_update(0, 0, diff);
    }
    maps.set_loaded_grids(0, 0, 4);

    let mut loot = LootSimulator::new(LOOT_SEED);
    loot.add_template(
        LootStore::Creature,
        299,
        vec![
            LootEntry { item_id: 750, chance: 80.0 },
            LootEntry { item_id: 2589, chance: 35.5 },
            LootEntry { item_id: 4496, chance: 1.2 },
        ],
    );

    let mut scripts = InMemoryInstanceScripts::default();
    scripts.attach(0, 0, Box::new(EncounterScript::new(&["Hogger", "Van Cleef"])));

    let mut client_data = InMemoryClientData::default();
    client_data.add_cinematic(41, 121);
    client_data.add_camera(
        121,
        vec![
            CameraWaypoint { timestamp_ms: 0, x: -8949.9, y: -132.5, z: 83.5, facing: 0.0 },
            CameraWaypoint { timestamp_ms: 4000, x: -8920.0, y: -120.0, z: 90.0, facing: 1.57 },
        ],
    );
    client_data.add_movie(2);
    for sound in [1204, 2847, 8173] {
        client_data.add_sound(sound);
    }

    DebugServices {
        battlegrounds: Box::new(battlegrounds),
        maps: Box::new(maps),
        loot: Box::new(loot),
        scripts: Box::new(scripts),
        client_data: Box::new(client_data),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POLL: Duration = Duration::from_millis(10);

    #[test]
    fn test_next_line_returns_input() {
        let (tx, rx) = mpsc::channel();
        let quit_flag = AtomicBool::new(false);
        tx.send(Ok(".debug taxi".to_string())).unwrap();
        assert_eq!(next_line(&rx, &quit_flag, POLL).unwrap(), Some(".debug taxi".to_string()));
    }

    #[test]
    fn test_next_line_stops_on_quit_flag_while_idle() {
        let (_tx, rx) = mpsc::channel::<io::Result<String>>();
        let quit_flag = Arc::new(AtomicBool::new(false));
        let setter = quit_flag.clone();
        let signal = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            setter.store(true, Ordering::SeqCst);
        });

        // the sender stays open, so only the flag can end the wait
        assert_eq!(next_line(&rx, &quit_flag, POLL).unwrap(), None);
        signal.join().unwrap();
    }

    #[test]
    fn test_next_line_stops_when_input_closes() {
        let (tx, rx) = mpsc::channel::<io::Result<String>>();
        drop(tx);
        assert_eq!(next_line(&rx, &AtomicBool::new(false), POLL).unwrap(), None);
    }

    #[test]
    fn test_next_line_reports_read_errors() {
        let (tx, rx) = mpsc::channel();
        tx.send(Err(io::Error::new(io::ErrorKind::InvalidData, "not utf-8"))).unwrap();
        assert!(next_line(&rx, &AtomicBool::new(false), POLL).is_err());
    }
}
