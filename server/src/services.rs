//! Engine subsystems the debug commands consume.
//!
//! Each subsystem is a trait so the command layer can run against the real
//! managers or against the in-memory versions below (sandbox console, tests).

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use thiserror::Error;

// =============================================================================
// Battlegrounds
// =============================================================================

pub trait BattlegroundControl {
    /// Flips battleground testing mode and returns the new state.
    fn toggle_testing(&mut self) -> bool;
    /// Flips arena testing mode and returns the new state.
    fn toggle_arena_testing(&mut self) -> bool;
    /// Drops the start delay of a running battleground. False when the
    /// battleground is unknown.
    fn start_now(&mut self, battleground_id: u32) -> bool;
}

#[derive(Debug, Default)]
pub struct InMemoryBattlegrounds {
    testing: bool,
    arena_testing: bool,
    /// Remaining start delay per running battleground, in milliseconds.
    start_delays: HashMap<u32, i64>,
}

impl InMemoryBattlegrounds {
    pub fn open(&mut self, battleground_id: u32, start_delay_ms: i64) {
        self.start_delays.insert(battleground_id, start_delay_ms);
    }

    pub fn start_delay(&self, battleground_id: u32) -> Option<i64> {
        self.start_delays.get(&battleground_id).copied()
    }
}

impl BattlegroundControl for InMemoryBattlegrounds {
    fn toggle_testing(&mut self) -> bool {
        self.testing = !self.testing;
        self.testing
    }

    fn toggle_arena_testing(&mut self) -> bool {
        self.arena_testing = !self.arena_testing;
        self.arena_testing
    }

    fn start_now(&mut self, battleground_id: u32) -> bool {
        match self.start_delays.get_mut(&battleground_id) {
            Some(delay) => {
                *delay = -1;
                true
            }
            None => false,
        }
    }
}

// =============================================================================
// Maps
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateTimes {
    pub min: u32,
    pub max: u32,
    pub avg: u32,
}

pub trait MapStats {
    /// Update time statistics of a map instance. Unknown maps report zeros.
    fn update_times(&self, map_id: u32, instance_id: u32) -> UpdateTimes;
    fn loaded_grids(&self, map_id: u32, instance_id: u32) -> u32;
}

#[derive(Debug, Clone, Default)]
struct MapRecord {
    min: u32,
    max: u32,
    total: u64,
    samples: u64,
    grids: u32,
}

#[derive(Debug, Default)]
pub struct InMemoryMapStats {
    maps: HashMap<(u32, u32), MapRecord>,
}

impl InMemoryMapStats {
    /// Records the duration of one update tick.
    pub fn record_update(&mut self, map_id: u32, instance_id: u32, diff_ms: u32) {
        let record = self.maps.entry((map_id, instance_id)).or_default();
        if record.samples == 0 || diff_ms < record.min {
            record.min = diff_ms;
        }
        record.max = record.max.max(diff_ms);
        record.total += u64::from(diff_ms);
        record.samples += 1;
    }

    pub fn set_loaded_grids(&mut self, map_id: u32, instance_id: u32, grids: u32) {
        self.maps.entry((map_id, instance_id)).or_default().grids = grids;
    }
}

impl MapStats for InMemoryMapStats {
    fn update_times(&self, map_id: u32, instance_id: u32) -> UpdateTimes {
        match self.maps.get(&(map_id, instance_id)) {
            Some(record) if record.samples > 0 => UpdateTimes {
                min: record.min,
                max: record.max,
                avg: (record.total / record.samples) as u32,
            },
            _ => UpdateTimes::default(),
        }
    }

    fn loaded_grids(&self, map_id: u32, instance_id: u32) -> u32 {
        self.maps
            .get(&(map_id, instance_id))
            .map_or(0, |record| record.grids)
    }
}

// =============================================================================
// Loot
// =============================================================================

/// Loot template families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LootStore {
    Creature,
    GameObject,
    Fishing,
    Item,
    Pickpocketing,
    Skinning,
    Disenchanting,
    Prospecting,
    Mail,
    Milling,
    Spell,
}

impl LootStore {
    pub const ALL: [LootStore; 11] = [
        LootStore::Creature,
        LootStore::GameObject,
        LootStore::Fishing,
        LootStore::Item,
        LootStore::Pickpocketing,
        LootStore::Skinning,
        LootStore::Disenchanting,
        LootStore::Prospecting,
        LootStore::Mail,
        LootStore::Milling,
        LootStore::Spell,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LootStore::Creature => "creature",
            LootStore::GameObject => "gameobject",
            LootStore::Fishing => "fishing",
            LootStore::Item => "item",
            LootStore::Pickpocketing => "pickpocketing",
            LootStore::Skinning => "skinning",
            LootStore::Disenchanting => "disenchanting",
            LootStore::Prospecting => "prospecting",
            LootStore::Mail => "mail",
            LootStore::Milling => "milling",
            LootStore::Spell => "spell",
        }
    }

    fn alias(self) -> &'static str {
        match self {
            LootStore::Creature => "c",
            LootStore::GameObject => "gob",
            LootStore::Fishing => "f",
            LootStore::Item => "i",
            LootStore::Pickpocketing => "pick",
            LootStore::Skinning => "skin",
            LootStore::Disenchanting => "dis",
            LootStore::Prospecting => "prosp",
            LootStore::Mail => "m",
            LootStore::Milling => "mil",
            LootStore::Spell => "s",
        }
    }

    /// Full name or short alias, exact match only.
    pub fn parse(token: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|store| token == store.name() || token == store.alias())
    }
}

impl fmt::Display for LootStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LootError {
    #[error("Loot template {id} does not exist in the {store} store.")]
    UnknownTemplate { store: LootStore, id: u32 },
    #[error("Loot template {id} of the {store} store is empty.")]
    EmptyTemplate { store: LootStore, id: u32 },
}

/// One possible drop of a loot template.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LootEntry {
    pub item_id: u32,
    /// Percent, 0..=100.
    pub chance: f32,
}

pub trait LootStatistics {
    /// Rolls the template `rolls` times and describes how often each entry dropped.
    fn drop_stats(&mut self, rolls: u32, loot_id: u32, store: LootStore) -> Result<Vec<String>, LootError>;
}

pub struct LootSimulator {
    templates: HashMap<(LootStore, u32), Vec<LootEntry>>,
    rng: StdRng,
}

impl LootSimulator {
    pub fn new(seed: u64) -> Self {
        LootSimulator {
            templates: HashMap::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn add_template(&mut self, store: LootStore, id: u32, entries: Vec<LootEntry>) {
        self.templates.insert((store, id), entries);
    }
}

impl LootStatistics for LootSimulator {
    fn drop_stats(&mut self, rolls: u32, loot_id: u32, store: LootStore) -> Result<Vec<String>, LootError> {
        let entries = self
            .templates
            .get(&(store, loot_id))
            .ok_or(LootError::UnknownTemplate { store, id: loot_id })?;
        if entries.is_empty() {
            return Err(LootError::EmptyTemplate { store, id: loot_id });
        }

        let mut drops: BTreeMap<u32, u32> = BTreeMap::new();
        for _ in 0..rolls {
            for entry in entries {
                if self.rng.gen_range(0.0f32..100.0) < entry.chance {
                    *drops.entry(entry.item_id).or_default() += 1;
                }
            }
        }

        let mut lines = vec![format!(
            "Drop statistics of {} loot template {} after {} rolls:",
            store, loot_id, rolls
        )];
        for entry in entries {
            let dropped = drops.get(&entry.item_id).copied().unwrap_or(0);
            let observed = if rolls == 0 {
                0.0
            } else {
                f64::from(dropped) * 100.0 / f64::from(rolls)
            };
            lines.push(format!(
                "Item {}: dropped {} times ({:.3}%, expected {:.3}%)",
                entry.item_id, dropped, observed, entry.chance
            ));
        }
        log::debug!("checked drop stats of {} template {} ({} rolls)", store, loot_id, rolls);
        Ok(lines)
    }
}

// =============================================================================
// Instance scripts
// =============================================================================

/// Script attached to one map instance that understands chat commands.
pub trait InstanceScript {
    fn show_chat_commands(&self) -> Vec<String>;
    fn execute_chat_command(&mut self, args: &str) -> Vec<String>;
}

pub trait InstanceScripts {
    /// Script of a map instance, `None` when it has none or it takes no commands.
    fn script_mut(&mut self, map_id: u32, instance_id: u32) -> Option<&mut dyn InstanceScript>;
}

#[derive(Default)]
pub struct InMemoryInstanceScripts {
    scripts: HashMap<(u32, u32), Box<dyn InstanceScript>>,
}

impl InMemoryInstanceScripts {
    pub fn attach(&mut self, map_id: u32, instance_id: u32, script: Box<dyn InstanceScript>) {
        self.scripts.insert((map_id, instance_id), script);
    }
}

impl InstanceScripts for InMemoryInstanceScripts {
    fn script_mut(&mut self, map_id: u32, instance_id: u32) -> Option<&mut dyn InstanceScript> {
        self.scripts
            .get_mut(&(map_id, instance_id))
            .map(|script| script.as_mut() as &mut dyn InstanceScript)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncounterState {
    NotStarted,
    InProgress,
    Done,
}

impl fmt::Display for EncounterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EncounterState::NotStarted => "not started",
            EncounterState::InProgress => "in progress",
            EncounterState::Done => "done",
        })
    }
}

/// Instance script tracking named boss encounters.
#[derive(Debug, Clone, Default)]
pub struct EncounterScript {
    encounters: Vec<(String, EncounterState)>,
}

impl EncounterScript {
    pub fn new(names: &[&str]) -> Self {
        EncounterScript {
            encounters: names
                .iter()
                .map(|name| (name.to_string(), EncounterState::NotStarted))
                .collect(),
        }
    }

    pub fn state(&self, name: &str) -> Option<EncounterState> {
        self.encounters
            .iter()
            .find(|(encounter, _)| encounter.eq_ignore_ascii_case(name))
            .map(|(_, state)| *state)
    }

    fn set_state(&mut self, name: &str, state: EncounterState) -> Vec<String> {
        match self
            .encounters
            .iter_mut()
            .find(|(encounter, _)| encounter.eq_ignore_ascii_case(name))
        {
            Some((encounter, current)) => {
                *current = state;
                vec![format!("Encounter {} is now {}.", encounter, state)]
            }
            None => vec![format!("Unknown encounter '{}'.", name)],
        }
    }
}

impl InstanceScript for EncounterScript {
    fn show_chat_commands(&self) -> Vec<String> {
        vec![
            "Instance script commands:".to_string(),
            "encounters - list encounters and their state".to_string(),
            "start <name> - mark an encounter in progress".to_string(),
            "done <name> - mark an encounter done".to_string(),
            "reset <name> - reset an encounter".to_string(),
        ]
    }

    fn execute_chat_command(&mut self, args: &str) -> Vec<String> {
        let mut words = args.split_whitespace();
        match (words.next(), words.next()) {
            (Some("encounters"), _) => self
                .encounters
                .iter()
                .map(|(name, state)| format!("{}: {}", name, state))
                .collect(),
            (Some("start"), Some(name)) => self.set_state(name, EncounterState::InProgress),
            (Some("done"), Some(name)) => self.set_state(name, EncounterState::Done),
            (Some("reset"), Some(name)) => self.set_state(name, EncounterState::NotStarted),
            _ => self.show_chat_commands(),
        }
    }
}

// =============================================================================
// Client data stores
// =============================================================================

/// One fly-by camera point of a cinematic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraWaypoint {
    pub timestamp_ms: u32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Radians.
    pub facing: f32,
}

pub trait ClientDataStore {
    /// Camera id of a cinematic sequence, `None` when the sequence is unknown.
    fn cinematic_camera(&self, sequence_id: u32) -> Option<u32>;
    fn camera_waypoints(&self, camera_id: u32) -> Option<&[CameraWaypoint]>;
    fn has_movie(&self, movie_id: u32) -> bool;
    fn has_sound(&self, sound_id: u32) -> bool;
}

#[derive(Debug, Default)]
pub struct InMemoryClientData {
    cinematics: HashMap<u32, u32>,
    cameras: HashMap<u32, Vec<CameraWaypoint>>,
    movies: HashSet<u32>,
    sounds: HashSet<u32>,
}

impl InMemoryClientData {
    pub fn add_cinematic(&mut self, sequence_id: u32, camera_id: u32) {
        self.cinematics.insert(sequence_id, camera_id);
    }

    pub fn add_camera(&mut self, camera_id: u32, waypoints: Vec<CameraWaypoint>) {
        self.cameras.insert(camera_id, waypoints);
    }

    pub fn add_movie(&mut self, movie_id: u32) {
        self.movies.insert(movie_id);
    }

    pub fn add_sound(&mut self, sound_id: u32) {
        self.sounds.insert(sound_id);
    }
}

impl ClientDataStore for InMemoryClientData {
    fn cinematic_camera(&self, sequence_id: u32) -> Option<u32> {
        self.cinematics.get(&sequence_id).copied()
    }

    fn camera_waypoints(&self, camera_id: u32) -> Option<&[CameraWaypoint]> {
        self.cameras.get(&camera_id).map(Vec::as_slice)
    }

    fn has_movie(&self, movie_id: u32) -> bool {
        self.movies.contains(&movie_id)
    }

    fn has_sound(&self, sound_id: u32) -> bool {
        self.sounds.contains(&sound_id)
    }
}

// =============================================================================
// Bundle
// =============================================================================

/// Everything a debug command may reach outside the world state itself.
pub struct DebugServices {
    pub battlegrounds: Box<dyn BattlegroundControl>,
    pub maps: Box<dyn MapStats>,
    pub loot: Box<dyn LootStatistics>,
    pub scripts: Box<dyn InstanceScripts>,
    pub client_data: Box<dyn ClientDataStore>,
}

impl DebugServices {
    /// Empty in-memory services. `seed` drives the loot simulator.
    pub fn in_memory(seed: u64) -> Self {
        DebugServices {
            battlegrounds: Box::new(InMemoryBattlegrounds::default()),
            maps: Box::new(InMemoryMapStats::default()),
            loot: Box::new(LootSimulator::new(seed)),
            scripts: Box::new(InMemoryInstanceScripts::default()),
            client_data: Box::new(InMemoryClientData::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loot_store_parse() {
        assert_eq!(LootStore::parse("c"), Some(LootStore::Creature));
        assert_eq!(LootStore::parse("gameobject"), Some(LootStore::GameObject));
        assert_eq!(LootStore::parse("prosp"), Some(LootStore::Prospecting));
        assert_eq!(LootStore::parse("mil"), Some(LootStore::Milling));
        assert_eq!(LootStore::parse("s"), Some(LootStore::Spell));
        // aliases are exact, not abbreviations
        assert_eq!(LootStore::parse("cre"), None);
        assert_eq!(LootStore::parse("Creature"), None);
    }

    #[test]
    fn test_loot_store_names_round_trip() {
        for store in LootStore::ALL {
            assert_eq!(LootStore::parse(store.name()), Some(store));
        }
    }

    #[test]
    fn test_drop_stats_seeded() {
        let mut simulator = LootSimulator::new(7);
        simulator.add_template(
            LootStore::Creature,
            100,
            vec![
                LootEntry { item_id: 1, chance: 100.0 },
                LootEntry { item_id: 2, chance: 0.0 },
                LootEntry { item_id: 3, chance: 50.0 },
            ],
        );

        let lines = simulator.drop_stats(1000, 100, LootStore::Creature).unwrap();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Drop statistics of creature loot template 100 after 1000 rolls:");
        assert_eq!(lines[1], "Item 1: dropped 1000 times (100.000%, expected 100.000%)");
        assert_eq!(lines[2], "Item 2: dropped 0 times (0.000%, expected 0.000%)");
        assert!(lines[3].starts_with("Item 3: dropped "));

        let mut again = LootSimulator::new(7);
        again.add_template(
            LootStore::Creature,
            100,
            vec![
                LootEntry { item_id: 1, chance: 100.0 },
                LootEntry { item_id: 2, chance: 0.0 },
                LootEntry { item_id: 3, chance: 50.0 },
            ],
        );
        assert_eq!(again.drop_stats(1000, 100, LootStore::Creature).unwrap(), lines);
    }

    #[test]
    fn test_drop_stats_errors() {
        let mut simulator = LootSimulator::new(1);
        simulator.add_template(LootStore::Fishing, 5, Vec::new());
        assert_eq!(
            simulator.drop_stats(10, 9, LootStore::Creature),
            Err(LootError::UnknownTemplate {
                store: LootStore::Creature,
                id: 9
            })
        );
        assert_eq!(
            simulator.drop_stats(10, 5, LootStore::Fishing),
            Err(LootError::EmptyTemplate {
                store: LootStore::Fishing,
                id: 5
            })
        );
    }

    #[test]
    fn test_map_update_times() {
        let mut stats = InMemoryMapStats::default();
        assert_eq!(stats.update_times(0, 0), UpdateTimes::default());

        stats.record_update(0, 0, 40);
        stats.record_update(0, 0, 10);
        stats.record_update(0, 0, 25);
        stats.set_loaded_grids(0, 0, 12);
        assert_eq!(
            stats.update_times(0, 0),
            UpdateTimes {
                min: 10,
                max: 40,
                avg: 25
            }
        );
        assert_eq!(stats.loaded_grids(0, 0), 12);
        assert_eq!(stats.loaded_grids(1, 0), 0);
    }

    #[test]
    fn test_battleground_toggles() {
        let mut bgs = InMemoryBattlegrounds::default();
        assert!(bgs.toggle_testing());
        assert!(!bgs.toggle_testing());
        assert!(bgs.toggle_arena_testing());

        assert!(!bgs.start_now(3));
        bgs.open(3, 120_000);
        assert!(bgs.start_now(3));
        assert_eq!(bgs.start_delay(3), Some(-1));
    }

    #[test]
    fn test_encounter_script() {
        let mut script = EncounterScript::new(&["Onyxia"]);
        assert_eq!(
            script.execute_chat_command("done onyxia"),
            vec!["Encounter Onyxia is now done.".to_string()]
        );
        assert_eq!(script.state("Onyxia"), Some(EncounterState::Done));
        assert_eq!(
            script.execute_chat_command("encounters"),
            vec!["Onyxia: done".to_string()]
        );
        assert_eq!(
            script.execute_chat_command("reset ragnaros"),
            vec!["Unknown encounter 'ragnaros'.".to_string()]
        );
        assert_eq!(script.execute_chat_command(""), script.show_chat_commands());
    }

    #[test]
    fn test_instance_script_lookup() {
        let mut scripts = InMemoryInstanceScripts::default();
        scripts.attach(249, 1, Box::new(EncounterScript::new(&["Onyxia"])));
        assert!(scripts.script_mut(249, 1).is_some());
        assert!(scripts.script_mut(249, 2).is_none());
    }

    #[test]
    fn test_client_data() {
        let mut data = InMemoryClientData::default();
        data.add_cinematic(1, 2);
        data.add_camera(
            2,
            vec![CameraWaypoint {
                timestamp_ms: 0,
                x: 1.0,
                y: 2.0,
                z: 3.0,
                facing: 0.0,
            }],
        );
        data.add_sound(8000);
        assert_eq!(data.cinematic_camera(1), Some(2));
        assert_eq!(data.camera_waypoints(2).map(<[_]>::len), Some(1));
        assert!(data.has_sound(8000));
        assert!(!data.has_movie(1));
    }
}
