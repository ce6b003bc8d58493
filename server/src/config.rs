use log::LevelFilter;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use world_core::constants::DEFAULT_LOOT_DROP_CHECKS;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_OPCODE_FILE: &str = "opcode.txt";

/// Runtime settings of the debug command layer, read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct DebugConfig {
    pub log_level: LevelFilter,
    pub log_file: Option<PathBuf>,
    /// Script read by `.debug send opcode`.
    pub opcode_file: PathBuf,
    /// Default number of rolls for `.debug lootdropstats`.
    pub loot_rolls: u32,
}

impl Default for DebugConfig {
    fn default() -> Self {
        DebugConfig {
            log_level: LevelFilter::Info,
            log_file: None,
            opcode_file: PathBuf::from(DEFAULT_OPCODE_FILE),
            loot_rolls: DEFAULT_LOOT_DROP_CHECKS,
        }
    }
}

impl DebugConfig {
    /// Loads `.env` if present, then reads the `WORLD_DEBUG_*` variables.
    ///
    /// Runs before the logger exists, so problems come back as warnings for
    /// the caller to log once logging is up.
    pub fn from_env() -> (Self, Vec<String>) {
        let mut warnings = Vec::new();
        if let Err(err) = dotenvy::dotenv() {
            if !err.not_found() {
                warnings.push(format!("ignoring unreadable .env file: {}", err));
            }
        }
        let config = Self::from_lookup(|key| env::var(key).ok(), &mut warnings);
        (config, warnings)
    }

    /// Builds a config from an arbitrary variable source. Unparsable values
    /// fall back to their defaults and leave a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>, warnings: &mut Vec<String>) -> Self {
        let level_text = lookup("WORLD_DEBUG_LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
        let log_level = LevelFilter::from_str(&level_text).unwrap_or_else(|_| {
            warnings.push(format!("unknown log level '{}', using {}", level_text, DEFAULT_LOG_LEVEL));
            LevelFilter::Info
        });

        let log_file = lookup("WORLD_DEBUG_LOG_FILE")
            .filter(|path| !path.is_empty())
            .map(PathBuf::from);

        let opcode_file = PathBuf::from(
            lookup("WORLD_DEBUG_OPCODE_FILE").unwrap_or_else(|| DEFAULT_OPCODE_FILE.to_string()),
        );

        let loot_rolls = match lookup("WORLD_DEBUG_LOOT_ROLLS") {
            None => DEFAULT_LOOT_DROP_CHECKS,
            Some(value) => match value.parse::<u32>() {
                Ok(rolls) if rolls > 0 => rolls,
                _ => {
                    warnings.push(format!(
                        "invalid loot roll count '{}', using {}",
                        value, DEFAULT_LOOT_DROP_CHECKS
                    ));
                    DEFAULT_LOOT_DROP_CHECKS
                }
            },
        };

        DebugConfig {
            log_level,
            log_file,
            opcode_file,
            loot_rolls,
        }
    }
}
