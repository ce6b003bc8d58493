//! Text-described packets for `.debug send opcode`.
//!
//! The script is a whitespace separated token stream: the opcode number,
//! then any number of `<type> <value>` pairs where type is one of `uint8`,
//! `uint16`, `uint32`, `uint64`, `float` or `string`. `pguid` takes no value
//! and writes the packed guid of the target. Parsing stops quietly at the
//! first unknown type.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::packet::{opcodes, WorldPacket};
use world_core::types::ObjectGuid;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("cannot read opcode script {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("opcode script is empty")]
    MissingOpcode,
    #[error("'{0}' is not a valid opcode")]
    BadOpcode(String),
    #[error("{kind} is missing its value")]
    MissingValue { kind: String },
    #[error("'{value}' is not a valid {kind}")]
    BadValue { kind: String, value: String },
}

pub fn load_opcode_script(path: &Path, target: ObjectGuid) -> Result<WorldPacket, ScriptError> {
    let text = fs::read_to_string(path).map_err(|source| ScriptError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_opcode_script(&text, target)
}

pub fn parse_opcode_script(text: &str, target: ObjectGuid) -> Result<WorldPacket, ScriptError> {
    let mut tokens = text.split_whitespace();

    let opcode_token = tokens.next().ok_or(ScriptError::MissingOpcode)?;
    let opcode = opcode_token
        .parse::<u32>()
        .ok()
        .filter(|opcode| *opcode < opcodes::NUM_MSG_TYPES)
        .ok_or_else(|| ScriptError::BadOpcode(opcode_token.to_string()))?;

    let mut data = WorldPacket::new(opcode as u16, 0);

    while let Some(kind) = tokens.next() {
        match kind {
            "uint8" => {
                // read wide, stored narrow
                let value: u16 = next_value(&mut tokens, kind)?;
                data.put_u8(value as u8);
            }
            "uint16" => {
                data.put_u16(next_value(&mut tokens, kind)?);
            }
            "uint32" => {
                data.put_u32(next_value(&mut tokens, kind)?);
            }
            "uint64" => {
                data.put_u64(next_value(&mut tokens, kind)?);
            }
            "float" => {
                data.put_f32(next_value(&mut tokens, kind)?);
            }
            "string" => {
                let value = tokens.next().ok_or_else(|| ScriptError::MissingValue {
                    kind: kind.to_string(),
                })?;
                data.put_cstring(value);
            }
            "pguid" => {
                data.put_packed_guid(target);
            }
            _ => {
                log::debug!("Sending opcode: unknown type '{}'", kind);
                break;
            }
        }
    }

    Ok(data)
}

fn next_value<'a, T: std::str::FromStr>(
    tokens: &mut impl Iterator<Item = &'a str>,
    kind: &str,
) -> Result<T, ScriptError> {
    let value = tokens.next().ok_or_else(|| ScriptError::MissingValue {
        kind: kind.to_string(),
    })?;
    value.parse::<T>().map_err(|_| ScriptError::BadValue {
        kind: kind.to_string(),
        value: value.to_string(),
    })
}
