//! Read, write and modify single value slots of a world object.
//!
//! Tokens are taken raw and parsed after the index check, so an index that
//! is out of range is reported before anything about the mode or operator.

use std::fmt;
use thiserror::Error;

use crate::args::{is_abbrev, parse_u32_radix};
use world_core::constants::OBJECT_FIELD_ENTRY;
use world_core::types::ValueSlots;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("The index {index} is too big for {guid} (count: {count}).")]
    IndexTooBig { index: u32, guid: String, count: u32 },
    #[error("Field {index} of {guid} holds object identity and cannot be changed.")]
    ProtectedField { index: u32, guid: String },
    #[error("Unknown value type '{0}', use int, hex, bit or float.")]
    UnknownFormat(String),
    #[error("Unknown operator '{0}', use int, float, |=, &= or &=~.")]
    UnknownModifier(String),
    #[error("'{value}' is not a valid {kind} literal.")]
    BadLiteral { value: String, kind: &'static str },
}

impl FieldError {
    /// Errors that are plain argument mistakes and get the usage line instead
    /// of a message of their own.
    pub fn is_usage_error(&self) -> bool {
        matches!(self, FieldError::BadLiteral { .. })
    }
}

/// Interpretation of a slot for display and for parsing a new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueFormat {
    Int,
    Hex,
    Bit,
    Float,
}

impl ValueFormat {
    /// Missing token means `int`. Tokens may be abbreviated.
    pub fn parse(token: Option<&str>) -> Result<Self, FieldError> {
        let Some(token) = token else {
            return Ok(ValueFormat::Int);
        };
        [
            ("int", ValueFormat::Int),
            ("hex", ValueFormat::Hex),
            ("bit", ValueFormat::Bit),
            ("float", ValueFormat::Float),
        ]
        .into_iter()
        .find(|(name, _)| is_abbrev(token, name))
        .map(|(_, format)| format)
        .ok_or_else(|| FieldError::UnknownFormat(token.to_string()))
    }

    fn radix(self) -> Option<u32> {
        match self {
            ValueFormat::Int => Some(10),
            ValueFormat::Hex => Some(16),
            ValueFormat::Bit => Some(2),
            ValueFormat::Float => None,
        }
    }

    fn kind(self) -> &'static str {
        match self {
            ValueFormat::Int => "int",
            ValueFormat::Hex => "hex",
            ValueFormat::Bit => "bit",
            ValueFormat::Float => "float",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueModifier {
    /// Wrapping signed add of a decimal operand.
    IntAdd,
    FloatAdd,
    /// `|=` with a hex operand.
    Or,
    /// `&=` with a hex operand.
    And,
    /// `&=~` with a hex operand.
    AndNot,
}

impl ValueModifier {
    /// `int` and `float` may be abbreviated, the bitwise operators must match exactly.
    pub fn parse(token: &str) -> Result<Self, FieldError> {
        match token {
            "|=" => Ok(ValueModifier::Or),
            "&=" => Ok(ValueModifier::And),
            "&=~" => Ok(ValueModifier::AndNot),
            _ if is_abbrev(token, "int") => Ok(ValueModifier::IntAdd),
            _ if is_abbrev(token, "float") => Ok(ValueModifier::FloatAdd),
            _ => Err(FieldError::UnknownModifier(token.to_string())),
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            ValueModifier::IntAdd => "int",
            ValueModifier::FloatAdd => "float",
            ValueModifier::Or => "|=",
            ValueModifier::And => "&=",
            ValueModifier::AndNot => "&=~",
        }
    }
}

/// A slot value as read in one particular format.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Int(u32),
    Hex(u32),
    Bit(u32),
    Float(f32),
}

impl FieldValue {
    fn read(raw: u32, format: ValueFormat) -> Self {
        match format {
            ValueFormat::Int => FieldValue::Int(raw),
            ValueFormat::Hex => FieldValue::Hex(raw),
            ValueFormat::Bit => FieldValue::Bit(raw),
            ValueFormat::Float => FieldValue::Float(f32::from_bits(raw)),
        }
    }
}

/// 33 characters: `'0'` when bit 31 is set, otherwise a space, then all 32
/// bits most significant first.
pub fn format_bitstring(value: u32) -> String {
    let mut out = String::with_capacity(33);
    out.push(if value & (1 << 31) != 0 { '0' } else { ' ' });
    for bit in (0..32).rev() {
        out.push(if value & (1 << bit) != 0 { '1' } else { '0' });
    }
    out
}

/// Confirmation of a field operation, rendered as the chat reply.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldReport {
    Read {
        guid: String,
        index: u32,
        value: FieldValue,
    },
    Set {
        guid: String,
        index: u32,
        value: FieldValue,
    },
    Changed {
        guid: String,
        index: u32,
        modifier: ValueModifier,
        operand: FieldValue,
        result: FieldValue,
    },
}

impl fmt::Display for FieldReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldReport::Read { guid, index, value } => match value {
                FieldValue::Int(v) => write!(f, "The uint32 value of {} in {} is: {}", guid, index, v),
                FieldValue::Hex(v) => write!(f, "The hex value of {} in {} is: {:X}", guid, index, v),
                FieldValue::Bit(v) => write!(
                    f,
                    "The binary value of {} in {} is: {}",
                    guid,
                    index,
                    format_bitstring(*v)
                ),
                FieldValue::Float(v) => write!(f, "The float value of {} in {} is: {:.6}", guid, index, v),
            },
            FieldReport::Set { guid, index, value } => match value {
                FieldValue::Float(v) => write!(f, "You set the float value of {} in {} to {:.6}", guid, index, v),
                FieldValue::Int(v) | FieldValue::Hex(v) | FieldValue::Bit(v) => {
                    write!(f, "You set the uint32 value of {} in {} to {}", guid, index, v)
                }
            },
            FieldReport::Changed {
                guid,
                index,
                modifier,
                operand,
                result,
            } => match (operand, result) {
                (FieldValue::Float(by), FieldValue::Float(to)) => write!(
                    f,
                    "You change the float value of {} in {} by {:.6} to {:.6}",
                    guid, index, by, to
                ),
                (FieldValue::Int(by), FieldValue::Int(to)) => write!(
                    f,
                    "You change the int32 value of {} in {} by {} to {} (0x{:08X})",
                    guid, index, *by as i32, *to as i32, to
                ),
                (FieldValue::Hex(by), FieldValue::Hex(to)) => write!(
                    f,
                    "You change the hex value of {} in {} by {} {:X} to {:X}",
                    guid,
                    index,
                    modifier.token(),
                    by,
                    to
                ),
                _ => write!(f, "You change the value of {} in {}", guid, index),
            },
        }
    }
}

fn check_index<E: ValueSlots + ?Sized>(entity: &E, index: u32, writable: bool) -> Result<(), FieldError> {
    let count = entity.values().count();
    if index >= count {
        return Err(FieldError::IndexTooBig {
            index,
            guid: entity.guid_str(),
            count,
        });
    }
    if writable && index <= OBJECT_FIELD_ENTRY {
        return Err(FieldError::ProtectedField {
            index,
            guid: entity.guid_str(),
        });
    }
    Ok(())
}

/// Renders slot `index` in the format named by `format` (default `int`).
pub fn read_field<E: ValueSlots + ?Sized>(
    entity: &E,
    index: u32,
    format: Option<&str>,
) -> Result<FieldReport, FieldError> {
    check_index(entity, index, false)?;
    let format = ValueFormat::parse(format)?;

    let value = FieldValue::read(entity.values().get_u32(index), format);
    let report = FieldReport::Read {
        guid: entity.guid_str(),
        index,
        value,
    };
    log::debug!("{}", report);
    Ok(report)
}

/// Overwrites slot `index` with `literal` parsed in the format named by `format`.
pub fn write_field<E: ValueSlots + ?Sized>(
    entity: &mut E,
    index: u32,
    format: Option<&str>,
    literal: &str,
) -> Result<FieldReport, FieldError> {
    check_index(entity, index, true)?;
    let format = ValueFormat::parse(format)?;

    let bad_literal = || FieldError::BadLiteral {
        value: literal.to_string(),
        kind: format.kind(),
    };

    let value = match format.radix() {
        Some(radix) => {
            let value = parse_u32_radix(literal, radix).ok_or_else(bad_literal)?;
            entity.values_mut().set_u32(index, value);
            FieldValue::read(value, format)
        }
        None => {
            let value = parse_float(literal).ok_or_else(bad_literal)?;
            entity.values_mut().set_f32(index, value);
            FieldValue::Float(value)
        }
    };

    let report = FieldReport::Set {
        guid: entity.guid_str(),
        index,
        value,
    };
    log::debug!("{}", report);
    Ok(report)
}

/// Combines slot `index` with `literal` using the operator named by `modifier`.
pub fn modify_field<E: ValueSlots + ?Sized>(
    entity: &mut E,
    index: u32,
    modifier: &str,
    literal: &str,
) -> Result<FieldReport, FieldError> {
    check_index(entity, index, true)?;
    let modifier = ValueModifier::parse(modifier)?;

    let current = entity.values().get_u32(index);
    let (operand, result) = match modifier {
        ValueModifier::FloatAdd => {
            let by = parse_float(literal).ok_or_else(|| FieldError::BadLiteral {
                value: literal.to_string(),
                kind: "float",
            })?;
            let value = f32::from_bits(current) + by;
            entity.values_mut().set_f32(index, value);
            (FieldValue::Float(by), FieldValue::Float(value))
        }
        ValueModifier::IntAdd => {
            let by = parse_signed_decimal(literal).ok_or_else(|| FieldError::BadLiteral {
                value: literal.to_string(),
                kind: "int",
            })?;
            let value = (current as i32).wrapping_add(by as i32) as u32;
            entity.values_mut().set_u32(index, value);
            (FieldValue::Int(by), FieldValue::Int(value))
        }
        ValueModifier::Or | ValueModifier::And | ValueModifier::AndNot => {
            let by = parse_u32_radix(literal, 16).ok_or_else(|| FieldError::BadLiteral {
                value: literal.to_string(),
                kind: "hex",
            })?;
            let value = match modifier {
                ValueModifier::Or => current | by,
                ValueModifier::And => current & by,
                _ => current & !by,
            };
            entity.values_mut().set_u32(index, value);
            (FieldValue::Hex(by), FieldValue::Hex(value))
        }
    };

    let report = FieldReport::Changed {
        guid: entity.guid_str(),
        index,
        modifier,
        operand,
        result,
    };
    log::debug!("{}", report);
    Ok(report)
}

fn parse_float(literal: &str) -> Option<f32> {
    literal.parse::<f32>().ok().filter(|value| value.is_finite())
}

/// Decimal operand of the int modifier: negative values or anything that
/// fits in 32 unsigned bits, kept as its bit pattern.
fn parse_signed_decimal(literal: &str) -> Option<u32> {
    literal
        .parse::<i32>()
        .map(|value| value as u32)
        .ok()
        .or_else(|| parse_u32_radix(literal, 10))
}

#[cfg(test)]
mod tests {
    use super::*;
    use world_core::constants::{ITEM_END, ITEM_FIELD_DURABILITY, OBJECT_FIELD_TYPE};
    use world_core::types::{Item, ObjectGuid};

    fn item() -> Item {
        Item::new(5, 25, ObjectGuid::player(1))
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(ValueFormat::parse(None), Ok(ValueFormat::Int));
        assert_eq!(ValueFormat::parse(Some("h")), Ok(ValueFormat::Hex));
        assert_eq!(ValueFormat::parse(Some("f")), Ok(ValueFormat::Float));
        assert_eq!(ValueFormat::parse(Some("bit")), Ok(ValueFormat::Bit));
        assert_eq!(
            ValueFormat::parse(Some("hexa")),
            Err(FieldError::UnknownFormat("hexa".to_string()))
        );
    }

    #[test]
    fn test_modifier_parse() {
        assert_eq!(ValueModifier::parse("i"), Ok(ValueModifier::IntAdd));
        assert_eq!(ValueModifier::parse("fl"), Ok(ValueModifier::FloatAdd));
        assert_eq!(ValueModifier::parse("|="), Ok(ValueModifier::Or));
        assert_eq!(ValueModifier::parse("&="), Ok(ValueModifier::And));
        assert_eq!(ValueModifier::parse("&=~"), Ok(ValueModifier::AndNot));
        assert!(ValueModifier::parse("|").is_err());
        assert!(ValueModifier::parse("&").is_err());
        assert!(ValueModifier::parse("&=~~").is_err());
    }

    #[test]
    fn test_bitstring() {
        assert_eq!(format_bitstring(0), format!(" {}", "0".repeat(32)));
        let high = format_bitstring(0x8000_0000);
        assert_eq!(high.len(), 33);
        assert!(high.starts_with("01"));
        assert!(high[2..].chars().all(|c| c == '0'));
        assert_eq!(format_bitstring(5), format!(" {}101", "0".repeat(29)));
    }

    #[test]
    fn test_write_then_read_round_trips() {
        let mut item = item();
        let index = ITEM_FIELD_DURABILITY;

        write_field(&mut item, index, Some("int"), "4000000000").unwrap();
        assert_eq!(
            read_field(&item, index, None).unwrap(),
            FieldReport::Read {
                guid: "Item (Guid: 5)".to_string(),
                index,
                value: FieldValue::Int(4_000_000_000)
            }
        );

        write_field(&mut item, index, Some("hex"), "DEADBEEF").unwrap();
        assert!(matches!(
            read_field(&item, index, Some("hex")).unwrap(),
            FieldReport::Read { value: FieldValue::Hex(0xDEAD_BEEF), .. }
        ));

        write_field(&mut item, index, Some("bit"), "1011").unwrap();
        assert!(matches!(
            read_field(&item, index, Some("b")).unwrap(),
            FieldReport::Read { value: FieldValue::Bit(11), .. }
        ));

        write_field(&mut item, index, Some("float"), "2.75").unwrap();
        assert!(matches!(
            read_field(&item, index, Some("float")).unwrap(),
            FieldReport::Read { value: FieldValue::Float(v), .. } if v == 2.75
        ));
    }

    #[test]
    fn test_protected_fields_are_untouched() {
        let mut item = item();
        let before = item.values().clone();
        for index in 0..=OBJECT_FIELD_ENTRY {
            assert!(matches!(
                write_field(&mut item, index, Some("int"), "1"),
                Err(FieldError::ProtectedField { .. })
            ));
            assert!(matches!(
                modify_field(&mut item, index, "|=", "1"),
                Err(FieldError::ProtectedField { .. })
            ));
        }
        assert_eq!(item.values(), &before);
        // reads are allowed
        assert!(read_field(&item, OBJECT_FIELD_TYPE, None).is_ok());
    }

    #[test]
    fn test_index_too_big() {
        let mut item = item();
        let err = read_field(&item, ITEM_END, Some("nonsense")).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("The index {} is too big for Item (Guid: 5) (count: {}).", ITEM_END, ITEM_END)
        );
        assert!(matches!(
            write_field(&mut item, ITEM_END, Some("int"), "1"),
            Err(FieldError::IndexTooBig { .. })
        ));
    }

    #[test]
    fn test_bad_literal_leaves_value() {
        let mut item = item();
        let index = ITEM_FIELD_DURABILITY;
        item.values_mut().set_u32(index, 7);
        let err = write_field(&mut item, index, Some("int"), "seven").unwrap_err();
        assert!(err.is_usage_error());
        assert!(modify_field(&mut item, index, "|=", "zz").is_err());
        assert_eq!(item.values().get_u32(index), 7);
    }

    #[test]
    fn test_or_then_and_not_restores() {
        let mut item = item();
        let index = ITEM_FIELD_DURABILITY;
        for (original, operand) in [(0u32, "FFFFFFFF"), (0x1234_5678, "F0F0F0F0"), (0x8000_0001, "1")] {
            item.values_mut().set_u32(index, original);
            modify_field(&mut item, index, "|=", operand).unwrap();
            modify_field(&mut item, index, "&=~", operand).unwrap();
            let operand = parse_u32_radix(operand, 16).unwrap();
            assert_eq!(item.values().get_u32(index), original & !operand);
        }

        item.values_mut().set_u32(index, 0x0F);
        modify_field(&mut item, index, "|=", "F0").unwrap();
        assert_eq!(item.values().get_u32(index), 0xFF);
        modify_field(&mut item, index, "&=~", "F0").unwrap();
        assert_eq!(item.values().get_u32(index), 0x0F);
        modify_field(&mut item, index, "&=", "3").unwrap();
        assert_eq!(item.values().get_u32(index), 0x03);
    }

    #[test]
    fn test_int_add_wraps() {
        let mut item = item();
        let index = ITEM_FIELD_DURABILITY;
        item.values_mut().set_u32(index, 5);
        let report = modify_field(&mut item, index, "int", "-10").unwrap();
        assert_eq!(item.values().get_u32(index), (-5i32) as u32);
        assert_eq!(
            report.to_string(),
            format!(
                "You change the int32 value of Item (Guid: 5) in {} by -10 to -5 (0xFFFFFFFB)",
                index
            )
        );

        item.values_mut().set_u32(index, i32::MAX as u32);
        modify_field(&mut item, index, "i", "1").unwrap();
        assert_eq!(item.values().get_u32(index), i32::MIN as u32);
    }

    #[test]
    fn test_float_add() {
        let mut item = item();
        let index = ITEM_FIELD_DURABILITY;
        item.values_mut().set_f32(index, 1.5);
        let report = modify_field(&mut item, index, "float", "0.25").unwrap();
        assert_eq!(item.values().get_f32(index), 1.75);
        assert_eq!(
            report.to_string(),
            format!(
                "You change the float value of Item (Guid: 5) in {} by 0.250000 to 1.750000",
                index
            )
        );
    }

    #[test]
    fn test_unknown_tokens_are_reported() {
        let mut item = item();
        assert_eq!(
            read_field(&item, 10, Some("oct")),
            Err(FieldError::UnknownFormat("oct".to_string()))
        );
        assert_eq!(
            modify_field(&mut item, 10, "^=", "1"),
            Err(FieldError::UnknownModifier("^=".to_string()))
        );
    }
}
