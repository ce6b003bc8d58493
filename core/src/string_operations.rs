use crate::constants::MAX_INTERNAL_PLAYER_NAME;

/// Brings a player name into canonical form: first character upper case,
/// the rest lower case.
///
/// Works on characters rather than bytes, so names made of characters outside
/// the basic multilingual plane are measured the same way as plain ASCII ones.
///
/// # Returns
/// * `None` if the name is empty or longer than `MAX_INTERNAL_PLAYER_NAME` characters.
pub fn normalize_player_name(name: &str) -> Option<String> {
    let count = name.chars().count();
    if count == 0 || count > MAX_INTERNAL_PLAYER_NAME {
        return None;
    }

    let mut chars = name.chars();
    let mut normalized = String::with_capacity(name.len());
    if let Some(first) = chars.next() {
        normalized.extend(first.to_uppercase());
    }
    for c in chars {
        normalized.extend(c.to_lowercase());
    }

    Some(normalized)
}
