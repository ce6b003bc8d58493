//! Chat command argument extraction.
//!
//! Every extractor works on the front of the remaining text. A failed
//! extraction leaves the cursor where it was, so a handler can try an
//! optional argument and fall through to the next one.

/// Case-insensitive prefix test: `abbrev` names `full` when it is a non-empty
/// leading part of it ("h" and "he" both abbreviate "hex").
pub fn is_abbrev(abbrev: &str, full: &str) -> bool {
    if abbrev.is_empty() {
        return false;
    }
    full.to_lowercase().starts_with(abbrev.to_lowercase().as_str())
}

/// C `atoi` semantics: optional sign and leading digits, anything after is
/// ignored, no digits gives 0. Overflow wraps.
pub fn atoi(text: &str) -> i32 {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let mut value: i32 = 0;
    for c in digits.bytes().take_while(u8::is_ascii_digit) {
        value = value.wrapping_mul(10).wrapping_add(i32::from(c - b'0'));
    }
    if negative { value.wrapping_neg() } else { value }
}

/// Parses an unsigned literal in `radix`. Hex literals may carry a `0x` prefix.
pub fn parse_u32_radix(text: &str, radix: u32) -> Option<u32> {
    let digits = if radix == 16 {
        text.strip_prefix("0x")
            .or_else(|| text.strip_prefix("0X"))
            .unwrap_or(text)
    } else {
        text
    };
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return None;
    }
    u32::from_str_radix(digits, radix).ok()
}

#[derive(Debug, Clone, Copy)]
pub struct Args<'a> {
    rest: &'a str,
}

impl<'a> Args<'a> {
    pub fn new(text: &'a str) -> Self {
        Args {
            rest: text.trim_start(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rest.trim().is_empty()
    }

    /// Unconsumed text with surrounding whitespace removed.
    pub fn rest(&self) -> &'a str {
        self.rest.trim()
    }

    fn peek_token(&self) -> Option<(&'a str, &'a str)> {
        let text = self.rest.trim_start();
        if text.is_empty() {
            return None;
        }
        let end = text.find(char::is_whitespace).unwrap_or(text.len());
        Some((&text[..end], text[end..].trim_start()))
    }

    /// Next whitespace-delimited word.
    pub fn literal(&mut self) -> Option<&'a str> {
        let (token, rest) = self.peek_token()?;
        self.rest = rest;
        Some(token)
    }

    /// Next word, but only when at least one more word follows it.
    pub fn opt_not_last(&mut self) -> Option<&'a str> {
        let (token, rest) = self.peek_token()?;
        if rest.is_empty() {
            return None;
        }
        self.rest = rest;
        Some(token)
    }

    fn parse_next<T>(&mut self, parse: impl FnOnce(&str) -> Option<T>) -> Option<T> {
        let (token, rest) = self.peek_token()?;
        let value = parse(token)?;
        self.rest = rest;
        Some(value)
    }

    pub fn u32(&mut self) -> Option<u32> {
        self.u32_radix(10)
    }

    pub fn u32_radix(&mut self, radix: u32) -> Option<u32> {
        self.parse_next(|token| parse_u32_radix(token, radix))
    }

    pub fn i32(&mut self) -> Option<i32> {
        self.parse_next(|token| token.parse::<i32>().ok())
    }

    pub fn f32(&mut self) -> Option<f32> {
        self.parse_next(|token| token.parse::<f32>().ok().filter(|value| value.is_finite()))
    }

    /// `default` when nothing is left, `None` when something is left but is
    /// not a number.
    pub fn opt_u32(&mut self, default: u32) -> Option<u32> {
        if self.is_empty() {
            return Some(default);
        }
        self.u32()
    }
}
