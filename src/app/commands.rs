//! Operator text commands.
//!
//! The wire protocol is two commands, case-insensitive:
//!
//! ```text
//! config
//! set <key> <value>     key ∈ min | max | hysteresis | minsamples | renotify
//! ```
//!
//! Parsing is pure: it never touches settings, so a parse failure can
//! never leave a partial mutation behind.

use core::fmt;

/// The tunable a `set` command addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    Min,
    Max,
    Hysteresis,
    MinSamples,
    Renotify,
}

impl SettingKey {
    fn from_word(word: &str) -> Option<Self> {
        match word {
            "min" => Some(Self::Min),
            "max" => Some(Self::Max),
            "hysteresis" => Some(Self::Hysteresis),
            "minsamples" => Some(Self::MinSamples),
            "renotify" => Some(Self::Renotify),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Min => "min",
            Self::Max => "max",
            Self::Hysteresis => "hysteresis",
            Self::MinSamples => "minsamples",
            Self::Renotify => "renotify",
        }
    }
}

/// A `set` command with its value typed by key.
///
/// Integer values beyond `u32` saturate and are left to the setter's
/// range check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettingUpdate {
    Min(f32),
    Max(f32),
    Hysteresis(f32),
    MinSamples(u32),
    RenotifySeconds(u32),
}

impl SettingUpdate {
    pub fn key(&self) -> SettingKey {
        match self {
            Self::Min(_) => SettingKey::Min,
            Self::Max(_) => SettingKey::Max,
            Self::Hysteresis(_) => SettingKey::Hysteresis,
            Self::MinSamples(_) => SettingKey::MinSamples,
            Self::RenotifySeconds(_) => SettingKey::Renotify,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    ShowConfig,
    Set(SettingUpdate),
}

/// Why a command line was not understood.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// Blank line.  Not answered.
    Empty,
    UnknownCommand,
    MissingParameter,
    UnknownKey,
    InvalidNumber,
    InvalidInteger,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::UnknownCommand => {
                write!(f, "unknown command. Use 'config' or 'set <key> <value>'.")
            }
            Self::MissingParameter => write!(f, "missing parameter. Example: set min 22.5"),
            Self::UnknownKey => write!(f, "unknown key. Send 'config' for help."),
            Self::InvalidNumber => write!(f, "invalid number. Use '.' as the decimal separator."),
            Self::InvalidInteger => write!(f, "invalid integer."),
        }
    }
}

/// Parse one command line.
///
/// Checks run in a fixed order: command word, parameter presence, key,
/// then number format.
pub fn parse_command(text: &str) -> Result<Command, ParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }
    let lower = trimmed.to_ascii_lowercase();

    if lower == "config" {
        return Ok(Command::ShowConfig);
    }
    let Some(rest) = lower.strip_prefix("set ") else {
        return Err(ParseError::UnknownCommand);
    };

    let Some((key_word, value_text)) = rest.split_once(' ') else {
        return Err(ParseError::MissingParameter);
    };
    let value_text = value_text.trim();
    if value_text.is_empty() {
        return Err(ParseError::MissingParameter);
    }

    let key = SettingKey::from_word(key_word).ok_or(ParseError::UnknownKey)?;
    let update = match key {
        SettingKey::Min => SettingUpdate::Min(parse_decimal(value_text)?),
        SettingKey::Max => SettingUpdate::Max(parse_decimal(value_text)?),
        SettingKey::Hysteresis => SettingUpdate::Hysteresis(parse_decimal(value_text)?),
        SettingKey::MinSamples => SettingUpdate::MinSamples(parse_unsigned(value_text)?),
        SettingKey::Renotify => SettingUpdate::RenotifySeconds(parse_unsigned(value_text)?),
    };
    Ok(Command::Set(update))
}

/// Optional leading `-`, digits, at most one `.` if `allow_decimal`, and
/// at least one digit.  No exponents, no `+`, no whitespace.
pub fn is_valid_number(text: &str, allow_decimal: bool) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    let mut seen_digit = false;
    let mut seen_dot = false;
    for c in digits.chars() {
        match c {
            '0'..='9' => seen_digit = true,
            '.' if allow_decimal && !seen_dot => seen_dot = true,
            _ => return false,
        }
    }
    seen_digit
}

fn parse_decimal(text: &str) -> Result<f32, ParseError> {
    if !is_valid_number(text, true) {
        return Err(ParseError::InvalidNumber);
    }
    text.parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or(ParseError::InvalidNumber)
}

fn parse_unsigned(text: &str) -> Result<u32, ParseError> {
    if !is_valid_number(text, false) || text.starts_with('-') {
        return Err(ParseError::InvalidInteger);
    }
    // Only digits remain, so the sole failure mode is overflow.
    Ok(text.parse::<u32>().unwrap_or(u32::MAX))
}
