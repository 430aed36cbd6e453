//! Button-to-shortcut mapping tables.
//!
//! Each table is versioned and every entry carries its own key-combo
//! representation: either raw scancode press/release pairs (`29:1 46:1 ...`)
//! or a single symbolic token (`ctrl+v`). The injector builds its argument
//! list from whichever form the entry uses.

use std::collections::HashSet;
use std::fmt;

use thiserror::Error;

/// Linux input scancodes used by the built-in tables.
pub mod scancode {
    pub const KEY_LEFTCTRL: u16 = 29;
    pub const KEY_C: u16 = 46;
    pub const KEY_V: u16 = 47;
}

/// Physical mouse buttons this daemon recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum Button {
    /// BTN_MIDDLE
    Middle = 274,
    /// BTN_SIDE, the lower thumb button.
    Bottom = 275,
    /// BTN_EXTRA, the upper thumb button.
    Top = 276,
}

impl Button {
    pub const ALL: [Button; 3] = [Button::Top, Button::Bottom, Button::Middle];

    pub fn code(self) -> u16 {
        self as u16
    }

    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            274 => Some(Self::Middle),
            275 => Some(Self::Bottom),
            276 => Some(Self::Top),
            _ => None,
        }
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Top => write!(f, "top"),
            Self::Bottom => write!(f, "bottom"),
            Self::Middle => write!(f, "middle"),
        }
    }
}

/// One half of a scancode pair: key `code` goes down (`pressed`) or up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyStroke {
    pub code: u16,
    pub pressed: bool,
}

impl fmt::Display for KeyStroke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.code, u8::from(self.pressed))
    }
}

/// A keyboard shortcut in the form the injection tool expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyCombo {
    /// Explicit press/release sequence, passed as `<code>:<0|1>` tokens.
    ScanCodes(Vec<KeyStroke>),
    /// A single whitespace-free token such as `ctrl+v`.
    Symbolic(String),
}

impl KeyCombo {
    /// Press `codes` in order, then release them in reverse.
    pub fn chord(codes: &[u16]) -> Self {
        let presses = codes.iter().map(|&code| KeyStroke { code, pressed: true });
        let releases = codes
            .iter()
            .rev()
            .map(|&code| KeyStroke { code, pressed: false });
        Self::ScanCodes(presses.chain(releases).collect())
    }

    pub fn symbolic(token: impl Into<String>) -> Self {
        Self::Symbolic(token.into())
    }

    /// Arguments that follow `key` on the injection tool's command line.
    pub fn tool_args(&self) -> Vec<String> {
        match self {
            Self::ScanCodes(strokes) => strokes.iter().map(ToString::to_string).collect(),
            Self::Symbolic(token) => vec![token.clone()],
        }
    }

    fn check(&self) -> Result<(), String> {
        match self {
            Self::ScanCodes(strokes) if strokes.is_empty() => {
                Err("scancode sequence is empty".to_string())
            }
            Self::Symbolic(token) if token.is_empty() => Err("symbolic combo is empty".to_string()),
            Self::Symbolic(token) if token.chars().any(char::is_whitespace) => {
                Err(format!("symbolic combo {:?} contains whitespace", token))
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tool_args().join(" "))
    }
}

/// A single table row: which button, what it does, and how to emit it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    pub button: Button,
    /// Human-readable action name used in log lines ("copy", "paste").
    pub action: String,
    pub combo: KeyCombo,
}

impl Mapping {
    pub fn new(button: Button, action: impl Into<String>, combo: KeyCombo) -> Self {
        Self {
            button,
            action: action.into(),
            combo,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MappingError {
    #[error("mapping table has no entries")]
    Empty,
    #[error("{0} button is mapped more than once")]
    Duplicate(Button),
    #[error("invalid combo for {button} button: {reason}")]
    InvalidCombo { button: Button, reason: String },
}

/// Built-in tables. Which buttons exist and what they do differs between
/// versions, so the active one is a configuration choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MappingProfile {
    /// Two buttons, raw scancodes: top copies, bottom pastes.
    ScanCodeV1,
    /// Three buttons, symbolic combos: top takes a screenshot, bottom
    /// pastes, middle copies.
    #[default]
    SymbolicV2,
}

impl MappingProfile {
    pub fn table(self) -> MappingTable {
        use scancode::{KEY_C, KEY_LEFTCTRL, KEY_V};

        match self {
            Self::ScanCodeV1 => MappingTable {
                version: 1,
                entries: vec![
                    Mapping::new(Button::Top, "copy", KeyCombo::chord(&[KEY_LEFTCTRL, KEY_C])),
                    Mapping::new(Button::Bottom, "paste", KeyCombo::chord(&[KEY_LEFTCTRL, KEY_V])),
                ],
            },
            Self::SymbolicV2 => MappingTable {
                version: 2,
                entries: vec![
                    Mapping::new(Button::Top, "screenshot", KeyCombo::symbolic("print")),
                    Mapping::new(Button::Bottom, "paste", KeyCombo::symbolic("ctrl+v")),
                    Mapping::new(Button::Middle, "copy", KeyCombo::symbolic("ctrl+c")),
                ],
            },
        }
    }
}

/// Read-only lookup from button code to action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingTable {
    version: u32,
    entries: Vec<Mapping>,
}

impl MappingTable {
    pub fn new(version: u32, entries: Vec<Mapping>) -> Result<Self, MappingError> {
        if entries.is_empty() {
            return Err(MappingError::Empty);
        }
        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.button) {
                return Err(MappingError::Duplicate(entry.button));
            }
            entry
                .combo
                .check()
                .map_err(|reason| MappingError::InvalidCombo {
                    button: entry.button,
                    reason,
                })?;
        }
        Ok(Self { version, entries })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn entries(&self) -> &[Mapping] {
        &self.entries
    }

    /// Codes a device must expose (any of) to be monitored.
    pub fn codes(&self) -> impl Iterator<Item = u16> + '_ {
        self.entries.iter().map(|m| m.button.code())
    }

    pub fn lookup(&self, code: u16) -> Option<&Mapping> {
        self.entries.iter().find(|m| m.button.code() == code)
    }
}
