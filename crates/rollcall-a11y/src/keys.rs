//! Key events as delivered by a keyboard or a keyboard-emulating scanner

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Keyboard modifier (Ctrl, Shift, Alt, Meta)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Ctrl,
    Shift,
    Alt,
    Meta,
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modifier::Ctrl => write!(f, "Ctrl"),
            Modifier::Shift => write!(f, "Shift"),
            Modifier::Alt => write!(f, "Alt"),
            Modifier::Meta => write!(f, "Meta"),
        }
    }
}

impl FromStr for Modifier {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ctrl" | "control" => Ok(Modifier::Ctrl),
            "shift" => Ok(Modifier::Shift),
            "alt" | "option" => Ok(Modifier::Alt),
            "meta" | "cmd" | "command" | "super" => Ok(Modifier::Meta),
            _ => Err(ParseError::InvalidModifier(s.to_string())),
        }
    }
}

/// A key on the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Tab,
    Backspace,
    Home,
    End,
    Up,
    Down,
    Left,
    Right,
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(c) => write!(f, "{}", c),
            Key::Enter => write!(f, "Enter"),
            Key::Escape => write!(f, "Escape"),
            Key::Tab => write!(f, "Tab"),
            Key::Backspace => write!(f, "Backspace"),
            Key::Home => write!(f, "Home"),
            Key::End => write!(f, "End"),
            Key::Up => write!(f, "ArrowUp"),
            Key::Down => write!(f, "ArrowDown"),
            Key::Left => write!(f, "ArrowLeft"),
            Key::Right => write!(f, "ArrowRight"),
        }
    }
}

impl FromStr for Key {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Ok(Key::Char(c));
        }
        match s.to_lowercase().as_str() {
            "enter" | "return" => Ok(Key::Enter),
            "escape" | "esc" => Ok(Key::Escape),
            "tab" => Ok(Key::Tab),
            "backspace" => Ok(Key::Backspace),
            "home" => Ok(Key::Home),
            "end" => Ok(Key::End),
            "up" | "arrowup" => Ok(Key::Up),
            "down" | "arrowdown" => Ok(Key::Down),
            "left" | "arrowleft" => Ok(Key::Left),
            "right" | "arrowright" => Ok(Key::Right),
            "space" => Ok(Key::Char(' ')),
            _ => Err(ParseError::InvalidKeySyntax(format!("Unknown key: {}", s))),
        }
    }
}

/// One key press travelling through the handlers of a region
///
/// Handlers call [`KeyEvent::prevent_default`] to suppress the host's own
/// reaction (moving focus on Tab, scrolling on arrows, submitting on Enter).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Vec<Modifier>,
    default_prevented: bool,
}

impl KeyEvent {
    /// Unmodified press of `key`
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Vec::new(),
            default_prevented: false,
        }
    }

    /// Add a held modifier; duplicates are ignored
    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        if !self.modifiers.contains(&modifier) {
            self.modifiers.push(modifier);
        }
        self
    }

    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    /// Shift reverses Tab direction
    pub fn shift(&self) -> bool {
        self.has_modifier(Modifier::Shift)
    }

    /// True when Ctrl, Alt or Meta is held, i.e. the press belongs to a shortcut
    pub fn is_shortcut(&self) -> bool {
        self.modifiers.iter().any(|m| *m != Modifier::Shift)
    }

    /// Suppress the host's default reaction to this press
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

impl FromStr for KeyEvent {
    type Err = ParseError;

    /// Parses `"Shift+Tab"`, `"Ctrl+Enter"`, `"ArrowDown"`
    ///
    /// The plus key itself is written as the last segment, so `"+"` and
    /// `"Ctrl++"` both parse, matching what [`fmt::Display`] produces.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (modifiers, key) = match s {
            "+" => (None, s),
            _ => match s.strip_suffix("++") {
                Some(modifiers) => (Some(modifiers), "+"),
                None => match s.rsplit_once('+') {
                    Some((modifiers, key)) => (Some(modifiers), key),
                    None => (None, s),
                },
            },
        };
        if key.is_empty() {
            return Err(ParseError::InvalidKeySyntax(
                "Empty key combination".to_string(),
            ));
        }

        let mut event = KeyEvent::new(Key::from_str(key)?);
        for modifier in modifiers.into_iter().flat_map(|m| m.split('+')) {
            event = event.with_modifier(Modifier::from_str(modifier)?);
        }
        Ok(event)
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for modifier in &self.modifiers {
            write!(f, "{}+", modifier)?;
        }
        write!(f, "{}", self.key)
    }
}
