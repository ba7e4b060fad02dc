//! Keyboard shortcuts bound to controller actions

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::controller::{ActionOutcome, TourController};
use crate::error::{Error, Result};

const MOD_SHIFT: u8 = 0b001;
const MOD_CONTROL: u8 = 0b010;
const MOD_ALT: u8 = 0b100;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum Key {
    Char(char),
    Left,
    Right,
    Enter,
}

/// Key plus modifiers, parsed from strings like `ctrl+shift+f`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyCombo {
    key: Key,
    modifiers: u8,
}

impl KeyCombo {
    pub fn has_ctrl(&self) -> bool {
        self.modifiers & MOD_CONTROL != 0
    }
}

impl FromStr for KeyCombo {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidInput("key combo is empty".to_string()));
        }

        let parts = trimmed.split('+').collect::<Vec<_>>();
        let mut modifiers = 0u8;
        for modifier in &parts[..parts.len() - 1] {
            match modifier.trim().to_ascii_lowercase().as_str() {
                "shift" => modifiers |= MOD_SHIFT,
                "ctrl" | "control" => modifiers |= MOD_CONTROL,
                "alt" => modifiers |= MOD_ALT,
                _ => {
                    return Err(Error::InvalidInput(format!(
                        "unknown modifier '{}' in '{}'",
                        modifier, raw
                    )));
                }
            }
        }

        let key_part = parts[parts.len() - 1].trim().to_ascii_lowercase();
        let key = match key_part.as_str() {
            "" => {
                return Err(Error::InvalidInput(format!(
                    "missing key after modifier in '{}'",
                    raw
                )));
            }
            "left" => Key::Left,
            "right" => Key::Right,
            "enter" | "return" => Key::Enter,
            single if single.chars().count() == 1 => {
                let Some(ch) = single.chars().next() else {
                    return Err(Error::InvalidInput(format!("invalid key in '{}'", raw)));
                };
                Key::Char(ch)
            }
            other => {
                return Err(Error::InvalidInput(format!("unknown key '{}'", other)));
            }
        };

        Ok(Self { key, modifiers })
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.modifiers & MOD_CONTROL != 0 {
            parts.push("ctrl".to_string());
        }
        if self.modifiers & MOD_ALT != 0 {
            parts.push("alt".to_string());
        }
        if self.modifiers & MOD_SHIFT != 0 {
            parts.push("shift".to_string());
        }
        parts.push(match &self.key {
            Key::Char(ch) => ch.to_string(),
            Key::Left => "left".to_string(),
            Key::Right => "right".to_string(),
            Key::Enter => "enter".to_string(),
        });
        write!(f, "{}", parts.join("+"))
    }
}

/// Action a shortcut triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HotkeyAction {
    PrevPage,
    NextPage,
    Run,
    Reset,
    Format,
}

impl HotkeyAction {
    pub fn description(&self) -> &'static str {
        match self {
            Self::PrevPage => "Go to the previous page",
            Self::NextPage => "Go to the next page",
            Self::Run => "Compile and run the snippet",
            Self::Reset => "Restore the original snippet",
            Self::Format => "Format the snippet",
        }
    }

    /// Whether the host's own handling of the key must be suppressed
    pub fn prevents_default(&self) -> bool {
        matches!(self, Self::Reset | Self::Format)
    }
}

/// Result of dispatching a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatch {
    pub action: Option<HotkeyAction>,
    pub handled: bool,
    pub prevent_default: bool,
}

impl Dispatch {
    fn unhandled(action: Option<HotkeyAction>) -> Self {
        Self {
            action,
            handled: false,
            prevent_default: false,
        }
    }
}

/// Shortcut table
#[derive(Debug, Clone)]
pub struct HotkeyDispatcher {
    bindings: BTreeMap<KeyCombo, HotkeyAction>,
}

impl Default for HotkeyDispatcher {
    fn default() -> Self {
        let mut dispatcher = Self {
            bindings: BTreeMap::new(),
        };
        for (combo, action) in [
            ("left", HotkeyAction::PrevPage),
            ("right", HotkeyAction::NextPage),
            ("ctrl+enter", HotkeyAction::Run),
            ("ctrl+r", HotkeyAction::Reset),
            ("ctrl+shift+f", HotkeyAction::Format),
        ] {
            if let Ok(combo) = combo.parse() {
                dispatcher.bindings.insert(combo, action);
            }
        }
        dispatcher
    }
}

impl HotkeyDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a combo, replacing any previous binding for it
    pub fn bind(&mut self, combo: &str, action: HotkeyAction) -> Result<()> {
        self.bindings.insert(combo.parse()?, action);
        Ok(())
    }

    pub fn resolve(&self, combo: &KeyCombo) -> Option<HotkeyAction> {
        self.bindings.get(combo).copied()
    }

    /// Bindings in display order
    pub fn bindings(&self) -> impl Iterator<Item = (&KeyCombo, &HotkeyAction)> {
        self.bindings.iter()
    }

    /// Run the action bound to `combo` against the controller
    ///
    /// Page navigation without a configured neighbour is a no-op and leaves
    /// the key to the host.
    pub async fn dispatch(&self, controller: &TourController, combo: &KeyCombo) -> Result<Dispatch> {
        let Some(action) = self.resolve(combo) else {
            return Ok(Dispatch::unhandled(None));
        };
        debug!(combo = %combo, ?action, "Dispatching hotkey");

        let handled = match action {
            HotkeyAction::PrevPage => controller.navigate_prev()?,
            HotkeyAction::NextPage => controller.navigate_next()?,
            HotkeyAction::Run => controller.run(None).await != ActionOutcome::Skipped,
            HotkeyAction::Reset => {
                controller.reset();
                true
            }
            HotkeyAction::Format => controller.format().await != ActionOutcome::Skipped,
        };

        if !handled {
            return Ok(Dispatch::unhandled(Some(action)));
        }
        Ok(Dispatch {
            action: Some(action),
            handled,
            prevent_default: action.prevents_default(),
        })
    }
}
