use std::collections::HashMap;

use crossterm::event::{KeyCode, KeyModifiers};
use spark_core::config::KeymapConfig;
use tracing::warn;

use crate::input::Action;

/// Names accepted inside `<...>`, compared case-insensitively
const NAMED_KEYS: &[(&[&str], KeyCode)] = &[
    (&["cr", "enter", "return"], KeyCode::Enter),
    (&["esc", "escape"], KeyCode::Esc),
    (&["bs", "backspace"], KeyCode::Backspace),
    (&["space", "spc"], KeyCode::Char(' ')),
    (&["tab"], KeyCode::Tab),
    (&["left"], KeyCode::Left),
    (&["right"], KeyCode::Right),
    (&["up"], KeyCode::Up),
    (&["down"], KeyCode::Down),
    (&["home"], KeyCode::Home),
    (&["end"], KeyCode::End),
    (&["pageup", "pgup"], KeyCode::PageUp),
    (&["pagedown", "pgdn"], KeyCode::PageDown),
];

/// A key code with the modifiers that must be held
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub fn simple(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub fn ctrl(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::CONTROL)
    }
}

/// Key-to-action lookup built from the `[keymap]` config section
pub struct Keymap {
    bindings: HashMap<KeyBinding, Action>,
}

impl Default for Keymap {
    fn default() -> Self {
        Self::from_config(&KeymapConfig::default())
    }
}

impl Keymap {
    pub fn from_config(config: &KeymapConfig) -> Self {
        let configured = [
            (config.quit.as_str(), Action::Quit),
            (config.move_down.as_str(), Action::MoveDown),
            (config.move_up.as_str(), Action::MoveUp),
            (config.scroll_half_down.as_str(), Action::ScrollHalfPageDown),
            (config.scroll_half_up.as_str(), Action::ScrollHalfPageUp),
            (config.select.as_str(), Action::Select),
            (config.close.as_str(), Action::Close),
            (config.next_page.as_str(), Action::NextPage),
            (config.prev_page.as_str(), Action::PrevPage),
            (config.next_post.as_str(), Action::NextPost),
            (config.prev_post.as_str(), Action::PrevPost),
            (config.toggle_like.as_str(), Action::ToggleLike),
            (config.toggle_saved.as_str(), Action::ToggleSaved),
            (config.refresh.as_str(), Action::Refresh),
        ];

        let mut bindings: HashMap<KeyBinding, Action> = HashMap::new();
        for (notation, action) in configured {
            let Some(binding) = parse_key_binding(notation) else {
                warn!(key = notation, ?action, "Invalid key binding, ignoring");
                continue;
            };
            match bindings.get(&binding) {
                Some(existing) => warn!(
                    key = notation,
                    ?existing,
                    ?action,
                    "Key already bound, keeping the first binding"
                ),
                None => {
                    bindings.insert(binding, action);
                }
            }
        }

        // Ctrl-C and Esc always work; arrows and paging keys only fill gaps
        bindings.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::Quit);
        bindings.insert(KeyBinding::simple(KeyCode::Esc), Action::Close);
        for (code, action) in [
            (KeyCode::Up, Action::MoveUp),
            (KeyCode::Down, Action::MoveDown),
            (KeyCode::Left, Action::PrevPost),
            (KeyCode::Right, Action::NextPost),
            (KeyCode::PageDown, Action::NextPage),
            (KeyCode::PageUp, Action::PrevPage),
        ] {
            bindings.entry(KeyBinding::simple(code)).or_insert(action);
        }

        Self { bindings }
    }

    pub fn get(&self, binding: &KeyBinding) -> Option<&Action> {
        self.bindings.get(binding)
    }
}

/// Parse Vim-style notation: `j`, `G` (shifted), `<C-d>`, `<A-S-x>`, `<CR>`, `<Space>`.
pub fn parse_key_binding(notation: &str) -> Option<KeyBinding> {
    let notation = notation.trim();
    let Some(inner) = notation
        .strip_prefix('<')
        .and_then(|rest| rest.strip_suffix('>'))
        .filter(|inner| !inner.is_empty())
    else {
        let c = single_char(notation)?;
        let modifiers = if c.is_ascii_uppercase() {
            KeyModifiers::SHIFT
        } else {
            KeyModifiers::NONE
        };
        return Some(KeyBinding::new(KeyCode::Char(c), modifiers));
    };

    let mut modifiers = KeyModifiers::NONE;
    let mut rest = inner;
    while let Some((prefix, tail)) = rest.split_once('-') {
        if tail.is_empty() {
            break;
        }
        modifiers |= match prefix.to_ascii_uppercase().as_str() {
            "C" => KeyModifiers::CONTROL,
            "S" => KeyModifiers::SHIFT,
            "A" | "M" => KeyModifiers::ALT,
            _ => return None,
        };
        rest = tail;
    }
    key_code(rest).map(|code| KeyBinding::new(code, modifiers))
}

fn key_code(name: &str) -> Option<KeyCode> {
    let lower = name.to_ascii_lowercase();
    NAMED_KEYS
        .iter()
        .find(|(names, _)| names.contains(&lower.as_str()))
        .map(|(_, code)| *code)
        .or_else(|| single_char(name).map(|c| KeyCode::Char(c.to_ascii_lowercase())))
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    let c = chars.next()?;
    chars.next().is_none().then_some(c)
}
