//! Keybinding configuration: parse `keybinds.conf`, provide defaults, and map keys to actions.
//!
//! Bindings are looked up in normal mode only; while a filter input is being
//! edited, printable keys go into the filter text.

use std::collections::HashMap;
use std::path::Path;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::model::UserField;

/// Semantic keyboard actions that can be bound to key combinations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyAction {
    /// Exit the application.
    Quit,
    /// Display the help/keybindings reference.
    OpenHelp,
    /// Start editing the focused filter input.
    EditFilters,
    /// Move filter focus to the next input.
    NextFilter,
    /// Move filter focus to the previous input.
    PrevFilter,
    /// Reset all filter inputs to empty (sort is kept).
    ClearFilters,
    /// Sort by a column; pressing again flips the direction.
    SortBy(UserField),
    /// Back to fetch order.
    ClearSort,
    ExportCsv,
    ExportPdf,
    /// Fetch the user list again.
    Reload,
    MoveUp,
    MoveDown,
    PageUp,
    PageDown,
    /// Swallow the key.
    Ignore,
}

impl KeyAction {
    const NAMED: [(&'static str, KeyAction); 18] = [
        ("Quit", KeyAction::Quit),
        ("OpenHelp", KeyAction::OpenHelp),
        ("EditFilters", KeyAction::EditFilters),
        ("NextFilter", KeyAction::NextFilter),
        ("PrevFilter", KeyAction::PrevFilter),
        ("ClearFilters", KeyAction::ClearFilters),
        ("SortByName", KeyAction::SortBy(UserField::Name)),
        ("SortByUsername", KeyAction::SortBy(UserField::Username)),
        ("SortByEmail", KeyAction::SortBy(UserField::Email)),
        ("SortByPhone", KeyAction::SortBy(UserField::Phone)),
        ("ClearSort", KeyAction::ClearSort),
        ("ExportCsv", KeyAction::ExportCsv),
        ("ExportPdf", KeyAction::ExportPdf),
        ("Reload", KeyAction::Reload),
        ("MoveUp", KeyAction::MoveUp),
        ("MoveDown", KeyAction::MoveDown),
        ("PageUp", KeyAction::PageUp),
        ("PageDown", KeyAction::PageDown),
    ];

    pub fn name(self) -> &'static str {
        if self == KeyAction::Ignore {
            return "Ignore";
        }
        Self::NAMED
            .iter()
            .find(|(_, a)| *a == self)
            .map(|(n, _)| *n)
            .unwrap_or("Ignore")
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s == "Ignore" {
            return Some(KeyAction::Ignore);
        }
        Self::NAMED.iter().find(|(n, _)| *n == s).map(|(_, a)| *a)
    }

    /// Short description used by the help dialog.
    pub fn describe(self) -> String {
        match self {
            KeyAction::Quit => "Quit".into(),
            KeyAction::OpenHelp => "Help".into(),
            KeyAction::EditFilters => "Edit filters".into(),
            KeyAction::NextFilter => "Next filter".into(),
            KeyAction::PrevFilter => "Previous filter".into(),
            KeyAction::ClearFilters => "Clear filters".into(),
            KeyAction::SortBy(f) => format!("Sort by {}", f.label()),
            KeyAction::ClearSort => "Clear sort".into(),
            KeyAction::ExportCsv => "Export CSV".into(),
            KeyAction::ExportPdf => "Export PDF".into(),
            KeyAction::Reload => "Reload".into(),
            KeyAction::MoveUp => "Move up".into(),
            KeyAction::MoveDown => "Move down".into(),
            KeyAction::PageUp => "Page up".into(),
            KeyAction::PageDown => "Page down".into(),
            KeyAction::Ignore => "Ignore".into(),
        }
    }
}

/// Mapping from `(KeyModifiers, KeyCode)` to [`KeyAction`].
#[derive(Clone, Debug)]
pub struct Keymap {
    bindings: HashMap<(KeyModifiers, KeyCode), KeyAction>,
}

impl Keymap {
    pub fn new_defaults() -> Self {
        use KeyCode::*;
        use KeyModifiers as M;
        let mut bindings = HashMap::new();
        bindings.insert((M::NONE, Char('q')), KeyAction::Quit);
        bindings.insert((M::NONE, Esc), KeyAction::Ignore);
        bindings.insert((M::NONE, Char('?')), KeyAction::OpenHelp);
        bindings.insert((M::NONE, Char('/')), KeyAction::EditFilters);
        bindings.insert((M::NONE, Tab), KeyAction::NextFilter);
        // Shift+Tab arrives as BackTab, sometimes with SHIFT set
        bindings.insert((M::NONE, BackTab), KeyAction::PrevFilter);
        bindings.insert((M::SHIFT, BackTab), KeyAction::PrevFilter);
        bindings.insert((M::NONE, Char('x')), KeyAction::ClearFilters);
        bindings.insert((M::NONE, Char('1')), KeyAction::SortBy(UserField::Name));
        bindings.insert((M::NONE, Char('2')), KeyAction::SortBy(UserField::Username));
        bindings.insert((M::NONE, Char('3')), KeyAction::SortBy(UserField::Email));
        bindings.insert((M::NONE, Char('4')), KeyAction::SortBy(UserField::Phone));
        bindings.insert((M::NONE, Char('0')), KeyAction::ClearSort);
        bindings.insert((M::NONE, Char('c')), KeyAction::ExportCsv);
        bindings.insert((M::NONE, Char('p')), KeyAction::ExportPdf);
        bindings.insert((M::NONE, Char('r')), KeyAction::Reload);
        bindings.insert((M::NONE, Up), KeyAction::MoveUp);
        bindings.insert((M::NONE, Down), KeyAction::MoveDown);
        bindings.insert((M::NONE, Char('k')), KeyAction::MoveUp);
        bindings.insert((M::NONE, Char('j')), KeyAction::MoveDown);
        bindings.insert((M::NONE, Left), KeyAction::PageUp);
        bindings.insert((M::NONE, Right), KeyAction::PageDown);
        bindings.insert((M::NONE, Char('h')), KeyAction::PageUp);
        bindings.insert((M::NONE, Char('l')), KeyAction::PageDown);
        bindings.insert((M::NONE, KeyCode::PageUp), KeyAction::PageUp);
        bindings.insert((M::NONE, KeyCode::PageDown), KeyAction::PageDown);
        Self { bindings }
    }

    /// Read `path`, or write the default keymap there when it does not exist.
    pub fn load_or_init(path: &Path) -> Self {
        if path.exists() {
            return Self::from_file(path).unwrap_or_default();
        }
        let km = Self::default();
        if let Err(e) = km.write_file(path) {
            tracing::warn!(path = %path.display(), error = %e, "could not write default keymap");
        }
        km
    }

    /// Start from defaults and apply `Action = KeySpec` lines.
    /// The legacy `KeySpec = Action` order is accepted too.
    pub fn from_file(path: &Path) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        let mut map = Self::default();
        for (lhs, rhs) in super::settings::key_values(&contents) {
            if let (Some(action), Some(key)) = (KeyAction::parse(lhs), parse_key(rhs)) {
                map.bindings.insert(key, action);
            } else if let (Some(key), Some(action)) = (parse_key(lhs), KeyAction::parse(rhs)) {
                map.bindings.insert(key, action);
            }
        }
        Some(map)
    }

    pub fn write_file(&self, path: &Path) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# usertable keybindings\n");
        buf.push_str("# Format: <Action> = <KeySpec>\n");
        buf.push_str("# KeySpec examples: q, Ctrl+q, Enter, Esc, Tab, BackTab, Up, Down, Left, Right, PageUp, PageDown, /, 1\n\n");
        let mut lines: Vec<(String, String)> = self
            .bindings
            .iter()
            .filter(|(_, a)| **a != KeyAction::Ignore)
            .map(|((m, c), a)| (a.name().to_string(), Self::format_key(*m, *c)))
            .collect();
        lines.sort();
        for (action, key) in lines {
            let _ = writeln!(&mut buf, "{action} = {key}");
        }
        std::fs::write(path, buf)
    }

    /// Resolve a key event to the action bound to it.
    ///
    /// Lookup is exact on modifiers and key code, so `Shift+Tab` needs its own
    /// entry even when `BackTab` is bound.
    ///
    /// # Arguments
    ///
    /// * `key` - The key event read from the terminal.
    ///
    /// # Returns
    ///
    /// `Some(action)` when the key is bound, `None` otherwise.
    pub fn resolve(&self, key: &KeyEvent) -> Option<KeyAction> {
        self.bindings.get(&(key.modifiers, key.code)).copied()
    }

    /// Snapshot of all bindings as ((modifiers, code), action) pairs.
    ///
    /// Used to build the help modal and to write `keybinds.conf`.
    ///
    /// # Returns
    ///
    /// The bindings in no particular order.
    pub fn all_bindings(&self) -> Vec<((KeyModifiers, KeyCode), KeyAction)> {
        self.bindings.iter().map(|(k, v)| (*k, *v)).collect()
    }

    /// Human-readable key spec like `Ctrl+q` or `BackTab`.
    pub fn format_key(mods: KeyModifiers, code: KeyCode) -> String {
        use KeyCode::*;
        let base = match code {
            Enter => "Enter".to_string(),
            Esc => "Esc".to_string(),
            Tab => "Tab".to_string(),
            BackTab => "BackTab".to_string(),
            Up => "Up".to_string(),
            Down => "Down".to_string(),
            Left => "Left".to_string(),
            Right => "Right".to_string(),
            PageUp => "PageUp".to_string(),
            PageDown => "PageDown".to_string(),
            Char(c) => c.to_string(),
            _ => format!("{code:?}"),
        };
        if mods.contains(KeyModifiers::CONTROL) {
            format!("Ctrl+{base}")
        } else {
            base
        }
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::new_defaults()
    }
}

fn parse_key(spec: &str) -> Option<(KeyModifiers, KeyCode)> {
    use KeyCode::*;
    let (mods, rest) = match spec.trim().strip_prefix("Ctrl+") {
        Some(after) => (KeyModifiers::CONTROL, after),
        None => (KeyModifiers::NONE, spec.trim()),
    };
    let code = match rest {
        "Enter" => Enter,
        "Esc" | "Escape" => Esc,
        "Tab" => Tab,
        "BackTab" => BackTab,
        "Up" => Up,
        "Down" => Down,
        "Left" => Left,
        "Right" => Right,
        "PageUp" => PageUp,
        "PageDown" => PageDown,
        _ => {
            let mut chars = rest.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Char(c),
                _ => return None,
            }
        }
    };
    Some((mods, code))
}
