//! Application state types and entry glue.
//!
//! `AppState` is the single owner of everything the view shows: the fetched
//! records, the visible (sorted + filtered) subset, fetch status, filter and
//! sort inputs, and modal dialogs. Update functions in [`update`] mutate it;
//! the renderer in `crate::ui` only reads it.
//!
pub mod keymap;
pub mod settings;
pub mod update;

use ratatui::style::Color;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::model::{UserField, UserRecord};
use crate::remote::{FetchHandle, FetchStatus};
use crate::search::{FilterCriteria, SortSpec};
use keymap::Keymap;
use settings::Settings;

/// Current input mode for key handling.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Typing into the filter input that has focus.
    EditFilter,
    Modal,
}

/// Color palette for theming the TUI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Theme {
    pub text: Color,
    pub muted: Color,
    pub title: Color,
    pub border: Color,
    pub header_bg: Color,
    pub header_fg: Color,
    pub status_bg: Color,
    pub status_fg: Color,
    pub highlight_fg: Color,
    pub highlight_bg: Color,
    pub stripe_bg: Color,
    pub input_active: Color,
    pub error_fg: Color,
}

/// Keys accepted in `theme.conf`, in the order they are written.
const THEME_KEYS: [&str; 13] = [
    "text",
    "muted",
    "title",
    "border",
    "header_bg",
    "header_fg",
    "status_bg",
    "status_fg",
    "highlight_fg",
    "highlight_bg",
    "stripe_bg",
    "input_active",
    "error_fg",
];

impl Theme {
    /// Plain dark theme using named terminal colors.
    pub fn dark() -> Self {
        Self {
            text: Color::Gray,
            muted: Color::DarkGray,
            title: Color::Cyan,
            border: Color::Gray,
            header_bg: Color::Black,
            header_fg: Color::Cyan,
            status_bg: Color::DarkGray,
            status_fg: Color::Black,
            highlight_fg: Color::Yellow,
            highlight_bg: Color::Reset,
            stripe_bg: Color::Reset,
            input_active: Color::Yellow,
            error_fg: Color::Red,
        }
    }

    /// Catppuccin Mocha palette; the default written on first run.
    pub fn mocha() -> Self {
        // Palette reference: https://github.com/catppuccin/catppuccin
        Self {
            text: Color::Rgb(0xcd, 0xd6, 0xf4),         // text
            muted: Color::Rgb(0x7f, 0x84, 0x9c),        // overlay1
            title: Color::Rgb(0xcb, 0xa6, 0xf7),        // mauve
            border: Color::Rgb(0x58, 0x5b, 0x70),       // surface2
            header_bg: Color::Rgb(0x31, 0x32, 0x44),    // surface0
            header_fg: Color::Rgb(0xb4, 0xbe, 0xfe),    // lavender
            status_bg: Color::Rgb(0x45, 0x47, 0x5a),    // surface1
            status_fg: Color::Rgb(0xcd, 0xd6, 0xf4),    // text
            highlight_fg: Color::Rgb(0xf9, 0xe2, 0xaf), // yellow
            highlight_bg: Color::Rgb(0x45, 0x47, 0x5a), // surface1
            stripe_bg: Color::Rgb(0x18, 0x18, 0x25),    // mantle
            input_active: Color::Rgb(0x89, 0xb4, 0xfa), // blue
            error_fg: Color::Rgb(0xf3, 0x8b, 0xa8),     // red
        }
    }

    fn slot(&mut self, key: &str) -> Option<&mut Color> {
        Some(match key {
            "text" => &mut self.text,
            "muted" => &mut self.muted,
            "title" => &mut self.title,
            "border" => &mut self.border,
            "header_bg" => &mut self.header_bg,
            "header_fg" => &mut self.header_fg,
            "status_bg" => &mut self.status_bg,
            "status_fg" => &mut self.status_fg,
            "highlight_fg" => &mut self.highlight_fg,
            "highlight_bg" => &mut self.highlight_bg,
            "stripe_bg" => &mut self.stripe_bg,
            "input_active" => &mut self.input_active,
            "error_fg" => &mut self.error_fg,
            _ => return None,
        })
    }

    fn get(&self, key: &str) -> Option<Color> {
        let mut copy = *self;
        copy.slot(key).map(|c| *c)
    }

    /// Load from a `key = value` file. Missing or unknown keys keep `mocha` values.
    pub fn from_file(path: &Path) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        let mut theme = Self::mocha();
        for (key, val) in settings::key_values(&contents) {
            if let (Some(slot), Some(color)) = (theme.slot(key), parse_color(val)) {
                *slot = color;
            }
        }
        Some(theme)
    }

    pub fn write_file(&self, path: &Path) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# usertable theme\n");
        buf.push_str("# Colors: #RRGGBB, RRGGBB or 'reset'\n\n");
        for key in THEME_KEYS {
            if let Some(color) = self.get(key) {
                let _ = writeln!(&mut buf, "{key} = {}", color_to_str(color));
            }
        }
        std::fs::write(path, buf)
    }

    /// Read `path`, or write the default theme there when it does not exist.
    pub fn load_or_init(path: &Path) -> Self {
        if path.exists() {
            return Self::from_file(path).unwrap_or_else(Self::mocha);
        }
        let theme = Self::mocha();
        if let Err(e) = theme.write_file(path) {
            tracing::warn!(path = %path.display(), error = %e, "could not write default theme");
        }
        theme
    }
}

fn parse_color(s: &str) -> Option<Color> {
    let lower = s.trim().to_ascii_lowercase();
    if lower == "reset" {
        return Some(Color::Reset);
    }
    let hex = lower.strip_prefix('#').unwrap_or(&lower);
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
}

fn color_to_str(c: Color) -> String {
    let (r, g, b) = match c {
        Color::Rgb(r, g, b) => (r, g, b),
        Color::Reset => return "reset".to_string(),
        // best-effort approximations for named colors
        Color::Black => (0x00, 0x00, 0x00),
        Color::Red | Color::LightRed => (0xff, 0x55, 0x55),
        Color::Green | Color::LightGreen => (0x55, 0xff, 0x55),
        Color::Yellow | Color::LightYellow => (0xff, 0xff, 0x55),
        Color::Blue | Color::LightBlue => (0x55, 0x55, 0xff),
        Color::Magenta | Color::LightMagenta => (0xff, 0x55, 0xff),
        Color::Cyan | Color::LightCyan => (0x55, 0xff, 0xff),
        Color::Gray => (0xb3, 0xb3, 0xb3),
        Color::DarkGray => (0x4d, 0x4d, 0x4d),
        Color::White => (0xff, 0xff, 0xff),
        Color::Indexed(_) => return "reset".to_string(),
    };
    format!("#{r:02X}{g:02X}{b:02X}")
}

/// Modal dialogs shown over the table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModalState {
    Info { title: String, message: String },
    Help { scroll: u16 },
}

pub struct AppState {
    pub started_at: Instant,
    /// Full list from the last successful fetch.
    pub users_all: Vec<UserRecord>,
    /// Visible set: `users_all` sorted then filtered.
    pub users: Vec<UserRecord>,
    pub fetch_status: FetchStatus,
    pub pending_fetch: Option<FetchHandle>,
    pub filters: FilterCriteria,
    pub sort: SortSpec,
    pub filter_focus: UserField,
    pub selected_user_index: usize,
    pub rows_per_page: usize,
    pub input_mode: InputMode,
    pub theme: Theme,
    pub keymap: Keymap,
    pub modal: Option<ModalState>,
    pub settings: Settings,
}

impl AppState {
    /// Empty state with default settings; nothing is fetched yet.
    pub fn new(theme: Theme, keymap: Keymap) -> Self {
        Self {
            started_at: Instant::now(),
            users_all: Vec::new(),
            users: Vec::new(),
            fetch_status: FetchStatus::Idle,
            pending_fetch: None,
            filters: FilterCriteria::default(),
            sort: SortSpec::default(),
            filter_focus: UserField::Name,
            selected_user_index: 0,
            rows_per_page: 10,
            input_mode: InputMode::Normal,
            theme,
            keymap,
            modal: None,
            settings: Settings::default(),
        }
    }

    /// Build state from the config directory: theme and keybindings are
    /// read (or created) there, settings are passed in already resolved.
    pub fn load(config_dir: &Path, settings: Settings) -> Self {
        let theme = Theme::load_or_init(&config_dir.join("theme.conf"));
        let keymap = Keymap::load_or_init(&config_dir.join("keybinds.conf"));
        let mut app = Self::new(theme, keymap);
        app.settings = settings;
        app
    }

    /// Table and filter inputs are only shown once records are in.
    pub fn shows_table(&self) -> bool {
        self.fetch_status == FetchStatus::Succeeded
    }
}

/// Resolve the configuration directory.
///
/// Order: explicit override, `$XDG_CONFIG_HOME/usertable`,
/// `$HOME/.config/usertable`, then the working directory.
pub fn config_dir(override_dir: Option<&Path>) -> PathBuf {
    if let Some(dir) = override_dir {
        return dir.to_path_buf();
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(xdg).join("usertable");
    }
    if let Some(home) = std::env::var_os("HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(home).join(".config").join("usertable");
    }
    PathBuf::from(".")
}

/// Re-export the application event loop entry function.
pub use update::run_app as run;
