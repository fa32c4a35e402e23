//! User configuration: engine tunables, key bindings and persistence.
//!
//! Settings are stored as a simple key-value text file at
//! `$XDG_CONFIG_HOME/glowtrail/config.toml` (default
//! `~/.config/glowtrail/config.toml`).  Values that fail to parse are
//! skipped with a warning and the default stays in effect.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::warn;

use crate::core::engine::EngineConfig;
use crate::core::scheduler::{MAX_TARGET_FPS, MIN_TARGET_FPS};
use crate::core::trail::MAX_CAPACITY;
use crate::core::visibility::RootMargin;

// ───────────────────────────────────────── actions ───────────

/// All configurable user actions on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    Top,
    Bottom,
    ToggleTrail,
    ToggleHud,
    Quit,
}

impl Action {
    /// Ordered list of all actions (used for persistence).
    pub const ALL: &[Action] = &[
        Action::ScrollUp,
        Action::ScrollDown,
        Action::PageUp,
        Action::PageDown,
        Action::Top,
        Action::Bottom,
        Action::ToggleTrail,
        Action::ToggleHud,
        Action::Quit,
    ];

    /// Key used in the config file.
    fn config_key(self) -> &'static str {
        match self {
            Action::ScrollUp => "scroll_up",
            Action::ScrollDown => "scroll_down",
            Action::PageUp => "page_up",
            Action::PageDown => "page_down",
            Action::Top => "top",
            Action::Bottom => "bottom",
            Action::ToggleTrail => "toggle_trail",
            Action::ToggleHud => "toggle_hud",
            Action::Quit => "quit",
        }
    }

    fn from_config_key(s: &str) -> Option<Self> {
        Action::ALL.iter().copied().find(|a| a.config_key() == s)
    }
}

// ───────────────────────────────────────── key bind ──────────

/// A single key binding: key code + modifier combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBind {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

/// Named keys understood in the config file, besides single characters.
const NAMED_KEYS: &[(&str, KeyCode)] = &[
    ("Up", KeyCode::Up),
    ("Down", KeyCode::Down),
    ("Left", KeyCode::Left),
    ("Right", KeyCode::Right),
    ("Enter", KeyCode::Enter),
    ("Esc", KeyCode::Esc),
    ("Tab", KeyCode::Tab),
    ("Home", KeyCode::Home),
    ("End", KeyCode::End),
    ("PageUp", KeyCode::PageUp),
    ("PageDown", KeyCode::PageDown),
    ("Space", KeyCode::Char(' ')),
];

impl KeyBind {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Does this binding match a key event?  Only CTRL/ALT/SHIFT modifiers
    /// are compared.
    pub fn matches(&self, event: KeyEvent) -> bool {
        let mask = KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SHIFT;
        self.code == event.code && (self.modifiers & mask) == (event.modifiers & mask)
    }

    /// Config-file form, e.g. `"Ctrl+c"`, `"PageDown"`, `"j"`.
    pub fn to_config_string(&self) -> String {
        let mut s = String::new();
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            s.push_str("Ctrl+");
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            s.push_str("Alt+");
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) {
            s.push_str("Shift+");
        }
        match NAMED_KEYS.iter().find(|(_, code)| *code == self.code) {
            Some((name, _)) => s.push_str(name),
            None => match self.code {
                KeyCode::Char(c) => s.push(c),
                other => s.push_str(&format!("{other:?}")),
            },
        }
        s
    }

    /// Parse a key string like `"Ctrl+c"`, `"PageUp"`, `"q"`.
    fn parse(s: &str) -> Option<Self> {
        let mut modifiers = KeyModifiers::NONE;
        let parts: Vec<&str> = s.split('+').collect();
        let (key_part, mods) = parts.split_last()?;

        for part in mods {
            match part.to_lowercase().as_str() {
                "ctrl" => modifiers |= KeyModifiers::CONTROL,
                "alt" => modifiers |= KeyModifiers::ALT,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                _ => return None,
            }
        }

        let code = NAMED_KEYS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key_part))
            .map(|(_, code)| *code)
            .or_else(|| {
                let mut chars = key_part.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(KeyCode::Char(c)),
                    _ => None,
                }
            })?;

        Some(KeyBind { code, modifiers })
    }
}

// ───────────────────────────────────────── config ────────────

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bindings: HashMap<Action, Vec<KeyBind>>,
    /// Engine tunables.
    pub engine: EngineConfig,
    /// Logical pixels per terminal cell, used to map the grid into the
    /// engine's coordinate space when the terminal does not report pixels.
    pub cell_width: f64,
    pub cell_height: f64,
    /// Period of the display-refresh signal.
    pub refresh: Duration,
    /// Smooth-scroll ease factor per refresh, in `(0, 1)`.
    pub scroll_speed: f64,
    /// Play the typewriter intro before the page.
    pub intro: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bindings: Self::default_bindings(),
            engine: EngineConfig::default(),
            cell_width: 10.0,
            cell_height: 20.0,
            refresh: Duration::from_millis(16),
            scroll_speed: 0.25,
            intro: true,
        }
    }
}

impl AppConfig {
    pub fn default_bindings() -> HashMap<Action, Vec<KeyBind>> {
        use Action::*;
        use KeyCode::*;
        let n = KeyModifiers::NONE;
        let mut m = HashMap::new();

        m.insert(ScrollUp, vec![KeyBind::new(Up, n), KeyBind::new(Char('k'), n)]);
        m.insert(ScrollDown, vec![KeyBind::new(Down, n), KeyBind::new(Char('j'), n)]);
        m.insert(Action::PageUp, vec![KeyBind::new(KeyCode::PageUp, n)]);
        m.insert(
            Action::PageDown,
            vec![KeyBind::new(KeyCode::PageDown, n), KeyBind::new(Char(' '), n)],
        );
        m.insert(Top, vec![KeyBind::new(Home, n), KeyBind::new(Char('t'), n)]);
        m.insert(Bottom, vec![KeyBind::new(End, n)]);
        m.insert(ToggleTrail, vec![KeyBind::new(Char('g'), n)]);
        m.insert(ToggleHud, vec![KeyBind::new(Char('h'), n)]);
        m.insert(Quit, vec![KeyBind::new(Char('q'), n), KeyBind::new(Esc, n)]);

        m
    }

    /// Find the action that matches a key event.  When several bindings
    /// match, the one with the most modifiers wins.
    pub fn match_key(&self, event: KeyEvent) -> Option<Action> {
        self.bindings
            .iter()
            .flat_map(|(&action, binds)| binds.iter().map(move |b| (action, b)))
            .filter(|(_, bind)| bind.matches(event))
            .max_by_key(|(_, bind)| bind.modifiers.bits().count_ones())
            .map(|(action, _)| action)
    }

    /// Short display of the first binding of `action` (for the status bar).
    pub fn short_binding(&self, action: Action) -> String {
        match self.bindings.get(&action) {
            Some(binds) if !binds.is_empty() => binds[0].to_config_string(),
            _ => "?".into(),
        }
    }

    /// Build the status-bar hint string from current bindings.
    pub fn status_bar_hint(&self) -> String {
        format!(
            "{}/{}: scroll | {}: trail | {}: hud | {}: quit",
            self.short_binding(Action::ScrollUp),
            self.short_binding(Action::ScrollDown),
            self.short_binding(Action::ToggleTrail),
            self.short_binding(Action::ToggleHud),
            self.short_binding(Action::Quit),
        )
    }

    // ── persistence ─────────────────────────────────────────────

    /// Load config from disk, falling back to defaults.
    pub fn load() -> Self {
        let path = config_path();
        match std::fs::read_to_string(&path) {
            Ok(contents) => Self::parse(&contents),
            Err(_) => Self::default(),
        }
    }

    /// Persist current config to disk.
    pub fn save(&self) -> anyhow::Result<()> {
        let path = config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, self.serialise())?;
        Ok(())
    }

    pub fn parse(s: &str) -> Self {
        let mut cfg = Self::default();

        for (lineno, line) in s.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim().trim_matches('"');

            match cfg.apply_setting(key, value) {
                Some(true) => continue,
                Some(false) => {
                    warn!(line = lineno + 1, key, value, "ignoring invalid config value");
                    continue;
                }
                None => {}
            }

            let Some(action) = Action::from_config_key(key) else {
                warn!(line = lineno + 1, key, "unknown config key");
                continue;
            };
            let parsed: Vec<KeyBind> = value
                .split(',')
                .filter_map(|part| KeyBind::parse(part.trim().trim_matches('"')))
                .collect();
            if !parsed.is_empty() {
                cfg.bindings.insert(action, parsed);
            }
        }

        if let Err(e) = cfg.engine.validate() {
            warn!(error = %e, "engine settings rejected, using defaults");
            cfg.engine = EngineConfig::default();
        }
        cfg
    }

    /// Apply one scalar setting.  `None` when `key` is not a setting,
    /// otherwise whether `value` was accepted.
    fn apply_setting(&mut self, key: &str, value: &str) -> Option<bool> {
        let num = value.parse::<f64>().ok().filter(|v| v.is_finite());
        let e = &mut self.engine;
        let ok = match key {
            "sample_interval_ms" => set_ms(&mut e.sample_interval, num),
            "target_fps" => set_in(&mut e.target_fps, num, |v| {
                (MIN_TARGET_FPS..=MAX_TARGET_FPS).contains(&v)
            }),
            "decay" => set_in(&mut e.trail.decay, num, |v| v > 0.0 && v < 1.0),
            "prune_epsilon" => set_in(&mut e.trail.prune_epsilon, num, |v| v > 0.0 && v < 1.0),
            "min_distance" => set_in(&mut e.trail.min_distance, num, |v| v >= 0.0),
            "capacity" => match value.parse::<usize>() {
                Ok(v) if (1..=MAX_CAPACITY).contains(&v) => {
                    e.trail.capacity = v;
                    true
                }
                _ => false,
            },
            "intersection_threshold" => {
                set_in(&mut e.observer.threshold, num, |v| (0.0..=1.0).contains(&v))
            }
            "root_margin" => match RootMargin::parse(value) {
                Ok(m) => {
                    e.observer.margin = m;
                    true
                }
                Err(_) => false,
            },
            "mobile_cutoff" => set_in(&mut e.mobile_cutoff, num, |v| v >= 0.0),
            "cell_width" => set_positive(&mut self.cell_width, num),
            "cell_height" => set_positive(&mut self.cell_height, num),
            "refresh_ms" => set_ms(&mut self.refresh, num),
            "scroll_speed" => set_in(&mut self.scroll_speed, num, |v| v > 0.0 && v < 1.0),
            "intro" => match value {
                "true" | "false" => {
                    self.intro = value == "true";
                    true
                }
                _ => false,
            },
            _ => return None,
        };
        Some(ok)
    }

    pub fn serialise(&self) -> String {
        let e = &self.engine;
        let m = e.observer.margin;
        let mut lines = vec![
            "# glowtrail configuration".to_string(),
            String::new(),
            "# Trail engine".to_string(),
            format!("sample_interval_ms = {}", e.sample_interval.as_millis()),
            format!("target_fps = {}", e.target_fps),
            format!("decay = {}", e.trail.decay),
            format!("prune_epsilon = {}", e.trail.prune_epsilon),
            format!("min_distance = {}", e.trail.min_distance),
            format!("capacity = {}", e.trail.capacity),
            format!("mobile_cutoff = {}", e.mobile_cutoff),
            String::new(),
            "# Reveal tracking".to_string(),
            format!("intersection_threshold = {}", e.observer.threshold),
            format!(
                "root_margin = \"{}px {}px {}px {}px\"",
                m.top, m.right, m.bottom, m.left
            ),
            String::new(),
            "# Terminal host".to_string(),
            format!("cell_width = {}", self.cell_width),
            format!("cell_height = {}", self.cell_height),
            format!("refresh_ms = {}", self.refresh.as_millis()),
            format!("scroll_speed = {}", self.scroll_speed),
            format!("intro = {}", self.intro),
            String::new(),
            "# Key bindings".to_string(),
            "# Format: action = Key1, Key2, ...".to_string(),
            "# Modifiers: Ctrl+, Alt+, Shift+ (prefix)".to_string(),
            String::new(),
        ];

        for &action in Action::ALL {
            if let Some(binds) = self.bindings.get(&action) {
                let keys: Vec<String> = binds.iter().map(|b| b.to_config_string()).collect();
                lines.push(format!("{} = {}", action.config_key(), keys.join(", ")));
            }
        }
        lines.push(String::new());
        lines.join("\n")
    }
}

fn set_in(slot: &mut f64, value: Option<f64>, valid: impl Fn(f64) -> bool) -> bool {
    match value {
        Some(v) if valid(v) => {
            *slot = v;
            true
        }
        _ => false,
    }
}

fn set_positive(slot: &mut f64, value: Option<f64>) -> bool {
    set_in(slot, value, |v| v > 0.0)
}

fn set_ms(slot: &mut Duration, value: Option<f64>) -> bool {
    match value {
        Some(v) if v >= 1.0 => {
            *slot = Duration::from_millis(v as u64);
            true
        }
        _ => false,
    }
}

/// Return the config file path (`$XDG_CONFIG_HOME/glowtrail/config.toml`).
fn config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
    config_dir.join("glowtrail").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialised_config_parses_back() {
        let mut cfg = AppConfig::default();
        cfg.engine.trail.decay = 0.92;
        cfg.engine.trail.capacity = 30;
        cfg.engine.observer.threshold = 0.2;
        cfg.cell_width = 8.0;
        cfg.intro = false;
        cfg.bindings
            .insert(Action::Quit, vec![KeyBind::new(KeyCode::Char('c'), KeyModifiers::CONTROL)]);

        let back = AppConfig::parse(&cfg.serialise());
        assert_eq!(back.engine, cfg.engine);
        assert_eq!(back.cell_width, 8.0);
        assert!(!back.intro);
        assert_eq!(back.bindings, cfg.bindings);
    }

    #[test]
    fn invalid_values_keep_defaults() {
        let cfg = AppConfig::parse("decay = 1.5\ncapacity = 0\nroot_margin = 3em\nbogus = 1\n");
        assert_eq!(cfg.engine, EngineConfig::default());
    }

    #[test]
    fn extreme_rates_and_capacities_are_ignored() {
        let cfg = AppConfig::parse(
            "target_fps = 1e-30\ncapacity = 9223372036854775807\nmin_distance = 4\n",
        );
        assert_eq!(cfg.engine.target_fps, EngineConfig::default().target_fps);
        assert_eq!(cfg.engine.trail.capacity, EngineConfig::default().trail.capacity);
        assert_eq!(cfg.engine.trail.min_distance, 4.0);
        assert!(cfg.engine.validate().is_ok());
    }

    #[test]
    fn partial_file_overrides_only_given_keys() {
        let cfg = AppConfig::parse("# comment\n[engine]\nmin_distance = 5\nscroll_up = w\n");
        assert_eq!(cfg.engine.trail.min_distance, 5.0);
        assert_eq!(cfg.engine.trail.decay, 0.95);
        assert_eq!(
            cfg.bindings[&Action::ScrollUp],
            vec![KeyBind::new(KeyCode::Char('w'), KeyModifiers::NONE)]
        );
    }

    #[test]
    fn key_strings_parse() {
        assert_eq!(
            KeyBind::parse("Ctrl+c"),
            Some(KeyBind::new(KeyCode::Char('c'), KeyModifiers::CONTROL))
        );
        assert_eq!(
            KeyBind::parse("pagedown"),
            Some(KeyBind::new(KeyCode::PageDown, KeyModifiers::NONE))
        );
        assert_eq!(KeyBind::parse("Hyper+x"), None);
        assert_eq!(KeyBind::parse("xyz"), None);
    }

    #[test]
    fn most_specific_binding_wins() {
        let mut cfg = AppConfig::default();
        cfg.bindings
            .insert(Action::Bottom, vec![KeyBind::new(KeyCode::Char('j'), KeyModifiers::ALT)]);
        let plain = KeyEvent::new(KeyCode::Char('j'), KeyModifiers::NONE);
        let alt = KeyEvent::new(KeyCode::Char('j'), KeyModifiers::ALT);
        assert_eq!(cfg.match_key(plain), Some(Action::ScrollDown));
        assert_eq!(cfg.match_key(alt), Some(Action::Bottom));
    }
}
