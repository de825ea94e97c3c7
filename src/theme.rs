use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

pub const THEME_STORAGE_KEY: &str = "websiteTheme";

#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Fixed toggle order.
    pub const CYCLE: [Theme; 2] = [Theme::Light, Theme::Dark];

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn next(self) -> Theme {
        let index = Self::CYCLE.iter().position(|t| *t == self).unwrap_or(0);
        Self::CYCLE[(index + 1) % Self::CYCLE.len()]
    }

    /// Icon offering the other theme.
    pub fn icon(self) -> &'static str {
        match self {
            Theme::Light => "🌙",
            Theme::Dark => "☀️",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Theme::CYCLE
            .into_iter()
            .find(|theme| theme.as_str() == value)
            .ok_or_else(|| format!("unknown theme {value:?}"))
    }
}

/// Durable key-value storage for the theme flag (`localStorage` in the browser).
pub trait ThemeStore {
    fn load(&self, key: &str) -> Option<String>;
    fn save(&mut self, key: &str, value: &str);
}

impl ThemeStore for HashMap<String, String> {
    fn load(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }

    fn save(&mut self, key: &str, value: &str) {
        self.insert(key.to_string(), value.to_string());
    }
}

pub struct ThemeSwitcher<S> {
    store: S,
    key: String,
    current: Theme,
}

impl<S: ThemeStore> ThemeSwitcher<S> {
    pub fn new(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            current: Theme::default(),
        }
    }

    /// Restores the persisted theme. Missing or unknown values mean light.
    pub fn init(&mut self) -> Theme {
        self.current = match self.store.load(&self.key) {
            Some(raw) => raw.parse().unwrap_or_else(|err| {
                tracing::debug!(%err, "ignoring persisted theme");
                Theme::default()
            }),
            None => Theme::default(),
        };
        self.current
    }

    pub fn toggle(&mut self) -> Theme {
        self.current = self.current.next();
        self.store.save(&self.key, self.current.as_str());
        tracing::debug!(theme = %self.current, "theme toggled");
        self.current
    }

    pub fn current(&self) -> Theme {
        self.current
    }

    pub fn icon(&self) -> &'static str {
        self.current.icon()
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
