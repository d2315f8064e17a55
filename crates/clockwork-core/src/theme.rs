use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::storage::{keys, Persistence};

/// Colour scheme preference, stored as the bare string `light` or `dark`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Stored theme, or `Light` when absent or unrecognised.
    pub fn load(persistence: &Persistence) -> Self {
        persistence
            .load_raw(keys::THEME)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default()
    }

    pub fn save(&self, persistence: &Persistence) {
        persistence.save_raw(keys::THEME, self.as_str());
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(CoreError::Custom(format!(
                "unknown theme '{other}' (expected light or dark)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_theme_defaults_to_light() {
        assert_eq!(Theme::load(&Persistence::memory()), Theme::Light);
    }

    #[test]
    fn stored_as_bare_string() {
        let p = Persistence::memory();
        Theme::Dark.save(&p);
        assert_eq!(p.load_raw(keys::THEME).as_deref(), Some("dark"));
        assert_eq!(Theme::load(&p), Theme::Dark);
    }

    #[test]
    fn toggle_and_parse() {
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!("DARK".parse::<Theme>().unwrap(), Theme::Dark);
        assert!("blue".parse::<Theme>().is_err());
    }
}
