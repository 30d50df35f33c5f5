// Runtime configuration for BelloTreno
//
// Environment (and an optional `.env` file) supplies the endpoint prefixes and
// the state directory; CLI flags override them in `main`.

use crate::bt_error::{BTError, Result};
use crate::bt_i18n::MsgKey;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_API_BASE: &str =
    "https://ah.bellotreno.workers.dev/?url=https://www.viaggiatreno.it/infomobilita/resteasy/viaggiatreno";
pub const DEFAULT_RSS_PROXY: &str = "https://api.bellotreno.org/?url=";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

// ============================================================================
// Language & Theme
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    Zh,
    En,
    It,
}

impl Lang {
    pub const ALL: [Lang; 3] = [Lang::Zh, Lang::En, Lang::It];

    pub fn code(self) -> &'static str {
        match self {
            Lang::Zh => "zh",
            Lang::En => "en",
            Lang::It => "it",
        }
    }

    /// Pick a language from a locale tag such as `it_IT.UTF-8` or `zh-CN`.
    pub fn from_locale(locale: &str) -> Lang {
        let locale = locale.trim().to_lowercase();
        if locale.starts_with("zh") {
            Lang::Zh
        } else if locale.starts_with("it") {
            Lang::It
        } else {
            Lang::En
        }
    }

    /// Language of the surrounding system, read from the usual locale variables.
    pub fn detect() -> Lang {
        ["LC_ALL", "LC_MESSAGES", "LANG"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|value| !value.is_empty())
            .map(|value| Lang::from_locale(&value))
            .unwrap_or(Lang::En)
    }
}

impl FromStr for Lang {
    type Err = BTError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "zh" => Ok(Lang::Zh),
            "en" => Ok(Lang::En),
            "it" => Ok(Lang::It),
            _ => Err(BTError::Validation(MsgKey::UnsupportedLanguage)),
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Auto,
    Light,
    Dark,
}

/// Concrete palette once `Auto` has been resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Palette {
    Light,
    Dark,
}

impl Theme {
    pub fn code(self) -> &'static str {
        match self {
            Theme::Auto => "auto",
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Resolve `Auto` from the terminal's `COLORFGBG` hint ("fg;bg").
    pub fn palette(self, colorfgbg: Option<&str>) -> Palette {
        match self {
            Theme::Light => Palette::Light,
            Theme::Dark => Palette::Dark,
            Theme::Auto => {
                let background = colorfgbg
                    .and_then(|v| v.rsplit(';').next())
                    .and_then(|bg| bg.trim().parse::<u8>().ok());
                match background {
                    Some(7) | Some(15) => Palette::Light,
                    _ => Palette::Dark,
                }
            }
        }
    }
}

impl FromStr for Theme {
    type Err = BTError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Theme::Auto),
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(BTError::Validation(MsgKey::UnsupportedTheme)),
        }
    }
}

// ============================================================================
// Config
// ============================================================================

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base: String,
    pub rss_proxy: String,
    pub state_dir: PathBuf,
    pub timeout_secs: u64,
    pub lang_override: Option<Lang>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let api_base = dotenvy::var("BELLOTRENO_API_BASE")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let rss_proxy = dotenvy::var("BELLOTRENO_RSS_PROXY")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_RSS_PROXY.to_string());

        let state_dir = match dotenvy::var("BELLOTRENO_STATE_DIR") {
            Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => Self::default_state_dir(),
        };

        let timeout_secs = match dotenvy::var("BELLOTRENO_TIMEOUT_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| BTError::Config(format!("Invalid BELLOTRENO_TIMEOUT_SECS '{}'", raw)))?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        let lang_override = match dotenvy::var("BELLOTRENO_LANG") {
            Ok(raw) if !raw.trim().is_empty() => Some(
                raw.parse::<Lang>()
                    .map_err(|_| BTError::Config(format!("Invalid BELLOTRENO_LANG '{}'", raw)))?,
            ),
            _ => None,
        };

        Ok(Config {
            api_base: api_base.trim_end_matches('/').to_string(),
            rss_proxy,
            state_dir,
            timeout_secs,
            lang_override,
        })
    }

    fn default_state_dir() -> PathBuf {
        let mut path = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("bellotreno");
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn locale_detection() {
        assert_eq!(Lang::from_locale("zh_CN.UTF-8"), Lang::Zh);
        assert_eq!(Lang::from_locale("it-IT"), Lang::It);
        assert_eq!(Lang::from_locale("de_DE"), Lang::En);
        assert_eq!(Lang::from_locale(""), Lang::En);
    }

    #[test]
    fn auto_theme_follows_terminal_background() {
        assert_eq!(Theme::Auto.palette(Some("0;15")), Palette::Light);
        assert_eq!(Theme::Auto.palette(Some("15;0")), Palette::Dark);
        assert_eq!(Theme::Auto.palette(None), Palette::Dark);
        assert_eq!(Theme::Light.palette(Some("15;0")), Palette::Light);
    }

    #[test]
    fn parse_lang_and_theme() {
        assert_eq!("IT".parse::<Lang>().unwrap(), Lang::It);
        assert!("fr".parse::<Lang>().is_err());
        assert_eq!("dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert!("sepia".parse::<Theme>().is_err());
    }

    #[test]
    #[serial]
    fn config_defaults_and_overrides() {
        temp_env::with_vars(
            [
                ("BELLOTRENO_API_BASE", Some("http://localhost:9000/vt/")),
                ("BELLOTRENO_RSS_PROXY", None),
                ("BELLOTRENO_STATE_DIR", Some("/tmp/bt-state")),
                ("BELLOTRENO_TIMEOUT_SECS", Some("3")),
                ("BELLOTRENO_LANG", Some("zh")),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.api_base, "http://localhost:9000/vt");
                assert_eq!(config.rss_proxy, DEFAULT_RSS_PROXY);
                assert_eq!(config.state_dir, PathBuf::from("/tmp/bt-state"));
                assert_eq!(config.timeout_secs, 3);
                assert_eq!(config.lang_override, Some(Lang::Zh));
            },
        );
    }

    #[test]
    #[serial]
    fn config_rejects_bad_timeout() {
        temp_env::with_vars([("BELLOTRENO_TIMEOUT_SECS", Some("soon"))], || {
            assert!(matches!(Config::from_env(), Err(BTError::Config(_))));
        });
    }
}
