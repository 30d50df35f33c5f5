// Application state owned by the interaction loop

use crate::bt_config::{Lang, Theme};
use crate::bt_error::Result;
use crate::bt_models::Triple;
use crate::bt_navigation::BoardRequest;
use crate::bt_store::{KeyValueStore, KEY_LANGUAGE, KEY_THEME};
use log::warn;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    #[default]
    Train,
    Station,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub lang: Lang,
    pub theme: Theme,
    pub search_mode: SearchMode,
    /// Run shown in the detail view, kept for refresh.
    pub current_triple: Option<Triple>,
    pub current_board: Option<BoardRequest>,
}

fn stored<T: FromStr>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring stored {} value '{}'", key, raw);
            None
        }
    }
}

impl AppState {
    /// Language: explicit override, then the saved preference, then the
    /// system locale. Theme: saved preference, else auto.
    pub fn load(store: &dyn KeyValueStore, lang_override: Option<Lang>) -> Self {
        let lang = lang_override
            .or_else(|| stored::<Lang>(store, KEY_LANGUAGE))
            .unwrap_or_else(Lang::detect);
        let theme = stored::<Theme>(store, KEY_THEME).unwrap_or_default();

        AppState {
            lang,
            theme,
            search_mode: SearchMode::default(),
            current_triple: None,
            current_board: None,
        }
    }

    pub fn set_lang(&mut self, store: &dyn KeyValueStore, lang: Lang) -> Result<()> {
        self.lang = lang;
        store.set(KEY_LANGUAGE, lang.code())
    }

    pub fn set_theme(&mut self, store: &dyn KeyValueStore, theme: Theme) -> Result<()> {
        self.theme = theme;
        store.set(KEY_THEME, theme.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bt_store::MemoryStore;
    use serial_test::serial;

    #[test]
    #[serial]
    fn defaults_come_from_locale() {
        temp_env::with_vars(
            [("LC_ALL", None), ("LC_MESSAGES", None), ("LANG", Some("it_IT.UTF-8"))],
            || {
                let state = AppState::load(&MemoryStore::new(), None);
                assert_eq!(state.lang, Lang::It);
                assert_eq!(state.theme, Theme::Auto);
                assert_eq!(state.search_mode, SearchMode::Train);
            },
        );
    }

    #[test]
    #[serial]
    fn saved_preferences_win_over_locale() {
        temp_env::with_vars([("LC_ALL", Some("zh_CN.UTF-8"))], || {
            let store = MemoryStore::new();
            let mut state = AppState::load(&store, None);
            assert_eq!(state.lang, Lang::Zh);

            state.set_lang(&store, Lang::En).unwrap();
            state.set_theme(&store, Theme::Dark).unwrap();

            let reloaded = AppState::load(&store, None);
            assert_eq!(reloaded.lang, Lang::En);
            assert_eq!(reloaded.theme, Theme::Dark);

            assert_eq!(AppState::load(&store, Some(Lang::It)).lang, Lang::It);
        });
    }

    #[test]
    fn garbage_preferences_are_ignored() {
        let store = MemoryStore::new();
        store.set(KEY_LANGUAGE, "klingon").unwrap();
        store.set(KEY_THEME, "sepia").unwrap();
        let state = AppState::load(&store, Some(Lang::En));
        assert_eq!(state.lang, Lang::En);
        assert_eq!(state.theme, Theme::Auto);
    }
}
