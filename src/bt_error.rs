// Error handling for BelloTreno

use crate::bt_config::Lang;
use crate::bt_i18n::{t, MsgKey};

#[derive(Debug)]
pub enum BTError {
    /// Empty or malformed user input.
    Validation(MsgKey),
    /// The provider has no match for the query.
    NotFound(MsgKey),
    /// Fetch failed; `context` names the operation shown to the user.
    Network { context: MsgKey, reason: String },
    ParseError(String),
    FileError(String),
    Config(String),
}

impl BTError {
    pub fn network(context: MsgKey, reason: impl Into<String>) -> Self {
        BTError::Network {
            context,
            reason: reason.into(),
        }
    }

    /// User-facing text in the active language.
    pub fn localized(&self, lang: Lang) -> String {
        match self {
            BTError::Validation(key) | BTError::NotFound(key) => t(lang, *key).to_string(),
            BTError::Network { context, reason } => format!("{}: {}", t(lang, *context), reason),
            BTError::ParseError(e) => format!("{}: {}", t(lang, MsgKey::SearchFailed), e),
            BTError::FileError(e) | BTError::Config(e) => e.clone(),
        }
    }
}

impl std::fmt::Display for BTError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BTError::Validation(key) => write!(f, "Validation error: {}", t(Lang::En, *key)),
            BTError::NotFound(key) => write!(f, "Not found: {}", t(Lang::En, *key)),
            BTError::Network { context, reason } => {
                write!(f, "Network error: {} ({})", t(Lang::En, *context), reason)
            }
            BTError::ParseError(e) => write!(f, "Parse error: {}", e),
            BTError::FileError(e) => write!(f, "File error: {}", e),
            BTError::Config(e) => write!(f, "Configuration error: {}", e),
        }
    }
}

impl std::error::Error for BTError {}

pub type Result<T> = std::result::Result<T, BTError>;
