// Status phrase localization, delay classification and clock formatting

use crate::bt_config::Lang;
use crate::bt_i18n::{t, MsgKey};
use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Europe::Rome;
use lazy_static::lazy_static;
use regex::{NoExpand, Regex};
use serde::Serialize;

lazy_static! {
    static ref NOT_DEPARTED: Regex = Regex::new(r"(?i)non partito").unwrap();
    static ref MINUTES: Regex = Regex::new(r"(\d+)\s*min\.").unwrap();
}

const EARLY_OR_ON_TIME_MARKERS: [&str; 3] = ["anticipo", "orario", "early"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusClassification {
    pub localized_text: String,
    pub is_early_or_on_time: bool,
}

/// "15 min" / "15分钟"
pub fn minutes_phrase(lang: Lang, minutes: &str) -> String {
    match lang {
        Lang::Zh => format!("{}{}", minutes, t(lang, MsgKey::Minutes)),
        _ => format!("{} {}", minutes, t(lang, MsgKey::Minutes)),
    }
}

/// Substitute each recognised Italian sub-phrase; everything else, numerals
/// included, is left as it was. Italian text passes through untouched.
pub fn localize_status(raw: &str, lang: Lang) -> String {
    if lang == Lang::It {
        return raw.to_string();
    }

    let text = NOT_DEPARTED
        .replace_all(raw, NoExpand(t(lang, MsgKey::StatusNotDeparted)))
        .replace("con un anticipo di", t(lang, MsgKey::StatusEarlyBy))
        .replace("con un ritardo di", t(lang, MsgKey::StatusDelayedBy))
        .replace("in orario", t(lang, MsgKey::StatusOnTime));

    MINUTES
        .replace_all(&text, |caps: &regex::Captures| minutes_phrase(lang, &caps[1]))
        .into_owned()
}

/// Localize the provider's status phrase and tell whether the train runs early
/// or on time. The raw-text check catches languages whose translation drops
/// the markers.
pub fn classify_status(raw: &str, lang: Lang) -> StatusClassification {
    let localized_text = localize_status(raw, lang);

    let localized_marker = localized_text.contains(t(lang, MsgKey::StatusEarlyBy))
        || localized_text.contains(t(lang, MsgKey::StatusOnTime));

    let raw_lower = raw.to_lowercase();
    let raw_marker = EARLY_OR_ON_TIME_MARKERS.iter().any(|m| raw_lower.contains(m));

    StatusClassification {
        localized_text,
        is_early_or_on_time: localized_marker || raw_marker,
    }
}

/// Localize a provider duration ("h:mm").
pub fn format_duration(duration: Option<&str>, lang: Lang) -> String {
    let Some(duration) = duration.map(str::trim).filter(|d| !d.is_empty()) else {
        return t(lang, MsgKey::NotAvailable).to_string();
    };

    let parts: Vec<&str> = duration.split(':').collect();
    if let [hours, mins] = parts.as_slice() {
        if let (Ok(hours), Ok(mins)) = (hours.trim().parse::<u32>(), mins.trim().parse::<u32>()) {
            return match lang {
                Lang::Zh => format!("{}小时{}分钟", hours, mins),
                _ => format!("{}h:{}min", hours, mins),
            };
        }
    }

    duration.to_string()
}

// ============================================================================
// Clock helpers (all wall-clock values are Italian local time)
// ============================================================================

fn rome_time(ms: i64) -> Option<DateTime<chrono_tz::Tz>> {
    Utc.timestamp_millis_opt(ms).single().map(|dt| dt.with_timezone(&Rome))
}

/// "HH:MM" in Italian local time.
pub fn format_clock(ms: i64) -> Option<String> {
    rome_time(ms).map(|dt| dt.format("%H:%M").to_string())
}

/// "dd/mm/yy" in Italian local time.
pub fn format_short_date(ms: i64) -> Option<String> {
    rome_time(ms).map(|dt| dt.format("%d/%m/%y").to_string())
}

/// Board request clock, e.g. "Sun Jan 18 2026 08:52:00 GMT+0100".
/// The offset comes from the Europe/Rome rules, so DST transitions are exact.
pub fn italian_clock_string(now: DateTime<Utc>) -> String {
    now.with_timezone(&Rome)
        .format("%a %b %d %Y %H:%M:%S GMT%z")
        .to_string()
}
