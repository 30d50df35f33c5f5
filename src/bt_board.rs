// Station-board formatter: departure and arrival rows

use crate::bt_api::TrainDataSource;
use crate::bt_catalog::split_train_number;
use crate::bt_config::Lang;
use crate::bt_error::{BTError, Result};
use crate::bt_i18n::{t, MsgKey};
use crate::bt_models::{non_blank, BoardEntry, BoardKind, BoardRow, PlatformView, StatusColor};
use crate::bt_navigation::BoardRequest;
use crate::bt_status::italian_clock_string;
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

const NO_TIME: &str = "--:--";
const CANCELLED: i64 = 1;

lazy_static! {
    // "/.../regolare.png10:44" -> "10:44"
    static ref TRAILING_CLOCK: Regex = Regex::new(r"(\d{2}:\d{2})$").unwrap();
}

/// Peer station of a board row. The foreign name is used only when it adds
/// information: it must differ from the counterpart endpoint and from the
/// board's own station.
pub fn peer_station(
    domestic: Option<&str>,
    foreign: Option<&str>,
    counterpart: Option<&str>,
    board_station: &str,
) -> String {
    match non_blank(foreign) {
        Some(f)
            if Some(f.as_str()) != counterpart.map(str::trim)
                && f.to_uppercase() != board_station.trim().to_uppercase() =>
        {
            f
        }
        _ => non_blank(domestic).unwrap_or_default(),
    }
}

fn delay_text(lang: Lang, key: MsgKey, minutes: i64) -> String {
    format!("{} {} {}", t(lang, key), minutes, t(lang, MsgKey::Minutes))
}

fn is_cancelled(entry: &BoardEntry) -> bool {
    entry.provvedimento == Some(CANCELLED)
}

/// cancelled > delayed > not departed > on time
pub fn departure_status(entry: &BoardEntry, lang: Lang) -> (String, StatusColor) {
    let delay = entry.ritardo.unwrap_or(0);
    if is_cancelled(entry) {
        (t(lang, MsgKey::BoardCancelled).to_string(), StatusColor::Red)
    } else if delay > 0 {
        (delay_text(lang, MsgKey::BoardDelayed, delay), StatusColor::Red)
    } else if entry.non_partito {
        (t(lang, MsgKey::BoardNotDeparted).to_string(), StatusColor::Grey)
    } else {
        (t(lang, MsgKey::BoardOnTime).to_string(), StatusColor::Green)
    }
}

/// cancelled > delayed > early > on time
pub fn arrival_status(entry: &BoardEntry, lang: Lang) -> (String, StatusColor) {
    let delay = entry.ritardo.unwrap_or(0);
    if is_cancelled(entry) {
        (t(lang, MsgKey::BoardCancelled).to_string(), StatusColor::Red)
    } else if delay > 0 {
        (delay_text(lang, MsgKey::BoardDelayed, delay), StatusColor::Red)
    } else if delay < 0 {
        (delay_text(lang, MsgKey::BoardEarly, delay.abs()), StatusColor::Green)
    } else {
        (t(lang, MsgKey::BoardOnTime).to_string(), StatusColor::Green)
    }
}

pub fn format_departure(entry: &BoardEntry, lang: Lang, station_context: &str) -> BoardRow {
    let (status, status_color) = departure_status(entry, lang);

    BoardRow {
        kind: BoardKind::Departures,
        scheduled_time: non_blank(entry.comp_orario_partenza.as_deref()).unwrap_or_else(|| NO_TIME.to_string()),
        actual_time: None,
        train: split_train_number(entry.comp_numero_treno.as_deref().unwrap_or_default()),
        train_number: entry.numero_treno,
        peer_station: peer_station(
            entry.destinazione.as_deref(),
            entry.destinazione_estera.as_deref(),
            entry.origine.as_deref(),
            station_context,
        ),
        status,
        status_color,
        platform: PlatformView::from_pair(
            entry.binario_programmato_partenza.as_deref(),
            entry.binario_effettivo_partenza.as_deref(),
        ),
        in_station: entry.in_stazione,
    }
}

pub fn format_arrival(entry: &BoardEntry, lang: Lang, station_context: &str) -> BoardRow {
    let (status, status_color) = arrival_status(entry, lang);
    let scheduled_time = non_blank(entry.comp_orario_arrivo.as_deref()).unwrap_or_else(|| NO_TIME.to_string());

    let actual_time = entry
        .comp_orario_effettivo_arrivo
        .as_deref()
        .and_then(|raw| TRAILING_CLOCK.captures(raw.trim()))
        .map(|caps| caps[1].to_string())
        .unwrap_or_else(|| scheduled_time.clone());

    BoardRow {
        kind: BoardKind::Arrivals,
        scheduled_time,
        actual_time: Some(actual_time),
        train: split_train_number(entry.comp_numero_treno.as_deref().unwrap_or_default()),
        train_number: entry.numero_treno,
        peer_station: peer_station(
            entry.origine.as_deref(),
            entry.origine_estera.as_deref(),
            entry.destinazione.as_deref(),
            station_context,
        ),
        status,
        status_color,
        platform: PlatformView::from_pair(
            entry.binario_programmato_arrivo.as_deref(),
            entry.binario_effettivo_arrivo.as_deref(),
        ),
        in_station: entry.in_stazione,
    }
}

pub fn format_board(entries: &[BoardEntry], kind: BoardKind, lang: Lang, station_context: &str) -> Vec<BoardRow> {
    entries
        .iter()
        .map(|entry| match kind {
            BoardKind::Departures => format_departure(entry, lang, station_context),
            BoardKind::Arrivals => format_arrival(entry, lang, station_context),
        })
        .collect()
}

/// Fetch one board as seen from Italy at `now` and format its rows.
pub fn load_board(
    source: &dyn TrainDataSource,
    request: &BoardRequest,
    lang: Lang,
    now: DateTime<Utc>,
) -> Result<Vec<BoardRow>> {
    let clock = italian_clock_string(now);
    debug!("Loading {} board for {} at {}", request.kind.path(), request.station_id, clock);

    let entries = source
        .station_board(&request.station_id, request.kind, &clock)
        .map_err(|e| match e {
            BTError::Network { .. } => e,
            other => BTError::network(MsgKey::BoardFailed, other.to_string()),
        })?;
    Ok(format_board(&entries, request.kind, lang, &request.station_name))
}
