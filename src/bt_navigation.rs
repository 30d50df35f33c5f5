// Navigation contract: query strings that open a station board or a train
// lookup, plus the best-effort deep-link retry.

use crate::bt_error::{BTError, Result};
use crate::bt_i18n::MsgKey;
use crate::bt_models::BoardKind;
use log::{error, warn};
use std::thread;
use std::time::Duration;
use url::form_urlencoded;

pub const DEEP_LINK_ATTEMPTS: u32 = 10;
pub const DEEP_LINK_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardRequest {
    pub station_id: String,
    pub station_name: String,
    pub kind: BoardKind,
}

impl BoardRequest {
    pub fn departures(station_id: &str, station_name: &str) -> Self {
        BoardRequest {
            station_id: station_id.to_string(),
            station_name: station_name.to_string(),
            kind: BoardKind::Departures,
        }
    }

    /// Same station, other board.
    pub fn switched(&self, kind: BoardKind) -> Self {
        BoardRequest { kind, ..self.clone() }
    }

    /// `id=..&name=..&type=partenze|arrivi`
    pub fn to_query(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .append_pair("id", &self.station_id)
            .append_pair("name", &self.station_name)
            .append_pair("type", self.kind.path())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Board(BoardRequest),
    /// Deep link: run the train search for this number.
    TrainLookup(String),
    Home,
}

/// Parse a query string (leading `?` optional). A station id selects the
/// board; otherwise a non-blank `train` parameter selects a lookup.
pub fn parse_route(query: &str) -> Result<Route> {
    let query = query.trim().trim_start_matches('?');

    let mut id = None;
    let mut name = None;
    let mut kind = None;
    let mut train = None;
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        match &*key {
            "id" => id = Some(value.trim().to_string()),
            "name" => name = Some(value.into_owned()),
            "type" => kind = Some(value.parse::<BoardKind>()?),
            "train" => train = Some(value.trim().to_string()),
            _ => {}
        }
    }

    if let Some(station_id) = id.filter(|s| !s.is_empty()) {
        return Ok(Route::Board(BoardRequest {
            station_name: name.unwrap_or_else(|| station_id.clone()),
            station_id,
            kind: kind.unwrap_or(BoardKind::Departures),
        }));
    }

    match train.filter(|t| !t.is_empty()) {
        Some(number) => Ok(Route::TrainLookup(number)),
        None if query.is_empty() => Ok(Route::Home),
        None => Err(BTError::Validation(MsgKey::InvalidLink)),
    }
}

/// Poll `probe` until it yields a value, sleeping `interval` between tries.
/// Gives up after `attempts` tries; exhaustion is logged and nothing else.
pub fn retry_until_ready<T>(mut probe: impl FnMut() -> Option<T>, attempts: u32, interval: Duration) -> Option<T> {
    for attempt in 1..=attempts {
        if let Some(ready) = probe() {
            return Some(ready);
        }
        if attempt < attempts {
            warn!("Search surface not ready, retrying ({}/{})", attempt, attempts);
            thread::sleep(interval);
        }
    }
    error!("Search surface still unavailable after {} attempts, deep link dropped", attempts);
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_query_round_trip() {
        let request = BoardRequest::departures("S01700", "MILANO CENTRALE");
        let query = request.to_query();
        assert_eq!(query, "id=S01700&name=MILANO+CENTRALE&type=partenze");
        assert_eq!(parse_route(&format!("?{}", query)).unwrap(), Route::Board(request));
    }

    #[test]
    fn board_defaults() {
        let route = parse_route("id=S08409").unwrap();
        assert_eq!(
            route,
            Route::Board(BoardRequest {
                station_id: "S08409".to_string(),
                station_name: "S08409".to_string(),
                kind: BoardKind::Departures,
            })
        );
        assert!(matches!(
            parse_route("id=S08409&type=binari"),
            Err(BTError::Validation(MsgKey::UnknownBoardType))
        ));
    }

    #[test]
    fn train_deep_link() {
        assert_eq!(parse_route("?train=%209633%20").unwrap(), Route::TrainLookup("9633".to_string()));
        assert_eq!(parse_route("").unwrap(), Route::Home);
        let err = parse_route("train=").unwrap_err();
        assert!(matches!(err, BTError::Validation(MsgKey::InvalidLink)));
        assert_eq!(err.localized(crate::bt_config::Lang::It), "Impossibile aprire il collegamento");
    }

    #[test]
    fn retry_succeeds_on_later_attempt() {
        let mut calls = 0;
        let result = retry_until_ready(
            || {
                calls += 1;
                (calls == 3).then_some("ready")
            },
            DEEP_LINK_ATTEMPTS,
            Duration::from_millis(1),
        );
        assert_eq!(result, Some("ready"));
        assert_eq!(calls, 3);
    }

    #[test]
    fn retry_gives_up_after_ten_attempts() {
        let mut calls = 0;
        let result: Option<()> = retry_until_ready(
            || {
                calls += 1;
                None
            },
            DEEP_LINK_ATTEMPTS,
            Duration::from_millis(1),
        );
        assert_eq!(result, None);
        assert_eq!(calls, 10);
    }
}
