// HTTP access to the viaggiatreno endpoints
//
// Every request goes through the configured base prefix (a proxy in front of
// `resteasy/viaggiatreno`). The `TrainDataSource` trait is the seam the
// resolver and the controllers talk to; tests substitute canned sources.

use crate::bt_error::{BTError, Result};
use crate::bt_i18n::MsgKey;
use crate::bt_models::{BoardEntry, BoardKind, StationMatch, Triple, TrainProgress};
use log::debug;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::blocking;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Characters `encodeURIComponent` leaves alone.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub trait TrainDataSource {
    /// Raw autocomplete text: newline-delimited `label|triple` records.
    fn autocomplete(&self, number: &str) -> Result<String>;

    /// `None` when the provider answers 204 or an empty body.
    fn train_progress(&self, triple: &Triple) -> Result<Option<TrainProgress>>;

    fn search_stations(&self, keyword: &str) -> Result<Vec<StationMatch>>;

    fn station_board(&self, station_id: &str, kind: BoardKind, clock: &str) -> Result<Vec<BoardEntry>>;
}

pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}

pub fn autocomplete_url(base: &str, number: &str) -> String {
    format!("{}/cercaNumeroTrenoTrenoAutocomplete/{}", base, number)
}

pub fn train_progress_url(base: &str, triple: &Triple) -> String {
    format!(
        "{}/andamentoTreno/{}/{}/{}",
        base, triple.origin_station_id, triple.train_number, triple.departure_ts
    )
}

pub fn station_search_url(base: &str, keyword: &str) -> String {
    format!("{}/cercaStazione/{}", base, encode_component(keyword))
}

pub fn station_board_url(base: &str, station_id: &str, kind: BoardKind, clock: &str) -> String {
    format!("{}/{}/{}/{}", base, kind.path(), station_id, encode_component(clock))
}

/// Decode a train-progress body; blank means "no real-time data".
pub fn parse_train_progress(body: &str) -> Result<Option<TrainProgress>> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    decode_json(body).map(Some)
}

/// Decode a list body; blank or `null` is an empty list.
pub fn parse_list<T: DeserializeOwned>(body: &str) -> Result<Vec<T>> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(decode_json::<Option<Vec<T>>>(body)?.unwrap_or_default())
}

fn decode_json<T: DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| BTError::ParseError(format!("Invalid JSON response: {}", e)))
}

// ============================================================================
// Blocking HTTP client
// ============================================================================

pub struct ApiClient {
    base: String,
    client: blocking::Client,
}

impl ApiClient {
    pub fn new(base: &str, timeout_secs: u64) -> Result<Self> {
        let client = blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| BTError::network(MsgKey::SearchFailed, format!("Failed to create HTTP client: {}", e)))?;

        Ok(ApiClient {
            base: base.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// GET `url`, returning the status and the body text.
    fn get_text(&self, url: &str, context: MsgKey) -> Result<(StatusCode, String)> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| BTError::network(context, format!("{}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BTError::network(context, format!("HTTP {}", status)));
        }

        let body = response
            .text()
            .map_err(|e| BTError::network(context, format!("Failed to read response: {}", e)))?;

        Ok((status, body))
    }
}

impl TrainDataSource for ApiClient {
    fn autocomplete(&self, number: &str) -> Result<String> {
        let (_, body) = self.get_text(&autocomplete_url(&self.base, number), MsgKey::SearchFailed)?;
        Ok(body)
    }

    fn train_progress(&self, triple: &Triple) -> Result<Option<TrainProgress>> {
        let (status, body) = self.get_text(&train_progress_url(&self.base, triple), MsgKey::DetailsFailed)?;
        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        parse_train_progress(&body).map_err(|e| BTError::network(MsgKey::DetailsFailed, e.to_string()))
    }

    fn search_stations(&self, keyword: &str) -> Result<Vec<StationMatch>> {
        let (_, body) = self.get_text(&station_search_url(&self.base, keyword), MsgKey::SearchFailed)?;
        parse_list(&body).map_err(|e| BTError::network(MsgKey::SearchFailed, e.to_string()))
    }

    fn station_board(&self, station_id: &str, kind: BoardKind, clock: &str) -> Result<Vec<BoardEntry>> {
        let url = station_board_url(&self.base, station_id, kind, clock);
        let (_, body) = self.get_text(&url, MsgKey::BoardFailed)?;
        parse_list(&body).map_err(|e| BTError::network(MsgKey::BoardFailed, e.to_string()))
    }
}
