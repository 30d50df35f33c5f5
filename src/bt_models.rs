// Data models for the viaggiatreno infomobility provider
//
// Upstream payloads keep the provider's Italian field names (mapped through
// serde renames). Timestamps are epoch milliseconds; the provider reports
// "not yet realized" as either null or 0, both of which land here as `None`.
//
// Endpoints (relative to the configured proxy prefix):
// - cercaNumeroTrenoTrenoAutocomplete/{number}   -> "label|triple" lines
// - andamentoTreno/{originId}/{number}/{ts}      -> TrainProgress (204 when empty)
// - cercaStazione/{keyword}                      -> [StationMatch]
// - partenze|arrivi/{stationId}/{clock}          -> [BoardEntry]

use crate::bt_catalog::{Classification, TrainNumberBadge};
use crate::bt_error::{BTError, Result};
use crate::bt_i18n::MsgKey;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Lenient field decoding
// ============================================================================

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn millis<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_i64(deserializer)?.filter(|ms| *ms != 0))
}

/// Accepts a number, a numeric string, or null.
fn lenient_i64<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(serde_json::Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    })
}

/// Trim a provider string; blank values count as absent.
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(String::from)
}

// ============================================================================
// Upstream payloads
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainProgress {
    #[serde(rename = "numeroTreno", default, deserialize_with = "lenient_i64")]
    pub numero_treno: Option<i64>,
    #[serde(default)]
    pub categoria: Option<String>,
    #[serde(rename = "categoriaDescrizione", default)]
    pub categoria_descrizione: Option<String>,
    #[serde(rename = "compNumeroTreno", default)]
    pub comp_numero_treno: Option<String>,
    #[serde(rename = "compCategoria", default)]
    pub comp_categoria: Option<String>,
    #[serde(rename = "codiceCliente", default, deserialize_with = "lenient_i64")]
    pub codice_cliente: Option<i64>,
    #[serde(default)]
    pub origine: Option<String>,
    #[serde(default)]
    pub destinazione: Option<String>,
    #[serde(rename = "origineEstera", default)]
    pub origine_estera: Option<String>,
    #[serde(rename = "destinazioneEstera", default)]
    pub destinazione_estera: Option<String>,
    #[serde(rename = "nonPartito", default, deserialize_with = "null_as_default")]
    pub non_partito: bool,
    #[serde(rename = "compRitardoAndamento", default, deserialize_with = "null_as_default")]
    pub comp_ritardo_andamento: Vec<String>,
    #[serde(rename = "compDurata", default)]
    pub comp_durata: Option<String>,
    #[serde(rename = "stazioneUltimoRilevamento", default)]
    pub stazione_ultimo_rilevamento: Option<String>,
    #[serde(rename = "compOraUltimoRilevamento", default)]
    pub comp_ora_ultimo_rilevamento: Option<String>,
    #[serde(rename = "subTitle", default)]
    pub sub_title: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fermate: Vec<Stop>,
}

/// One station visit within a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stop {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stazione: String,
    #[serde(default, deserialize_with = "millis")]
    pub arrivo_teorico: Option<i64>,
    #[serde(default, deserialize_with = "millis")]
    pub partenza_teorica: Option<i64>,
    #[serde(default, deserialize_with = "millis")]
    pub programmata: Option<i64>,
    #[serde(rename = "arrivoReale", default, deserialize_with = "millis")]
    pub arrivo_reale: Option<i64>,
    #[serde(rename = "partenzaReale", default, deserialize_with = "millis")]
    pub partenza_reale: Option<i64>,
    #[serde(rename = "ritardoArrivo", default, deserialize_with = "lenient_i64")]
    pub ritardo_arrivo: Option<i64>,
    #[serde(rename = "ritardoPartenza", default, deserialize_with = "lenient_i64")]
    pub ritardo_partenza: Option<i64>,
    #[serde(rename = "binarioProgrammatoArrivoDescrizione", default)]
    pub binario_programmato_arrivo: Option<String>,
    #[serde(rename = "binarioEffettivoArrivoDescrizione", default)]
    pub binario_effettivo_arrivo: Option<String>,
    #[serde(rename = "binarioProgrammatoPartenzaDescrizione", default)]
    pub binario_programmato_partenza: Option<String>,
    #[serde(rename = "binarioEffettivoPartenzaDescrizione", default)]
    pub binario_effettivo_partenza: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub progressivo: Option<i64>,
    #[serde(default)]
    pub orientamento: Option<String>,
}

/// One row of a departures or arrivals board.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoardEntry {
    #[serde(rename = "numeroTreno", default, deserialize_with = "lenient_i64")]
    pub numero_treno: Option<i64>,
    #[serde(rename = "compNumeroTreno", default)]
    pub comp_numero_treno: Option<String>,
    #[serde(default)]
    pub origine: Option<String>,
    #[serde(default)]
    pub destinazione: Option<String>,
    #[serde(rename = "origineEstera", default)]
    pub origine_estera: Option<String>,
    #[serde(rename = "destinazioneEstera", default)]
    pub destinazione_estera: Option<String>,
    #[serde(rename = "compOrarioPartenza", default)]
    pub comp_orario_partenza: Option<String>,
    #[serde(rename = "compOrarioArrivo", default)]
    pub comp_orario_arrivo: Option<String>,
    #[serde(rename = "compOrarioEffettivoArrivo", default)]
    pub comp_orario_effettivo_arrivo: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub ritardo: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub provvedimento: Option<i64>,
    #[serde(rename = "nonPartito", default, deserialize_with = "null_as_default")]
    pub non_partito: bool,
    #[serde(rename = "inStazione", default, deserialize_with = "null_as_default")]
    pub in_stazione: bool,
    #[serde(rename = "binarioProgrammatoPartenzaDescrizione", default)]
    pub binario_programmato_partenza: Option<String>,
    #[serde(rename = "binarioEffettivoPartenzaDescrizione", default)]
    pub binario_effettivo_partenza: Option<String>,
    #[serde(rename = "binarioProgrammatoArrivoDescrizione", default)]
    pub binario_programmato_arrivo: Option<String>,
    #[serde(rename = "binarioEffettivoArrivoDescrizione", default)]
    pub binario_effettivo_arrivo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationMatch {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(rename = "nomeLungo", default, deserialize_with = "null_as_default")]
    pub nome_lungo: String,
}

// ============================================================================
// Triple & candidates
// ============================================================================

/// `trainNumber-originStationId-departureTimestamp`: the key of one scheduled run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub train_number: String,
    pub origin_station_id: String,
    pub departure_ts: i64,
}

impl FromStr for Triple {
    type Err = BTError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split('-').collect();
        let [train_number, origin_station_id, ts] = parts.as_slice() else {
            return Err(BTError::ParseError(format!("Malformed train key '{}'", s)));
        };

        let departure_ts = ts
            .parse::<i64>()
            .map_err(|_| BTError::ParseError(format!("Malformed departure timestamp in '{}'", s)))?;

        if train_number.is_empty() || origin_station_id.is_empty() {
            return Err(BTError::ParseError(format!("Malformed train key '{}'", s)));
        }

        Ok(Triple {
            train_number: train_number.to_string(),
            origin_station_id: origin_station_id.to_string(),
            departure_ts,
        })
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.train_number, self.origin_station_id, self.departure_ts)
    }
}

/// One autocomplete match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrainCandidate {
    pub label: String,
    pub triple: Triple,
}

impl TrainCandidate {
    /// Parse one `label|triple` autocomplete record.
    pub fn parse_line(line: &str) -> Result<Self> {
        let (label, triple) = line
            .split_once('|')
            .ok_or_else(|| BTError::ParseError(format!("Autocomplete record without key: '{}'", line)))?;

        Ok(TrainCandidate {
            label: label.trim().to_string(),
            triple: triple.parse()?,
        })
    }
}

// ============================================================================
// View models
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopState {
    Passed,
    Current,
    Future,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformView {
    /// Platform moved: the actual one is emphasized, the scheduled one struck through.
    Changed { scheduled: String, actual: String },
    Single(String),
    Unknown,
}

impl PlatformView {
    pub fn from_pair(scheduled: Option<&str>, actual: Option<&str>) -> Self {
        match (non_blank(scheduled), non_blank(actual)) {
            (Some(s), Some(a)) if s != a => PlatformView::Changed { scheduled: s, actual: a },
            (_, Some(a)) => PlatformView::Single(a),
            (Some(s), None) => PlatformView::Single(s),
            (None, None) => PlatformView::Unknown,
        }
    }
}

/// Arrival or departure time of one stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeCell {
    /// Nothing realized yet; only the timetable is known.
    Expected { scheduled: Option<String> },
    /// Realized. `scheduled` is set only when it differs from `actual`.
    Actual {
        scheduled: Option<String>,
        actual: String,
        late: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dwell {
    /// First or last stop.
    NotApplicable,
    Unknown,
    Minutes(i64),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Executive coach at the head of the train ('B').
    ExecutiveHead,
    /// Executive coach at the tail of the train ('A').
    ExecutiveTail,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopView {
    pub station_id: String,
    pub station_name: String,
    pub state: StopState,
    /// Track segment leaving this stop has been covered.
    pub segment_active: bool,
    pub arrival: Option<TimeCell>,
    pub departure: Option<TimeCell>,
    pub dwell: Dwell,
    pub platform: PlatformView,
    pub progressivo: Option<i64>,
    pub orientation: Option<Orientation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainHeaderView {
    pub classification: Classification,
    pub train_number: String,
    pub origin: String,
    pub destination: String,
    pub duration: String,
    pub status_text: String,
    pub is_early_or_on_time: bool,
    pub last_position: Option<String>,
    pub last_position_time: Option<String>,
    pub alert: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainDetailView {
    pub header: TrainHeaderView,
    pub stops: Vec<StopView>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardKind {
    #[serde(rename = "partenze")]
    Departures,
    #[serde(rename = "arrivi")]
    Arrivals,
}

impl BoardKind {
    pub fn path(self) -> &'static str {
        match self {
            BoardKind::Departures => "partenze",
            BoardKind::Arrivals => "arrivi",
        }
    }
}

impl FromStr for BoardKind {
    type Err = BTError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "partenze" => Ok(BoardKind::Departures),
            "arrivi" => Ok(BoardKind::Arrivals),
            _ => Err(BTError::Validation(MsgKey::UnknownBoardType)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusColor {
    Red,
    Green,
    Grey,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardRow {
    pub kind: BoardKind,
    pub scheduled_time: String,
    /// Arrivals only: realized or forecast arrival time.
    pub actual_time: Option<String>,
    pub train: TrainNumberBadge,
    pub train_number: Option<i64>,
    /// Destination on departure boards, origin on arrival boards.
    pub peer_station: String,
    pub status: String,
    pub status_color: StatusColor,
    pub platform: PlatformView,
    pub in_station: bool,
}
