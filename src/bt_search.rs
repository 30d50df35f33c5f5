// Train-search resolver and station search
//
//   Idle -> AutocompleteFetching -> Disambiguating -> DetailFetching -> Idle
//                                \----------------------------------/
//
// One autocomplete record skips the disambiguation step. Any failure drops
// the resolver back to Idle and hands the error to the caller.
//
// There is no duplicate-request guard: two searches started back to back both
// go out to the provider.

use crate::bt_api::TrainDataSource;
use crate::bt_config::Lang;
use crate::bt_error::{BTError, Result};
use crate::bt_i18n::MsgKey;
use crate::bt_models::{StationMatch, TrainCandidate, TrainDetailView, TrainProgress, Triple};
use crate::bt_navigation::BoardRequest;
use crate::bt_recent::{RecentSearchEntry, RecentSearchRegistry};
use crate::bt_timeline::normalize;
use log::{debug, warn};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchState {
    Idle,
    AutocompleteFetching,
    Disambiguating(Vec<TrainCandidate>),
    DetailFetching(Triple),
}

#[derive(Debug, Clone)]
pub enum SearchOutcome {
    /// Several runs share the number; the user has to pick one.
    Disambiguation(Vec<TrainCandidate>),
    Resolved {
        triple: Triple,
        progress: TrainProgress,
        view: TrainDetailView,
    },
    /// The provider answered with no content for this run.
    NoDataYet,
}

/// Keep only the digits of what the user typed.
pub fn sanitize_train_input(input: &str) -> Result<String> {
    let digits: String = input.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return Err(BTError::Validation(MsgKey::EnterValidTrainNumber));
    }
    Ok(digits)
}

/// Split the autocomplete text into candidates. Blank lines are ignored and
/// records without a usable key are skipped.
pub fn parse_autocomplete(text: &str) -> Result<Vec<TrainCandidate>> {
    let candidates: Vec<TrainCandidate> = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match TrainCandidate::parse_line(line) {
            Ok(candidate) => Some(candidate),
            Err(e) => {
                warn!("Skipping autocomplete record: {}", e);
                None
            }
        })
        .collect();

    if candidates.is_empty() {
        return Err(BTError::NotFound(MsgKey::TrainNotFound));
    }
    Ok(candidates)
}

/// Recent-list key of a resolved run, e.g. "REG 2345" or just "2345".
pub fn recent_train_id(progress: &TrainProgress, triple: &Triple) -> String {
    let number = progress
        .numero_treno
        .map(|n| n.to_string())
        .unwrap_or_else(|| triple.train_number.clone());
    format!("{} {}", progress.comp_categoria.as_deref().unwrap_or_default(), number)
        .trim()
        .to_string()
}

pub struct TrainSearchResolver {
    source: Arc<dyn TrainDataSource>,
    recent: Option<Arc<RecentSearchRegistry>>,
    state: SearchState,
}

impl TrainSearchResolver {
    pub fn new(source: Arc<dyn TrainDataSource>, recent: Option<Arc<RecentSearchRegistry>>) -> Self {
        TrainSearchResolver {
            source,
            recent,
            state: SearchState::Idle,
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// Candidates awaiting a choice, if any.
    pub fn candidates(&self) -> Option<&[TrainCandidate]> {
        match &self.state {
            SearchState::Disambiguating(candidates) => Some(candidates),
            _ => None,
        }
    }

    /// The user navigated away: forget any pending choice.
    pub fn reset(&mut self) {
        self.state = SearchState::Idle;
    }

    pub fn start(&mut self, input: &str, lang: Lang) -> Result<SearchOutcome> {
        self.state = SearchState::AutocompleteFetching;

        let result = sanitize_train_input(input)
            .and_then(|number| {
                debug!("Autocomplete for train {}", number);
                self.source.autocomplete(&number).map_err(|e| as_network(e, MsgKey::SearchFailed))
            })
            .and_then(|text| parse_autocomplete(&text));

        let mut candidates = match result {
            Ok(candidates) => candidates,
            Err(e) => {
                self.state = SearchState::Idle;
                return Err(e);
            }
        };

        if candidates.len() > 1 {
            self.state = SearchState::Disambiguating(candidates.clone());
            return Ok(SearchOutcome::Disambiguation(candidates));
        }

        let only = candidates.remove(0);
        self.fetch_details(only.triple, lang)
    }

    /// Pick one of the pending candidates (zero-based). The pending set is
    /// consumed even if the detail fetch then fails.
    pub fn choose(&mut self, index: usize, lang: Lang) -> Result<SearchOutcome> {
        let candidates = match std::mem::replace(&mut self.state, SearchState::Idle) {
            SearchState::Disambiguating(candidates) => candidates,
            other => {
                self.state = other;
                return Err(BTError::Validation(MsgKey::SelectTrain));
            }
        };

        if index >= candidates.len() {
            self.state = SearchState::Disambiguating(candidates);
            return Err(BTError::Validation(MsgKey::SelectTrain));
        }

        let triple = candidates[index].triple.clone();
        self.fetch_details(triple, lang)
    }

    /// Fetch and normalize one run. Also used for refresh.
    pub fn fetch_details(&mut self, triple: Triple, lang: Lang) -> Result<SearchOutcome> {
        self.state = SearchState::DetailFetching(triple.clone());
        let fetched = self.source.train_progress(&triple);
        self.state = SearchState::Idle;

        let progress = match fetched.map_err(|e| as_network(e, MsgKey::DetailsFailed))? {
            Some(progress) => progress,
            None => return Ok(SearchOutcome::NoDataYet),
        };

        if let Some(recent) = &self.recent {
            let entry = RecentSearchEntry::train(
                &recent_train_id(&progress, &triple),
                progress.origine.as_deref(),
                progress.destinazione.as_deref(),
            );
            if let Err(e) = recent.record(entry) {
                warn!("Could not save recent search: {}", e);
            }
        }

        let view = normalize(&progress, lang);
        Ok(SearchOutcome::Resolved { triple, progress, view })
    }
}

/// Anything that goes wrong while talking to the provider is reported under
/// the failing operation's notice; user-input errors pass through.
fn as_network(err: BTError, context: MsgKey) -> BTError {
    match err {
        BTError::Network { .. } | BTError::Validation(_) | BTError::NotFound(_) => err,
        other => BTError::network(context, other.to_string()),
    }
}

// ============================================================================
// Station search
// ============================================================================

pub fn search_stations(source: &dyn TrainDataSource, input: &str) -> Result<Vec<StationMatch>> {
    let keyword = input.trim();
    if keyword.is_empty() {
        return Err(BTError::Validation(MsgKey::EnterStationName));
    }

    let stations = source
        .search_stations(keyword)
        .map_err(|e| as_network(e, MsgKey::SearchFailed))?;
    if stations.is_empty() {
        return Err(BTError::NotFound(MsgKey::NoStationFound));
    }
    Ok(stations)
}

/// Open the departures board of a chosen station and remember the choice.
pub fn choose_station(recent: Option<&RecentSearchRegistry>, station: &StationMatch) -> BoardRequest {
    if let Some(recent) = recent {
        if let Err(e) = recent.record(RecentSearchEntry::station(&station.id, &station.nome_lungo)) {
            warn!("Could not save recent station: {}", e);
        }
    }
    BoardRequest::departures(&station.id, &station.nome_lungo)
}
