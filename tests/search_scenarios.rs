mod common;

use bellotreno::bt_catalog::{HERITAGE_CATEGORY, HERITAGE_OPERATOR};
use bellotreno::bt_config::Lang;
use bellotreno::bt_error::BTError;
use bellotreno::bt_i18n::MsgKey;
use bellotreno::bt_models::StopState;
use bellotreno::bt_recent::{RecentSearchRegistry, SearchKind};
use bellotreno::bt_search::{SearchOutcome, SearchState, TrainSearchResolver};
use bellotreno::bt_store::MemoryStore;
use common::{run, FakeSource};
use std::sync::Arc;

const FIRST: &str = "2345-S01700-1760821200000";
const SECOND: &str = "2345-S08409-1760907600000";

fn two_runs() -> FakeSource {
    let mut source = FakeSource::default();
    source.autocomplete.insert(
        "2345".to_string(),
        format!("2345 - MILANO CENTRALE - 19/10/26|{}\n2345 - ROMA TERMINI - 20/10/26|{}\n", FIRST, SECOND),
    );
    source.progress.insert(FIRST.to_string(), Some(run("REG", "REG 2345", 2)));
    source.progress.insert(SECOND.to_string(), Some(run("RV", "RV 2345", 2)));
    source
}

#[test]
fn shared_number_asks_which_run() {
    let source = Arc::new(two_runs());
    let mut resolver = TrainSearchResolver::new(source.clone(), None);

    let outcome = resolver.start("2345", Lang::En).unwrap();
    let SearchOutcome::Disambiguation(candidates) = outcome else {
        panic!("expected a choice");
    };
    assert_eq!(candidates.len(), 2);
    assert!(matches!(resolver.state(), SearchState::Disambiguating(_)));

    let outcome = resolver.choose(1, Lang::En).unwrap();
    let SearchOutcome::Resolved { triple, .. } = outcome else {
        panic!("expected details");
    };
    assert_eq!(triple.to_string(), SECOND);
    assert_eq!(source.calls(), vec!["autocomplete 2345".to_string(), format!("progress {}", SECOND)]);
    assert_eq!(resolver.state(), &SearchState::Idle);
}

#[test]
fn choice_out_of_range_keeps_candidates() {
    let source = Arc::new(two_runs());
    let mut resolver = TrainSearchResolver::new(source, None);
    resolver.start("2345", Lang::En).unwrap();

    assert!(matches!(resolver.choose(5, Lang::En), Err(BTError::Validation(MsgKey::SelectTrain))));
    assert_eq!(resolver.candidates().map(|c| c.len()), Some(2));
}

#[test]
fn single_run_skips_the_choice() {
    let mut source = FakeSource::default();
    source.autocomplete.insert("2345".to_string(), format!("2345 - MILANO CENTRALE - 19/10/26|{}", FIRST));
    source.progress.insert(FIRST.to_string(), Some(run("REG", "REG 2345", 2)));
    let source = Arc::new(source);
    let mut resolver = TrainSearchResolver::new(source.clone(), None);

    let outcome = resolver.start("REG 2345", Lang::It).unwrap();
    assert!(matches!(outcome, SearchOutcome::Resolved { .. }));
    assert_eq!(source.calls().len(), 2);
}

#[test]
fn empty_provider_response_means_no_data_yet() {
    let mut source = FakeSource::default();
    source.autocomplete.insert("2345".to_string(), format!("x|{}", FIRST));
    source.progress.insert(FIRST.to_string(), None);
    let mut resolver = TrainSearchResolver::new(Arc::new(source), None);

    assert!(matches!(resolver.start("2345", Lang::En).unwrap(), SearchOutcome::NoDataYet));
}

#[test]
fn heritage_run_is_attributed_to_the_foundation() {
    let mut source = FakeSource::default();
    source.autocomplete.insert("2345".to_string(), format!("x|{}", FIRST));
    source.progress.insert(FIRST.to_string(), Some(run("REG", "REG TS 2345", 2)));
    let mut resolver = TrainSearchResolver::new(Arc::new(source), None);

    let SearchOutcome::Resolved { view, .. } = resolver.start("2345", Lang::En).unwrap() else {
        panic!("expected details");
    };
    assert_eq!(view.header.classification.category_code, HERITAGE_CATEGORY);
    assert_eq!(view.header.classification.operator_name, HERITAGE_OPERATOR);
}

#[test]
fn train_not_departed_has_no_passed_stops() {
    let mut progress = run("REG", "REG 2345", 2);
    progress.non_partito = true;
    let mut source = FakeSource::default();
    source.autocomplete.insert("2345".to_string(), format!("x|{}", FIRST));
    source.progress.insert(FIRST.to_string(), Some(progress));
    let mut resolver = TrainSearchResolver::new(Arc::new(source), None);

    let SearchOutcome::Resolved { view, .. } = resolver.start("2345", Lang::En).unwrap() else {
        panic!("expected details");
    };
    assert!(view.stops.iter().all(|s| s.state == StopState::Future && !s.segment_active));
}

#[test]
fn resolved_run_is_remembered() {
    let store = Arc::new(MemoryStore::new());
    let recent = Arc::new(RecentSearchRegistry::new(store));
    let mut resolver = TrainSearchResolver::new(Arc::new(two_runs()), Some(recent.clone()));

    resolver.start("2345", Lang::En).unwrap();
    resolver.choose(0, Lang::En).unwrap();

    let entries = recent.list();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, "REG 2345");
    assert_eq!(entries[0].kind, SearchKind::Train);
    assert_eq!(entries[0].name, "REG 2345 MILANO CENTRALE → TIRANO");
}

#[test]
fn empty_input_is_rejected_before_any_request() {
    let source = Arc::new(two_runs());
    let mut resolver = TrainSearchResolver::new(source.clone(), None);

    assert!(matches!(
        resolver.start("   ", Lang::En),
        Err(BTError::Validation(MsgKey::EnterValidTrainNumber))
    ));
    assert!(source.calls().is_empty());
    assert_eq!(resolver.state(), &SearchState::Idle);
}

#[test]
fn unknown_number_is_not_found() {
    let mut resolver = TrainSearchResolver::new(Arc::new(FakeSource::default()), None);
    assert!(matches!(resolver.start("99999", Lang::En), Err(BTError::NotFound(MsgKey::TrainNotFound))));
}

#[test]
fn provider_failure_resets_to_idle() {
    let mut source = FakeSource::default();
    source.autocomplete.insert("2345".to_string(), format!("x|{}", FIRST));
    let mut resolver = TrainSearchResolver::new(Arc::new(source), None);

    assert!(matches!(
        resolver.start("2345", Lang::En),
        Err(BTError::Network { context: MsgKey::DetailsFailed, .. })
    ));
    assert_eq!(resolver.state(), &SearchState::Idle);
}

#[test]
fn repeated_search_goes_out_twice() {
    let source = Arc::new(two_runs());
    let mut resolver = TrainSearchResolver::new(source.clone(), None);

    resolver.start("2345", Lang::En).unwrap();
    resolver.start("2345", Lang::En).unwrap();
    assert_eq!(source.calls(), vec!["autocomplete 2345".to_string(), "autocomplete 2345".to_string()]);
}
