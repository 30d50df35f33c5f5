mod common;

use bellotreno::bt_board::{format_board, load_board};
use bellotreno::bt_config::Lang;
use bellotreno::bt_models::{BoardEntry, BoardKind, PlatformView, StatusColor};
use bellotreno::bt_navigation::BoardRequest;
use chrono::{TimeZone, Utc};
use common::FakeSource;

fn entry(number: i64, composite: &str) -> BoardEntry {
    BoardEntry {
        numero_treno: Some(number),
        comp_numero_treno: Some(composite.to_string()),
        origine: Some("NAPOLI CENTRALE".to_string()),
        destinazione: Some("MILANO CENTRALE".to_string()),
        comp_orario_partenza: Some("14:05".to_string()),
        comp_orario_arrivo: Some("14:00".to_string()),
        ..Default::default()
    }
}

#[test]
fn cancelled_train_is_red_on_both_boards() {
    let mut cancelled = entry(9521, "FR 9521");
    cancelled.provvedimento = Some(1);

    for kind in [BoardKind::Departures, BoardKind::Arrivals] {
        let rows = format_board(std::slice::from_ref(&cancelled), kind, Lang::En, "ROMA TERMINI");
        assert_eq!(rows[0].status, "CANCELLED");
        assert_eq!(rows[0].status_color, StatusColor::Red);
    }
}

#[test]
fn unchanged_platform_shows_once() {
    let mut row = entry(2110, "REG 2110");
    row.binario_programmato_partenza = Some("4".to_string());
    row.binario_effettivo_partenza = Some("4".to_string());

    let rows = format_board(&[row], BoardKind::Departures, Lang::It, "ROMA TERMINI");
    assert_eq!(rows[0].platform, PlatformView::Single("4".to_string()));
}

#[test]
fn board_is_requested_with_italian_clock() {
    let mut source = FakeSource::default();
    source.board = vec![entry(9521, "FR 9521"), entry(2110, "REG 2110")];
    let request = BoardRequest::departures("S08409", "ROMA TERMINI");
    // 12:00 UTC is 14:00 in Rome during summer time.
    let now = Utc.with_ymd_and_hms(2026, 7, 1, 12, 0, 0).unwrap();

    let rows = load_board(&source, &request, Lang::En, now).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].kind, BoardKind::Departures);
    assert_eq!(rows[0].peer_station, "MILANO CENTRALE");
    assert_eq!(source.calls(), vec!["partenze S08409 Wed Jul 01 2026 14:00:00 GMT+0200".to_string()]);
}

#[test]
fn arrivals_show_origin() {
    let mut source = FakeSource::default();
    source.board = vec![entry(9521, "FR 9521")];
    let request = BoardRequest::departures("S01700", "MILANO CENTRALE").switched(BoardKind::Arrivals);
    let now = Utc.with_ymd_and_hms(2026, 1, 15, 9, 30, 0).unwrap();

    let rows = load_board(&source, &request, Lang::En, now).unwrap();
    assert_eq!(rows[0].peer_station, "NAPOLI CENTRALE");
    assert_eq!(source.calls(), vec!["arrivi S01700 Thu Jan 15 2026 10:30:00 GMT+0100".to_string()]);
}
