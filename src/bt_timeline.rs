// Train-detail normalizer: header fields and per-stop timeline

use crate::bt_catalog::classify_train;
use crate::bt_config::Lang;
use crate::bt_models::{
    non_blank, Dwell, Orientation, PlatformView, Stop, StopState, StopView, TimeCell,
    TrainDetailView, TrainHeaderView, TrainProgress,
};
use crate::bt_status::{classify_status, format_clock, format_duration};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref HTML_TAG: Regex = Regex::new(r"<[^>]*>").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Index of the last stop with a realized arrival or departure.
/// Scheduled times never count, and a not-yet-departed train has no position.
pub fn current_position(progress: &TrainProgress) -> Option<usize> {
    if progress.non_partito {
        return None;
    }
    progress
        .fermate
        .iter()
        .rposition(|f| f.arrivo_reale.is_some() || f.partenza_reale.is_some())
}

pub fn stop_state(index: usize, current: Option<usize>) -> StopState {
    match current {
        Some(c) if index < c => StopState::Passed,
        Some(c) if index == c => StopState::Current,
        _ => StopState::Future,
    }
}

pub fn time_cell(scheduled_ms: Option<i64>, actual_ms: Option<i64>, delay_min: Option<i64>) -> TimeCell {
    let scheduled = scheduled_ms.and_then(format_clock);
    match actual_ms.and_then(format_clock) {
        None => TimeCell::Expected { scheduled },
        Some(actual) => TimeCell::Actual {
            scheduled: scheduled.filter(|s| *s != actual),
            late: delay_min.unwrap_or(0) > 0,
            actual,
        },
    }
}

pub fn dwell(stop: &Stop, is_first: bool, is_last: bool) -> Dwell {
    if is_first || is_last {
        return Dwell::NotApplicable;
    }
    let departure = stop.partenza_reale.or(stop.partenza_teorica);
    let arrival = stop.arrivo_reale.or(stop.arrivo_teorico);
    match (departure, arrival) {
        (Some(dep), Some(arr)) => match dep.checked_sub(arr) {
            Some(ms) => Dwell::Minutes((ms as f64 / 60_000.0).round() as i64),
            None => Dwell::Unknown,
        },
        _ => Dwell::Unknown,
    }
}

pub fn orientation(raw: Option<&str>) -> Option<Orientation> {
    match non_blank(raw)?.as_str() {
        "A" => Some(Orientation::ExecutiveTail),
        "B" => Some(Orientation::ExecutiveHead),
        other => Some(Orientation::Other(other.to_string())),
    }
}

/// Platform of a stop, departure side first.
pub fn stop_platform(stop: &Stop) -> PlatformView {
    let scheduled = non_blank(stop.binario_programmato_partenza.as_deref())
        .or_else(|| non_blank(stop.binario_programmato_arrivo.as_deref()));
    let actual = non_blank(stop.binario_effettivo_partenza.as_deref())
        .or_else(|| non_blank(stop.binario_effettivo_arrivo.as_deref()));
    PlatformView::from_pair(scheduled.as_deref(), actual.as_deref())
}

/// Foreign endpoint name, unless it merely echoes the opposite endpoint.
pub fn display_endpoint(domestic: Option<&str>, foreign: Option<&str>, counterpart: Option<&str>) -> String {
    match non_blank(foreign) {
        Some(f) if Some(f.as_str()) != counterpart.map(str::trim) => f,
        _ => non_blank(domestic).unwrap_or_default(),
    }
}

/// Rider alerts may carry inline HTML.
pub fn plain_text(html: &str) -> String {
    let text = HTML_TAG.replace_all(html, " ");
    let text = text.replace("&nbsp;", " ").replace("&amp;", "&");
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

pub fn normalize(progress: &TrainProgress, lang: Lang) -> TrainDetailView {
    let current = current_position(progress);
    let total = progress.fermate.len();

    let stops = progress
        .fermate
        .iter()
        .enumerate()
        .map(|(i, f)| {
            let is_first = i == 0;
            let is_last = i + 1 == total;

            StopView {
                station_id: f.id.clone(),
                station_name: f.stazione.clone(),
                state: stop_state(i, current),
                segment_active: current.is_some_and(|c| i < c),
                arrival: (!is_first).then(|| {
                    time_cell(f.arrivo_teorico.or(f.programmata), f.arrivo_reale, f.ritardo_arrivo)
                }),
                departure: (!is_last).then(|| {
                    time_cell(f.partenza_teorica.or(f.programmata), f.partenza_reale, f.ritardo_partenza)
                }),
                dwell: dwell(f, is_first, is_last),
                platform: stop_platform(f),
                progressivo: f.progressivo,
                orientation: orientation(f.orientamento.as_deref()),
            }
        })
        .collect();

    let status = classify_status(
        progress.comp_ritardo_andamento.first().map(String::as_str).unwrap_or_default(),
        lang,
    );

    let header = TrainHeaderView {
        classification: classify_train(progress),
        train_number: non_blank(progress.comp_numero_treno.as_deref())
            .or_else(|| progress.numero_treno.map(|n| n.to_string()))
            .unwrap_or_default(),
        origin: display_endpoint(
            progress.origine.as_deref(),
            progress.origine_estera.as_deref(),
            progress.destinazione.as_deref(),
        ),
        destination: display_endpoint(
            progress.destinazione.as_deref(),
            progress.destinazione_estera.as_deref(),
            progress.origine.as_deref(),
        ),
        duration: format_duration(progress.comp_durata.as_deref(), lang),
        status_text: status.localized_text,
        is_early_or_on_time: status.is_early_or_on_time,
        last_position: non_blank(progress.stazione_ultimo_rilevamento.as_deref()),
        last_position_time: non_blank(progress.comp_ora_ultimo_rilevamento.as_deref()),
        alert: non_blank(progress.sub_title.as_deref())
            .map(|s| plain_text(&s))
            .filter(|s| !s.is_empty()),
    };

    TrainDetailView { header, stops }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: i64 = 1_700_000_000_000;
    const MIN: i64 = 60_000;

    fn stop(id: &str, arr: Option<i64>, dep: Option<i64>) -> Stop {
        Stop {
            id: id.to_string(),
            stazione: format!("STATION {}", id),
            arrivo_teorico: arr,
            partenza_teorica: dep,
            ..Default::default()
        }
    }

    fn three_stop_run() -> TrainProgress {
        let mut first = stop("S1", None, Some(T0));
        first.partenza_reale = Some(T0 + MIN);
        let mut middle = stop("S2", Some(T0 + 30 * MIN), Some(T0 + 32 * MIN));
        middle.arrivo_reale = Some(T0 + 31 * MIN);
        let last = stop("S3", Some(T0 + 60 * MIN), None);
        TrainProgress {
            comp_numero_treno: Some("REG 2345".to_string()),
            categoria: Some("REG".to_string()),
            codice_cliente: Some(2),
            origine: Some("ROMA TERMINI".to_string()),
            destinazione: Some("NAPOLI CENTRALE".to_string()),
            comp_ritardo_andamento: vec!["con un ritardo di 1 min.".to_string()],
            fermate: vec![first, middle, last],
            ..Default::default()
        }
    }

    #[test]
    fn position_scan_uses_realized_times_only() {
        let run = three_stop_run();
        assert_eq!(current_position(&run), Some(1));

        let view = normalize(&run, Lang::En);
        let states: Vec<StopState> = view.stops.iter().map(|s| s.state).collect();
        assert_eq!(states, vec![StopState::Passed, StopState::Current, StopState::Future]);
        assert!(view.stops[0].segment_active);
        assert!(!view.stops[1].segment_active);
    }

    #[test]
    fn not_departed_marks_nothing_reached() {
        let mut run = three_stop_run();
        run.non_partito = true;
        let view = normalize(&run, Lang::En);
        assert!(view.stops.iter().all(|s| s.state == StopState::Future));
        assert!(view.stops.iter().all(|s| !s.segment_active));
    }

    #[test]
    fn no_realized_times_means_all_future() {
        let mut run = three_stop_run();
        for f in &mut run.fermate {
            f.arrivo_reale = None;
            f.partenza_reale = None;
        }
        assert_eq!(current_position(&run), None);
    }

    #[test]
    fn first_and_last_stop_cells() {
        let view = normalize(&three_stop_run(), Lang::En);
        assert!(view.stops[0].arrival.is_none());
        assert!(view.stops[0].departure.is_some());
        assert!(view.stops[2].departure.is_none());
        assert_eq!(view.stops[0].dwell, Dwell::NotApplicable);
        assert_eq!(view.stops[2].dwell, Dwell::NotApplicable);
        // 32 min scheduled departure minus 31 min actual arrival
        assert_eq!(view.stops[1].dwell, Dwell::Minutes(1));
    }

    #[test]
    fn dwell_unknown_without_times() {
        let s = stop("S", None, Some(T0));
        assert_eq!(dwell(&s, false, false), Dwell::Unknown);
    }

    #[test]
    fn dwell_out_of_range_times_are_unknown() {
        let s = Stop {
            arrivo_teorico: Some(i64::MIN + 1),
            partenza_teorica: Some(i64::MAX),
            ..Default::default()
        };
        assert_eq!(dwell(&s, false, false), Dwell::Unknown);
    }

    #[test]
    fn time_cells() {
        assert_eq!(
            time_cell(Some(T0), None, None),
            TimeCell::Expected { scheduled: Some("23:13".to_string()) }
        );
        assert_eq!(
            time_cell(Some(T0), Some(T0 + 5 * MIN), Some(5)),
            TimeCell::Actual {
                scheduled: Some("23:13".to_string()),
                actual: "23:18".to_string(),
                late: true,
            }
        );
        assert_eq!(
            time_cell(Some(T0), Some(T0 + 10_000), Some(0)),
            TimeCell::Actual { scheduled: None, actual: "23:13".to_string(), late: false }
        );
    }

    #[test]
    fn orientation_flags() {
        assert_eq!(orientation(Some("A")), Some(Orientation::ExecutiveTail));
        assert_eq!(orientation(Some("B")), Some(Orientation::ExecutiveHead));
        assert_eq!(orientation(Some("X")), Some(Orientation::Other("X".to_string())));
        assert_eq!(orientation(Some(" ")), None);
        assert_eq!(orientation(None), None);
    }

    #[test]
    fn platform_prefers_departure_side() {
        let mut s = stop("S", None, None);
        s.binario_programmato_arrivo = Some("1".to_string());
        s.binario_programmato_partenza = Some("2".to_string());
        s.binario_effettivo_partenza = Some("4".to_string());
        assert_eq!(
            stop_platform(&s),
            PlatformView::Changed { scheduled: "2".to_string(), actual: "4".to_string() }
        );
    }

    #[test]
    fn foreign_endpoints() {
        assert_eq!(display_endpoint(Some("DOMODOSSOLA"), Some("GENEVE"), Some("MILANO")), "GENEVE");
        assert_eq!(display_endpoint(Some("MILANO"), Some("MILANO"), Some("MILANO")), "MILANO");
        assert_eq!(display_endpoint(Some("MILANO"), Some("ZURICH"), Some("ZURICH")), "MILANO");
        assert_eq!(display_endpoint(Some("MILANO"), None, Some("ROMA")), "MILANO");
    }

    #[test]
    fn header_fields() {
        let mut run = three_stop_run();
        run.sub_title = Some("<b>Treno</b>&nbsp;limitato a <i>Caserta</i>".to_string());
        run.stazione_ultimo_rilevamento = Some("S2".to_string());
        let view = normalize(&run, Lang::Zh);
        assert_eq!(view.header.train_number, "REG 2345");
        assert_eq!(view.header.origin, "ROMA TERMINI");
        assert_eq!(view.header.status_text, "晚点 1分钟");
        assert!(!view.header.is_early_or_on_time);
        assert_eq!(view.header.alert.as_deref(), Some("Treno limitato a Caserta"));
        assert_eq!(view.header.last_position.as_deref(), Some("S2"));
        assert_eq!(view.header.last_position_time, None);
        assert_eq!(view.header.classification.category_code, "REG");
    }
}
