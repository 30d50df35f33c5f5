#![allow(dead_code)]

use bellotreno::bt_announcements::FeedSource;
use bellotreno::bt_api::TrainDataSource;
use bellotreno::bt_error::{BTError, Result};
use bellotreno::bt_i18n::MsgKey;
use bellotreno::bt_models::{BoardEntry, BoardKind, StationMatch, Stop, TrainProgress, Triple};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Canned provider answers plus a log of every request made.
#[derive(Default)]
pub struct FakeSource {
    pub autocomplete: HashMap<String, String>,
    pub progress: HashMap<String, Option<TrainProgress>>,
    pub stations: Vec<StationMatch>,
    pub board: Vec<BoardEntry>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn log(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl TrainDataSource for FakeSource {
    fn autocomplete(&self, number: &str) -> Result<String> {
        self.log(format!("autocomplete {}", number));
        Ok(self.autocomplete.get(number).cloned().unwrap_or_default())
    }

    fn train_progress(&self, triple: &Triple) -> Result<Option<TrainProgress>> {
        self.log(format!("progress {}", triple));
        self.progress
            .get(&triple.to_string())
            .cloned()
            .ok_or_else(|| BTError::network(MsgKey::DetailsFailed, "HTTP 500"))
    }

    fn search_stations(&self, keyword: &str) -> Result<Vec<StationMatch>> {
        self.log(format!("stations {}", keyword));
        Ok(self.stations.clone())
    }

    fn station_board(&self, station_id: &str, kind: BoardKind, clock: &str) -> Result<Vec<BoardEntry>> {
        self.log(format!("{} {} {}", kind.path(), station_id, clock));
        Ok(self.board.clone())
    }
}

pub struct StaticFeed(pub String);

impl FeedSource for StaticFeed {
    fn fetch_xml(&self, _url: &str) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// Serves `FEED` and keeps every requested URL.
pub struct RecordingFeed(pub Arc<Mutex<Vec<String>>>);

impl FeedSource for RecordingFeed {
    fn fetch_xml(&self, url: &str) -> Result<String> {
        self.0.lock().unwrap().push(url.to_string());
        Ok(FEED.to_string())
    }
}

pub fn stop(id: &str, name: &str, scheduled: i64, actual: Option<i64>) -> Stop {
    Stop {
        id: id.to_string(),
        stazione: name.to_string(),
        arrivo_teorico: Some(scheduled),
        partenza_teorica: Some(scheduled + 120_000),
        arrivo_reale: actual,
        partenza_reale: actual.map(|a| a + 120_000),
        ..Default::default()
    }
}

pub fn run(categoria: &str, composite: &str, client: i64) -> TrainProgress {
    TrainProgress {
        numero_treno: Some(2345),
        categoria: Some(categoria.to_string()),
        comp_numero_treno: Some(composite.to_string()),
        comp_categoria: Some(categoria.to_string()),
        codice_cliente: Some(client),
        origine: Some("MILANO CENTRALE".to_string()),
        destinazione: Some("TIRANO".to_string()),
        comp_ritardo_andamento: vec!["in orario".to_string()],
        fermate: vec![
            stop("S01700", "MILANO CENTRALE", 1_760_860_800_000, Some(1_760_860_800_000)),
            stop("S01520", "LECCO", 1_760_864_400_000, None),
            stop("S01420", "TIRANO", 1_760_871_600_000, None),
        ],
        ..Default::default()
    }
}

pub const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <item>
      <title>Older</title>
      <link>https://www.rfi.it/old</link>
      <pubDate>Sun, 18 Oct 2026 08:00:00 GMT</pubDate>
    </item>
    <item>
      <title>Newer</title>
      <link>https://www.rfi.it/new</link>
      <pubDate>Mon, 19 Oct 2026 08:00:00 GMT</pubDate>
    </item>
  </channel>
</rss>"#;
