// RFI infomobility announcements
//
// Regional RSS feeds fetched through a CORS-style proxy. Only one refresh runs
// at a time, and a response that arrives after the user changed mode or
// region is dropped instead of shown.

use crate::bt_api::encode_component;
use crate::bt_config::Lang;
use crate::bt_error::{BTError, Result};
use crate::bt_i18n::MsgKey;
use chrono::{DateTime, FixedOffset, Utc};
use chrono_tz::Europe::Rome;
use log::{debug, info};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

const RSS_UPDATES: &str = "https://www.rfi.it/content/rfi/it/news-e-media/infomobilita.rss.updates";
const RSS_NOTICES: &str = "https://www.rfi.it/content/rfi/it/news-e-media/infomobilita.rss.notices";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedMode {
    #[default]
    Updates,
    Notices,
}

impl FeedMode {
    pub fn base_url(self) -> &'static str {
        match self {
            FeedMode::Updates => RSS_UPDATES,
            FeedMode::Notices => RSS_NOTICES,
        }
    }

    pub fn label_key(self) -> MsgKey {
        match self {
            FeedMode::Updates => MsgKey::Updates,
            FeedMode::Notices => MsgKey::Notices,
        }
    }
}

impl FromStr for FeedMode {
    type Err = BTError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "updates" => Ok(FeedMode::Updates),
            "notices" => Ok(FeedMode::Notices),
            _ => Err(BTError::Validation(MsgKey::UnknownFeedMode)),
        }
    }
}

macro_rules! regions {
    ($($variant:ident => $key:literal),+ $(,)?) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        pub enum Region {
            #[default]
            All,
            $($variant),+
        }

        impl Region {
            pub const ALL: &'static [Region] = &[Region::All, $(Region::$variant),+];

            pub fn key(self) -> &'static str {
                match self {
                    Region::All => "all",
                    $(Region::$variant => $key),+
                }
            }
        }
    };
}

regions! {
    Abruzzo => "abruzzo",
    Basilicata => "basilicata",
    Calabria => "calabria",
    Campania => "campania",
    EmiliaRomagna => "emilia_romagna",
    FriuliVeneziaGiulia => "friuli_venezia_giulia",
    Lazio => "lazio",
    Liguria => "liguria",
    Lombardia => "lombardia",
    Marche => "marche",
    Molise => "molise",
    Piemonte => "piemonte",
    Puglia => "puglia",
    Sardegna => "sardegna",
    Sicilia => "sicilia",
    Toscana => "toscana",
    TrentinoAltoAdige => "trentino_alto_adige",
    Umbria => "umbria",
    ValleDAosta => "valle_d_aosta",
    Veneto => "veneto",
}

impl Region {
    /// Feed file suffix: empty for the national feed, `.<key>` otherwise.
    pub fn suffix(self) -> String {
        match self {
            Region::All => String::new(),
            other => format!(".{}", other.key()),
        }
    }
}

impl FromStr for Region {
    type Err = BTError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_lowercase();
        Region::ALL
            .iter()
            .copied()
            .find(|r| r.key() == key)
            .ok_or(BTError::Validation(MsgKey::UnknownRegion))
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

pub fn feed_url(mode: FeedMode, region: Region) -> String {
    format!("{}{}.xml", mode.base_url(), region.suffix())
}

/// Proxied fetch URL; the timestamp defeats intermediate caches.
pub fn proxied_url(proxy: &str, target: &str, now_ms: i64) -> String {
    format!("{}{}&ts={}", proxy, encode_component(target), now_ms)
}

// ============================================================================
// Items
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Announcement {
    pub title: String,
    pub link: String,
    pub published_raw: String,
    pub published: Option<DateTime<FixedOffset>>,
    pub region: String,
}

impl Announcement {
    /// Publication time in Italian local time, laid out per language.
    /// Dates that could not be parsed are shown as received.
    pub fn display_date(&self, lang: Lang) -> String {
        let Some(published) = self.published else {
            return self.published_raw.clone();
        };
        let local = published.with_timezone(&Rome);
        match lang {
            Lang::Zh => local.format("%Y/%m/%d %H:%M:%S").to_string(),
            Lang::En | Lang::It => local.format("%d/%m/%Y, %H:%M:%S").to_string(),
        }
    }
}

fn parse_pub_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
}

#[derive(Default)]
struct ItemBuilder {
    title: String,
    link: String,
    pub_date: String,
    region: String,
    rfi_region: String,
}

impl ItemBuilder {
    fn field(&mut self, name: &[u8]) -> Option<&mut String> {
        match name {
            b"title" => Some(&mut self.title),
            b"link" => Some(&mut self.link),
            b"pubDate" => Some(&mut self.pub_date),
            b"region" => Some(&mut self.region),
            b"rfi:region" => Some(&mut self.rfi_region),
            _ => None,
        }
    }

    fn build(self) -> Announcement {
        let link = self.link.trim();
        let region = if self.region.trim().is_empty() { &self.rfi_region } else { &self.region };
        Announcement {
            title: self.title.trim().to_string(),
            link: if link.is_empty() { "#".to_string() } else { link.to_string() },
            published: parse_pub_date(&self.pub_date),
            published_raw: self.pub_date.trim().to_string(),
            region: region.trim().to_string(),
        }
    }
}

/// Collect every `<item>` of an RSS document.
pub fn parse_feed(xml: &str) -> Result<Vec<Announcement>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut items = Vec::new();
    let mut current: Option<ItemBuilder> = None;
    let mut field: Option<Vec<u8>> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = e.name().as_ref().to_vec();
                if name == b"item" {
                    current = Some(ItemBuilder::default());
                } else if current.is_some() {
                    field = Some(name);
                }
            }
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"item" {
                    if let Some(item) = current.take() {
                        items.push(item.build());
                    }
                }
                field = None;
            }
            Ok(Event::Text(e)) => {
                if let (Some(item), Some(name)) = (current.as_mut(), field.as_deref()) {
                    if let Some(slot) = item.field(name) {
                        let text = e
                            .unescape()
                            .map_err(|e| BTError::ParseError(format!("Text unescape error: {}", e)))?;
                        slot.push_str(&text);
                    }
                }
            }
            Ok(Event::CData(e)) => {
                if let (Some(item), Some(name)) = (current.as_mut(), field.as_deref()) {
                    if let Some(slot) = item.field(name) {
                        slot.push_str(&String::from_utf8_lossy(&e.into_inner()));
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(BTError::ParseError(format!("XML error: {}", e))),
            _ => {}
        }
        buf.clear();
    }

    Ok(items)
}

/// Newest first; undated items keep their feed order at the end.
pub fn sort_newest_first(items: &mut [Announcement]) {
    items.sort_by(|a, b| match (a.published, b.published) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

// ============================================================================
// Feed state
// ============================================================================

pub trait FeedSource {
    fn fetch_xml(&self, url: &str) -> Result<String>;
}

/// Blocking fetch through reqwest.
pub struct HttpFeedSource {
    client: reqwest::blocking::Client,
}

impl HttpFeedSource {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| BTError::network(MsgKey::FeedFailed, format!("Failed to create HTTP client: {}", e)))?;
        Ok(HttpFeedSource { client })
    }
}

impl FeedSource for HttpFeedSource {
    fn fetch_xml(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| BTError::network(MsgKey::FeedFailed, e.to_string()))?;
        if !response.status().is_success() {
            return Err(BTError::network(MsgKey::FeedFailed, format!("HTTP {}", response.status())));
        }
        response
            .text()
            .map_err(|e| BTError::network(MsgKey::FeedFailed, format!("Failed to read response: {}", e)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeedSelection {
    pub mode: FeedMode,
    pub region: Region,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeedOutcome {
    Items(Vec<Announcement>),
    /// The feed had no items.
    Empty,
    /// Another refresh was already running.
    Skipped,
    /// Mode or region changed while this refresh was in flight.
    Stale,
}

pub struct AnnouncementFeed {
    proxy: String,
    selection: Mutex<FeedSelection>,
    generation: AtomicU64,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag however the refresh ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl AnnouncementFeed {
    pub fn new(proxy: &str) -> Self {
        AnnouncementFeed {
            proxy: proxy.to_string(),
            selection: Mutex::new(FeedSelection::default()),
            generation: AtomicU64::new(0),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn selection(&self) -> FeedSelection {
        *self.selection.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Returns whether the selection actually changed.
    pub fn set_mode(&self, mode: FeedMode) -> bool {
        self.update_selection(|s| s.mode = mode)
    }

    pub fn set_region(&self, region: Region) -> bool {
        self.update_selection(|s| s.region = region)
    }

    fn update_selection(&self, f: impl FnOnce(&mut FeedSelection)) -> bool {
        let mut selection = self.selection.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = *selection;
        f(&mut selection);
        let changed = *selection != before;
        if changed {
            self.generation.fetch_add(1, Ordering::AcqRel);
        }
        changed
    }

    pub fn refresh(&self, source: &dyn FeedSource) -> Result<FeedOutcome> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Announcement refresh already running, skipped");
            return Ok(FeedOutcome::Skipped);
        }
        let _guard = InFlight(&self.in_flight);

        let (selection, generation) = {
            let selection = self.selection.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            (*selection, self.generation.load(Ordering::Acquire))
        };

        let target = feed_url(selection.mode, selection.region);
        let url = proxied_url(&self.proxy, &target, Utc::now().timestamp_millis());
        debug!("Fetching announcements {}", target);

        let xml = source.fetch_xml(&url).map_err(|e| match e {
            BTError::Network { .. } => e,
            other => BTError::network(MsgKey::FeedFailed, other.to_string()),
        })?;

        if self.generation.load(Ordering::Acquire) != generation {
            info!("Discarding announcements for {:?}/{}: selection changed", selection.mode, selection.region);
            return Ok(FeedOutcome::Stale);
        }

        let mut items = parse_feed(&xml).map_err(|e| BTError::network(MsgKey::FeedFailed, e.to_string()))?;
        if items.is_empty() {
            return Ok(FeedOutcome::Empty);
        }
        sort_newest_first(&mut items);
        Ok(FeedOutcome::Items(items))
    }
}
