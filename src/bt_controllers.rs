// Controllers for BelloTreno
use crate::bt_announcements::{AnnouncementFeed, FeedMode, FeedOutcome, FeedSource, HttpFeedSource, Region};
use crate::bt_api::{ApiClient, TrainDataSource};
use crate::bt_board::load_board;
use crate::bt_config::{Config, Lang, Palette, Theme};
use crate::bt_error::{BTError, Result};
use crate::bt_i18n::{t, MsgKey};
use crate::bt_models::BoardKind;
use crate::bt_navigation::{parse_route, retry_until_ready, BoardRequest, Route, DEEP_LINK_ATTEMPTS, DEEP_LINK_INTERVAL};
use crate::bt_recent::{RecentSearchRegistry, SearchKind};
use crate::bt_search::{choose_station, search_stations, SearchOutcome, TrainSearchResolver};
use crate::bt_state::{AppState, SearchMode};
use crate::bt_store::{FileStore, KeyValueStore};
use crate::bt_views::BTViews;
use chrono::Utc;
use log::{info, warn};
use serde::Serialize;
use std::sync::Arc;

/// Builds the provider client. Called lazily, and again after a failure.
pub type Connect = Box<dyn Fn() -> Result<Arc<dyn TrainDataSource>>>;

/// Picks one entry out of `n` choices (zero-based), or none to go back.
pub type Pick<'a> = &'a mut dyn FnMut(usize) -> Option<usize>;

/// Everything one user session works with.
pub struct Session {
    pub state: AppState,
    pub json: bool,
    store: Arc<dyn KeyValueStore>,
    recent: Arc<RecentSearchRegistry>,
    connect: Connect,
    source: Option<Arc<dyn TrainDataSource>>,
    resolver: Option<TrainSearchResolver>,
    feed: AnnouncementFeed,
    feed_source: Box<dyn FeedSource>,
}

impl Session {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        connect: Connect,
        feed_source: Box<dyn FeedSource>,
        rss_proxy: &str,
        lang_override: Option<Lang>,
    ) -> Self {
        let state = AppState::load(store.as_ref(), lang_override);
        Session {
            state,
            json: false,
            recent: Arc::new(RecentSearchRegistry::new(store.clone())),
            store,
            connect,
            source: None,
            resolver: None,
            feed: AnnouncementFeed::new(rss_proxy),
            feed_source,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&config.state_dir)?);
        let base = config.api_base.clone();
        let timeout = config.timeout_secs;
        let connect: Connect = Box::new(move || {
            let client: Arc<dyn TrainDataSource> = Arc::new(ApiClient::new(&base, timeout)?);
            Ok(client)
        });
        let feed_source = Box::new(HttpFeedSource::new(config.timeout_secs)?);

        Ok(Session::new(store, connect, feed_source, &config.rss_proxy, config.lang_override))
    }

    pub fn recent(&self) -> &RecentSearchRegistry {
        &self.recent
    }

    pub fn palette(&self) -> Palette {
        self.state.theme.palette(std::env::var("COLORFGBG").ok().as_deref())
    }

    /// Whether the search surface is up; connects on first use.
    pub fn search_ready(&mut self) -> bool {
        if self.resolver.is_some() {
            return true;
        }
        match (self.connect)() {
            Ok(source) => {
                self.resolver = Some(TrainSearchResolver::new(source.clone(), Some(self.recent.clone())));
                self.source = Some(source);
                true
            }
            Err(e) => {
                warn!("Provider client unavailable: {}", e);
                false
            }
        }
    }

    fn resolver(&mut self) -> Result<&mut TrainSearchResolver> {
        if !self.search_ready() {
            return Err(BTError::network(MsgKey::SearchFailed, "provider client unavailable"));
        }
        self.resolver
            .as_mut()
            .ok_or_else(|| BTError::network(MsgKey::SearchFailed, "provider client unavailable"))
    }

    fn source(&mut self) -> Result<Arc<dyn TrainDataSource>> {
        if !self.search_ready() {
            return Err(BTError::network(MsgKey::SearchFailed, "provider client unavailable"));
        }
        self.source
            .clone()
            .ok_or_else(|| BTError::network(MsgKey::SearchFailed, "provider client unavailable"))
    }

    /// JSON on stdout in `--json` mode, the terminal view otherwise.
    fn emit<T: Serialize>(&self, value: &T, render: impl FnOnce()) {
        if !self.json {
            render();
            return;
        }
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{}", json),
            Err(e) => warn!("Failed to serialize output: {}", e),
        }
    }

    fn notice(&self, key: MsgKey) {
        let lang = self.state.lang;
        self.emit(&serde_json::json!({ "notice": t(lang, key) }), || BTViews::show_info(key, lang));
    }
}

/// Zero-based index for a typed 1-based choice. Only a blank answer backs
/// out; anything else, valid or not, is handed on to be checked.
pub fn pick_index(answer: &str) -> Option<usize> {
    let answer = answer.trim();
    if answer.is_empty() {
        return None;
    }
    Some(answer.parse::<usize>().map_or(usize::MAX, |n| n.wrapping_sub(1)))
}

pub struct BTControllers;

impl BTControllers {
    // ------------------------------------------------------------------------
    // Train search
    // ------------------------------------------------------------------------

    pub fn train_lookup(session: &mut Session, input: &str, pick: Pick) -> Result<()> {
        let lang = session.state.lang;
        session.state.search_mode = SearchMode::Train;

        let mut outcome = session.resolver()?.start(input, lang)?;

        if let SearchOutcome::Disambiguation(candidates) = &outcome {
            session.emit(candidates, || BTViews::show_disambiguation(candidates, lang));
            let Some(index) = pick(candidates.len()) else {
                session.resolver()?.reset();
                return Ok(());
            };
            outcome = session.resolver()?.choose(index, lang)?;
        }

        Self::present_outcome(session, outcome);
        Ok(())
    }

    /// Fetch the run on screen again.
    pub fn refresh(session: &mut Session) -> Result<()> {
        let Some(triple) = session.state.current_triple.clone() else {
            return Ok(());
        };
        let lang = session.state.lang;
        let outcome = session.resolver()?.fetch_details(triple, lang)?;
        Self::present_outcome(session, outcome);
        Ok(())
    }

    fn present_outcome(session: &mut Session, outcome: SearchOutcome) {
        let lang = session.state.lang;
        let palette = session.palette();
        match outcome {
            SearchOutcome::Resolved { triple, view, .. } => {
                info!("Showing run {}", triple);
                session.state.current_triple = Some(triple);
                session.emit(&view, || BTViews::show_train_detail(&view, lang, palette));
            }
            SearchOutcome::NoDataYet => session.notice(MsgKey::NoRealtimeData),
            SearchOutcome::Disambiguation(_) => {}
        }
    }

    // ------------------------------------------------------------------------
    // Stations & boards
    // ------------------------------------------------------------------------

    pub fn station_lookup(session: &mut Session, input: &str, pick: Pick) -> Result<()> {
        let lang = session.state.lang;
        session.state.search_mode = SearchMode::Station;

        let source = session.source()?;
        let stations = search_stations(source.as_ref(), input)?;
        session.emit(&stations, || BTViews::show_station_choices(&stations, lang));

        let Some(index) = pick(stations.len()) else {
            return Ok(());
        };
        let station = stations.get(index).ok_or(BTError::Validation(MsgKey::SelectStation))?;
        let request = choose_station(Some(session.recent()), station);
        Self::open_board(session, &request)
    }

    pub fn open_board(session: &mut Session, request: &BoardRequest) -> Result<()> {
        let lang = session.state.lang;
        let palette = session.palette();
        let source = session.source()?;

        let rows = load_board(source.as_ref(), request, lang, Utc::now())?;
        session.state.current_board = Some(request.clone());
        session.emit(&rows, || BTViews::show_board(request, &rows, lang, palette));
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Recent searches
    // ------------------------------------------------------------------------

    pub fn show_recent(session: &Session) {
        let entries = session.recent().list();
        let lang = session.state.lang;
        session.emit(&entries, || BTViews::show_recent(&entries, lang));
    }

    /// Train entries search again, station entries open their board.
    pub fn open_recent(session: &mut Session, index: usize, pick: Pick) -> Result<()> {
        let Some(entry) = session.recent().list().into_iter().nth(index) else {
            return Err(BTError::Validation(MsgKey::NoRecentSearches));
        };
        match entry.kind {
            SearchKind::Train => Self::train_lookup(session, &entry.id, pick),
            SearchKind::Station => Self::open_board(session, &BoardRequest::departures(&entry.id, &entry.name)),
        }
    }

    pub fn remove_recent(session: &Session, index: usize) -> Result<()> {
        let Some(entry) = session.recent().list().into_iter().nth(index) else {
            return Err(BTError::Validation(MsgKey::NoRecentSearches));
        };
        session.recent().remove(&entry.id, entry.kind)
    }

    // ------------------------------------------------------------------------
    // Announcements
    // ------------------------------------------------------------------------

    pub fn announcements(session: &mut Session, mode: Option<FeedMode>, region: Option<Region>) -> Result<()> {
        if let Some(mode) = mode {
            session.feed.set_mode(mode);
        }
        if let Some(region) = region {
            session.feed.set_region(region);
        }

        let lang = session.state.lang;
        let selection = session.feed.selection();
        match session.feed.refresh(session.feed_source.as_ref())? {
            FeedOutcome::Items(items) => {
                session.emit(&items, || BTViews::show_announcements(&items, selection, lang));
            }
            FeedOutcome::Empty => session.notice(MsgKey::NoInfoFound),
            FeedOutcome::Skipped | FeedOutcome::Stale => {}
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Preferences & links
    // ------------------------------------------------------------------------

    pub fn set_language(session: &mut Session, lang: Lang) -> Result<()> {
        session.state.set_lang(session.store.as_ref(), lang)
    }

    pub fn set_theme(session: &mut Session, theme: Theme) -> Result<()> {
        session.state.set_theme(session.store.as_ref(), theme)
    }

    /// Follow a `?id=..&name=..&type=..` or `?train=..` link.
    pub fn open_link(session: &mut Session, query: &str, pick: Pick) -> Result<()> {
        match parse_route(query)? {
            Route::Board(request) => Self::open_board(session, &request),
            Route::TrainLookup(number) => {
                let ready = retry_until_ready(
                    || session.search_ready().then_some(()),
                    DEEP_LINK_ATTEMPTS,
                    DEEP_LINK_INTERVAL,
                );
                match ready {
                    Some(()) => Self::train_lookup(session, &number, pick),
                    None => Ok(()),
                }
            }
            Route::Home => Ok(()),
        }
    }

    // ------------------------------------------------------------------------
    // Interactive loop
    // ------------------------------------------------------------------------

    pub fn run(session: &mut Session) {
        Self::show_welcome_screen();

        loop {
            BTViews::show_menu(session.state.lang, session.state.theme);
            let Some(choice) = BTViews::prompt("") else {
                BTViews::goodbye_message();
                break;
            };

            let result = match choice.as_str() {
                "1" => Self::interactive_train(session),
                "2" => Self::interactive_station(session),
                "3" => Self::interactive_recent(session),
                "4" => Self::interactive_announcements(session),
                "5" => Self::interactive_language(session),
                "6" => Self::interactive_theme(session),
                "0" => {
                    BTViews::goodbye_message();
                    break;
                }
                "" => Ok(()),
                other => {
                    println!("\n✗ Invalid option '{}'. Please select 0-6.", other);
                    Ok(())
                }
            };

            if let Err(e) = result {
                BTViews::show_error(&e, session.state.lang);
                Self::pause();
            }
        }
    }

    fn show_welcome_screen() {
        println!("\n{}", "═".repeat(70));
        println!("  ╔═══════════════════════════════════════════════════════════╗");
        println!("  ║              🚄 BELLOTRENO - TRENI IN TEMPO REALE          ║");
        println!("  ╚═══════════════════════════════════════════════════════════╝");
        println!("{}", "═".repeat(70));
        println!("\n  🌐 Data source: viaggiatreno / RFI infomobilità");
        println!("\n{}", "═".repeat(70));
    }

    fn pause() {
        let _ = BTViews::prompt("\n📌 Press Enter to continue...");
    }

    fn prompt_pick(count: usize) -> Option<usize> {
        let answer = BTViews::prompt(&format!("➜ # (1-{})", count))?;
        pick_index(&answer)
    }

    fn interactive_train(session: &mut Session) -> Result<()> {
        let lang = session.state.lang;
        let Some(input) = BTViews::prompt(&format!("\n🚆 {}:", t(lang, MsgKey::TrainNum))) else {
            return Ok(());
        };
        Self::train_lookup(session, &input, &mut Self::prompt_pick)?;

        while session.state.current_triple.is_some() {
            match BTViews::prompt("\n[r] refresh  [Enter] back ➜").as_deref() {
                Some("r") | Some("R") => Self::refresh(session)?,
                _ => break,
            }
        }
        session.state.current_triple = None;
        Ok(())
    }

    fn interactive_station(session: &mut Session) -> Result<()> {
        let lang = session.state.lang;
        let Some(input) = BTViews::prompt(&format!("\n🚉 {}:", t(lang, MsgKey::OriginStation))) else {
            return Ok(());
        };
        Self::station_lookup(session, &input, &mut Self::prompt_pick)?;
        Self::board_loop(session)
    }

    fn board_loop(session: &mut Session) -> Result<()> {
        while let Some(current) = session.state.current_board.clone() {
            let answer = BTViews::prompt("\n[p] partenze  [a] arrivi  [r] refresh  [Enter] back ➜");
            let next = match answer.as_deref() {
                Some("p") => current.switched(BoardKind::Departures),
                Some("a") => current.switched(BoardKind::Arrivals),
                Some("r") => current,
                _ => break,
            };
            Self::open_board(session, &next)?;
        }
        session.state.current_board = None;
        Ok(())
    }

    fn interactive_recent(session: &mut Session) -> Result<()> {
        Self::show_recent(session);
        let Some(answer) = BTViews::prompt("\n[#] open  [d#] remove  [Enter] back ➜") else {
            return Ok(());
        };

        if let Some(rest) = answer.strip_prefix('d') {
            if let Ok(n) = rest.trim().parse::<usize>() {
                Self::remove_recent(session, n.saturating_sub(1))?;
                Self::show_recent(session);
            }
            return Ok(());
        }

        if let Ok(n) = answer.parse::<usize>() {
            let kind = session.recent().list().get(n.saturating_sub(1)).map(|e| e.kind);
            Self::open_recent(session, n.saturating_sub(1), &mut Self::prompt_pick)?;
            match kind {
                Some(SearchKind::Station) => Self::board_loop(session)?,
                _ => session.state.current_triple = None,
            }
        }
        Ok(())
    }

    fn interactive_announcements(session: &mut Session) -> Result<()> {
        let mode = match BTViews::prompt("\n[u] updates  [n] notices ➜").as_deref() {
            Some("n") => Some(FeedMode::Notices),
            Some("u") => Some(FeedMode::Updates),
            _ => None,
        };
        let keys: Vec<&str> = Region::ALL.iter().map(|r| r.key()).collect();
        println!("   {}", keys.join(", "));
        let region = BTViews::prompt("region ➜")
            .filter(|r| !r.is_empty())
            .map(|r| r.parse::<Region>())
            .transpose()?;
        Self::announcements(session, mode, region)
    }

    fn interactive_language(session: &mut Session) -> Result<()> {
        let codes: Vec<&str> = Lang::ALL.iter().map(|l| l.code()).collect();
        let Some(answer) = BTViews::prompt(&format!("\n🌐 [{}] ➜", codes.join("/"))) else {
            return Ok(());
        };
        if answer.is_empty() {
            return Ok(());
        }
        Self::set_language(session, answer.parse()?)
    }

    fn interactive_theme(session: &mut Session) -> Result<()> {
        let Some(answer) = BTViews::prompt("\n🎨 [auto/light/dark] ➜") else {
            return Ok(());
        };
        if answer.is_empty() {
            return Ok(());
        }
        Self::set_theme(session, answer.parse()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_choices() {
        assert_eq!(pick_index("2"), Some(1));
        assert_eq!(pick_index(" 1 "), Some(0));
        assert_eq!(pick_index(""), None);
        assert_eq!(pick_index("0"), Some(usize::MAX));
        assert_eq!(pick_index("abc"), Some(usize::MAX));
    }
}
