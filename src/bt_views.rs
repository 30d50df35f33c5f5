// Terminal views for BelloTreno
use crate::bt_announcements::{Announcement, FeedSelection};
use crate::bt_catalog::Badge;
use crate::bt_config::{Lang, Palette, Theme};
use crate::bt_error::BTError;
use crate::bt_i18n::{t, MsgKey};
use crate::bt_models::{
    BoardKind, BoardRow, Dwell, Orientation, PlatformView, StationMatch, StatusColor, StopState,
    TimeCell, TrainCandidate, TrainDetailView,
};
use crate::bt_navigation::BoardRequest;
use crate::bt_recent::{RecentSearchEntry, SearchKind};
use crate::bt_status::format_short_date;
use std::io::{self, Write};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const STRIKE: &str = "\x1b[9m";
const BLINK: &str = "\x1b[5m";

pub struct BTViews;

impl BTViews {
    /// Main menu
    pub fn show_menu(lang: Lang, theme: Theme) {
        println!("\n{}", "═".repeat(60));
        println!("     🚄 BELLOTRENO - {}", t(lang, MsgKey::LanguageName));
        println!("{}", "═".repeat(60));
        println!("\n📋 MENU");
        println!("  1️⃣  {} ({})", t(lang, MsgKey::TrainNum), t(lang, MsgKey::Status));
        println!("  2️⃣  {} / {}", t(lang, MsgKey::Departures), t(lang, MsgKey::Arrivals));
        println!("  3️⃣  {}", t(lang, MsgKey::RecentSearches));
        println!("  4️⃣  {}", t(lang, MsgKey::Announcements));
        println!("  5️⃣  Language: {}", lang.code());
        println!("  6️⃣  Theme: {}", Self::theme_label(lang, theme));
        println!("  0️⃣  Quit");
        println!("\n{}", "─".repeat(60));
        print!("➜ ");
        let _ = io::stdout().flush();
    }

    /// Read one line; `None` at end of input.
    pub fn prompt(label: &str) -> Option<String> {
        print!("{} ", label);
        let _ = io::stdout().flush();
        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(input.trim().to_string()),
        }
    }

    pub fn theme_label(lang: Lang, theme: Theme) -> &'static str {
        match theme {
            Theme::Auto => t(lang, MsgKey::ThemeAuto),
            Theme::Light => t(lang, MsgKey::ThemeLight),
            Theme::Dark => t(lang, MsgKey::ThemeDark),
        }
    }

    // ------------------------------------------------------------------------
    // Train detail
    // ------------------------------------------------------------------------

    pub fn show_train_detail(view: &TrainDetailView, lang: Lang, palette: Palette) {
        let header = &view.header;
        let class = &header.classification;

        println!("\n{}", "═".repeat(70));
        println!(
            "{} {}  {}",
            Self::colorize_badge(&class.category_code, class.badge),
            header.train_number,
            class.category_label
        );
        match &class.operator_link {
            Some(link) => println!("   {} ({})", class.operator_name, link),
            None => println!("   {}", class.operator_name),
        }
        if let Some(icon) = &class.icon_asset {
            println!("   🖼  {}", icon);
        }
        println!("   {} → {}", header.origin, header.destination);
        println!("{}", "═".repeat(70));

        let status_color = if header.is_early_or_on_time {
            StatusColor::Green
        } else {
            StatusColor::Red
        };
        println!("⏱️  {}: {}", t(lang, MsgKey::Status), Self::paint(&header.status_text, status_color, palette));
        println!("⌛ {}: {}", t(lang, MsgKey::Duration), header.duration);
        if let Some(position) = &header.last_position {
            let when = header.last_position_time.as_deref().unwrap_or_default();
            println!("📍 {}: {} {}", t(lang, MsgKey::LastPosition), position, when);
        }
        if let Some(alert) = &header.alert {
            println!("⚠️  {}", alert);
        }
        println!("{}", "─".repeat(70));

        for stop in &view.stops {
            println!(
                "{} {}{}{}",
                Self::stop_marker(stop.state),
                if stop.state == StopState::Current { BOLD } else { "" },
                stop.station_name,
                RESET
            );
            if let Some(arrival) = &stop.arrival {
                println!("   │ {:<10} {}", t(lang, MsgKey::Arrival), Self::time_text(arrival, lang, palette));
            }
            if let Some(departure) = &stop.departure {
                println!("   │ {:<10} {}", t(lang, MsgKey::Departure), Self::time_text(departure, lang, palette));
            }
            if stop.dwell != Dwell::NotApplicable {
                println!("   │ {:<10} {}", t(lang, MsgKey::StopDuration), Self::dwell_text(&stop.dwell, lang));
            }
            println!("   │ {:<10} {}", t(lang, MsgKey::Platform), Self::platform_text(&stop.platform, palette));
            if let Some(orientation) = &stop.orientation {
                println!("   │ 🚃 {}", Self::orientation_text(orientation, lang));
            }
            println!("   {}", if stop.segment_active { "┃" } else { "┆" });
        }
        println!("{}", "═".repeat(70));
    }

    pub fn stop_marker(state: StopState) -> &'static str {
        match state {
            StopState::Passed => "●",
            StopState::Current => "◉",
            StopState::Future => "○",
        }
    }

    pub fn time_text(cell: &TimeCell, lang: Lang, palette: Palette) -> String {
        match cell {
            TimeCell::Expected { scheduled } => format!(
                "{} {}",
                t(lang, MsgKey::Expected),
                scheduled.as_deref().unwrap_or("--:--")
            ),
            TimeCell::Actual { scheduled, actual, late } => {
                let color = if *late { StatusColor::Red } else { StatusColor::Green };
                let actual = Self::paint(actual, color, palette);
                match scheduled {
                    Some(scheduled) => format!("{} {}", Self::paint(scheduled, StatusColor::Grey, palette), actual),
                    None => actual,
                }
            }
        }
    }

    pub fn dwell_text(dwell: &Dwell, lang: Lang) -> String {
        match dwell {
            Dwell::Minutes(n) => format!("{} {}", n, t(lang, MsgKey::Minutes)),
            Dwell::Unknown => "--".to_string(),
            Dwell::NotApplicable => String::new(),
        }
    }

    /// A moved platform shows the old one struck through, then the new one.
    pub fn platform_text(platform: &PlatformView, palette: Palette) -> String {
        match platform {
            PlatformView::Changed { scheduled, actual } => format!(
                "{}{}{} {}{}{}",
                STRIKE,
                scheduled,
                RESET,
                BOLD,
                Self::paint(actual, StatusColor::Red, palette),
                RESET
            ),
            PlatformView::Single(value) => value.clone(),
            PlatformView::Unknown => "--".to_string(),
        }
    }

    pub fn orientation_text(orientation: &Orientation, lang: Lang) -> String {
        match orientation {
            Orientation::ExecutiveHead => t(lang, MsgKey::InHead).to_string(),
            Orientation::ExecutiveTail => t(lang, MsgKey::InTail).to_string(),
            Orientation::Other(raw) => raw.clone(),
        }
    }

    // ------------------------------------------------------------------------
    // Choices
    // ------------------------------------------------------------------------

    pub fn show_disambiguation(candidates: &[TrainCandidate], lang: Lang) {
        println!("\n🚆 {}", t(lang, MsgKey::SelectTrain));
        println!("{}", "─".repeat(60));
        for (i, candidate) in candidates.iter().enumerate() {
            let date = format_short_date(candidate.triple.departure_ts).unwrap_or_default();
            println!("  {}. {}", i + 1, candidate.label);
            println!(
                "     {}: {}   {}: {}",
                t(lang, MsgKey::DepartDate),
                date,
                t(lang, MsgKey::OriginStation),
                candidate.triple.origin_station_id
            );
        }
        println!("{}", "─".repeat(60));
    }

    pub fn show_station_choices(stations: &[StationMatch], lang: Lang) {
        println!("\n🚉 {}", t(lang, MsgKey::SelectStation));
        println!("{}", "─".repeat(60));
        for (i, station) in stations.iter().enumerate() {
            println!("  {}. {} ({})", i + 1, station.nome_lungo, station.id);
        }
        println!("{}", "─".repeat(60));
    }

    // ------------------------------------------------------------------------
    // Station board
    // ------------------------------------------------------------------------

    pub fn show_board(request: &BoardRequest, rows: &[BoardRow], lang: Lang, palette: Palette) {
        let (title, peer_label) = match request.kind {
            BoardKind::Departures => (t(lang, MsgKey::Departures), t(lang, MsgKey::Destination)),
            BoardKind::Arrivals => (t(lang, MsgKey::Arrivals), t(lang, MsgKey::Origin)),
        };

        println!("\n{}", "═".repeat(78));
        println!("🚉 {} - {}", request.station_name, title);
        println!("{}", "═".repeat(78));
        println!(
            "{:<13} {:<12} {:<24} {:<18} {}",
            t(lang, MsgKey::Time),
            t(lang, MsgKey::TrainNum),
            peer_label,
            t(lang, MsgKey::Status),
            t(lang, MsgKey::Platform)
        );
        println!("{}", "─".repeat(78));

        if rows.is_empty() {
            println!("  {}", t(lang, MsgKey::NoInfoFound));
        }

        for row in rows {
            let time = match &row.actual_time {
                Some(actual) if *actual != row.scheduled_time => format!("{} ({})", row.scheduled_time, actual),
                _ => row.scheduled_time.clone(),
            };
            let train = match &row.train.category {
                Some(category) => format!("{} {}", Self::colorize_badge(category, row.train.badge), row.train.number),
                None => row.train.number.clone(),
            };
            let in_station = if row.in_station {
                format!(" {}●{}", BLINK, RESET)
            } else {
                String::new()
            };

            println!(
                "{:<13} {} {:<24} {} {}{}",
                time,
                train,
                row.peer_station,
                Self::paint(&format!("{:<18}", row.status), row.status_color, palette),
                Self::platform_text(&row.platform, palette),
                in_station
            );
        }
        println!("{}", "─".repeat(78));
        println!("🔗 bellotreno open-link '?{}'", request.to_query());
        println!("{}", "═".repeat(78));
    }

    // ------------------------------------------------------------------------
    // Recent searches & announcements
    // ------------------------------------------------------------------------

    pub fn show_recent(entries: &[RecentSearchEntry], lang: Lang) {
        println!("\n🕘 {}", t(lang, MsgKey::RecentSearches));
        println!("{}", "─".repeat(60));
        if entries.is_empty() {
            println!("  {}", t(lang, MsgKey::NoRecentSearches));
        }
        for (i, entry) in entries.iter().enumerate() {
            let icon = match entry.kind {
                SearchKind::Train => "🚆",
                SearchKind::Station => "🚉",
            };
            println!("  {}. {} {}", i + 1, icon, entry.name);
        }
        println!("{}", "─".repeat(60));
    }

    pub fn show_announcements(items: &[Announcement], selection: FeedSelection, lang: Lang) {
        println!("\n{}", "═".repeat(70));
        println!(
            "📢 {} - {} ({})",
            t(lang, MsgKey::Announcements),
            t(lang, selection.mode.label_key()),
            selection.region
        );
        println!("{}", "═".repeat(70));

        if items.is_empty() {
            println!("\n  {}", t(lang, MsgKey::NoInfoFound));
        }

        for item in items {
            println!("\n  {}", item.title);
            let region = if item.region.is_empty() {
                String::new()
            } else {
                format!("  [{}]", item.region)
            };
            println!("     🕐 {}{}", item.display_date(lang), region);
            println!("     🔗 {}: {}", t(lang, MsgKey::ReadMore), item.link);
        }
        println!("{}", "═".repeat(70));
    }

    // ------------------------------------------------------------------------
    // Notices
    // ------------------------------------------------------------------------

    pub fn show_error(err: &BTError, lang: Lang) {
        println!("\n❌ {}", err.localized(lang));
    }

    pub fn show_info(key: MsgKey, lang: Lang) {
        println!("\nℹ️  {}", t(lang, key));
    }

    pub fn goodbye_message() {
        println!("\n{}", "═".repeat(60));
        println!("       👋 Grazie per aver viaggiato con BelloTreno!");
        println!("{}", "═".repeat(60));
        println!();
    }

    // ------------------------------------------------------------------------
    // Colors
    // ------------------------------------------------------------------------

    fn paint(text: &str, color: StatusColor, palette: Palette) -> String {
        let code = match (color, palette) {
            (StatusColor::Red, Palette::Dark) => "91",
            (StatusColor::Red, Palette::Light) => "31",
            (StatusColor::Green, Palette::Dark) => "92",
            (StatusColor::Green, Palette::Light) => "32",
            (StatusColor::Grey, Palette::Dark) => "90",
            (StatusColor::Grey, Palette::Light) => "37",
        };
        format!("\x1b[{}m{}{}", code, text, RESET)
    }

    /// Category code on its badge color, or plain when it has no badge.
    fn colorize_badge(code: &str, badge: Option<Badge>) -> String {
        let Some(badge) = badge else {
            return code.to_string();
        };
        let (r, g, b) = match badge {
            Badge::Regional => (0, 122, 61),
            Badge::HighSpeed => (200, 16, 46),
            Badge::Intercity => (0, 72, 153),
            Badge::International => (110, 40, 140),
            Badge::Heritage => (140, 90, 40),
            Badge::Express => (90, 90, 90),
        };

        let luminance = (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32) / 255.0;
        let text_color = if luminance > 0.5 { "30" } else { "97" };

        format!("\x1b[48;2;{};{};{}m\x1b[{}m {} {}", r, g, b, text_color, code, RESET)
    }
}
