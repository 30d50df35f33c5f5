use anyhow::{Context, Result};
use bellotreno::bt_announcements::{FeedMode, Region};
use bellotreno::bt_config::{Config, Lang, Theme};
use bellotreno::bt_controllers::{BTControllers, Session};
use bellotreno::bt_error::BTError;
use bellotreno::bt_models::BoardKind;
use bellotreno::bt_navigation::BoardRequest;
use bellotreno::bt_views::BTViews;
use clap::{Parser, Subcommand};
use log::error;
use std::panic::AssertUnwindSafe;

#[derive(Parser, Debug)]
#[command(name = "bellotreno")]
#[command(about = "Real-time Italian train schedules and station boards")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Args {
    /// Interface language (zh, en, it); overrides the saved preference
    #[arg(long, global = true)]
    lang: Option<Lang>,

    /// Colour theme for this session only (auto, light, dark)
    #[arg(long, global = true)]
    theme: Option<Theme>,

    /// Provider base URL
    #[arg(long, global = true)]
    api_base: Option<String>,

    /// Print view models as JSON instead of terminal output
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Look up a train by number
    Train {
        number: String,
        /// Which run to open when several share the number (1-based)
        #[arg(long)]
        pick: Option<usize>,
    },
    /// Search a station and open its departures board
    Station {
        name: String,
        #[arg(long)]
        pick: Option<usize>,
    },
    /// Open a board by station code
    Board {
        station_id: String,
        #[arg(long, default_value = "")]
        name: String,
        /// partenze or arrivi
        #[arg(long, default_value = "partenze")]
        kind: BoardKind,
    },
    /// RFI infomobility announcements
    News {
        #[arg(long, default_value = "updates")]
        mode: FeedMode,
        #[arg(long, default_value = "all")]
        region: Region,
    },
    /// Recently searched trains and stations
    Recent {
        #[command(subcommand)]
        action: Option<RecentAction>,
    },
    /// Save the interface language
    Lang { code: Lang },
    /// Save the colour theme
    Theme { code: Theme },
    /// Follow a shared link query such as "?train=9633"
    OpenLink {
        query: String,
        #[arg(long)]
        pick: Option<usize>,
    },
    /// Menu-driven session (default)
    Interactive,
}

#[derive(Subcommand, Debug)]
enum RecentAction {
    List,
    Remove { index: usize },
    Open {
        index: usize,
        #[arg(long)]
        pick: Option<usize>,
    },
}

fn build_session(args: &Args) -> Result<Session> {
    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(base) = &args.api_base {
        config.api_base = base.trim_end_matches('/').to_string();
    }
    if args.lang.is_some() {
        config.lang_override = args.lang;
    }

    let mut session = Session::from_config(&config)
        .with_context(|| format!("Failed to open state in {}", config.state_dir.display()))?;
    if let Some(theme) = args.theme {
        session.state.theme = theme;
    }
    session.json = args.json;
    Ok(session)
}

fn dispatch(session: &mut Session, command: Command) -> bellotreno::bt_error::Result<()> {
    let pick_from = |pick: Option<usize>| move |_: usize| pick.map(|p| p.saturating_sub(1));

    match command {
        Command::Train { number, pick } => BTControllers::train_lookup(session, &number, &mut pick_from(pick)),
        Command::Station { name, pick } => BTControllers::station_lookup(session, &name, &mut pick_from(pick)),
        Command::Board { station_id, name, kind } => {
            let request = BoardRequest::departures(&station_id, &name).switched(kind);
            BTControllers::open_board(session, &request)
        }
        Command::News { mode, region } => BTControllers::announcements(session, Some(mode), Some(region)),
        Command::Recent { action } => match action.unwrap_or(RecentAction::List) {
            RecentAction::List => {
                BTControllers::show_recent(session);
                Ok(())
            }
            RecentAction::Remove { index } => {
                BTControllers::remove_recent(session, index.saturating_sub(1))?;
                BTControllers::show_recent(session);
                Ok(())
            }
            RecentAction::Open { index, pick } => {
                BTControllers::open_recent(session, index.saturating_sub(1), &mut pick_from(pick))
            }
        },
        Command::Lang { code } => BTControllers::set_language(session, code),
        Command::Theme { code } => BTControllers::set_theme(session, code),
        Command::OpenLink { query, pick } => BTControllers::open_link(session, &query, &mut pick_from(pick)),
        Command::Interactive => {
            BTControllers::run(session);
            Ok(())
        }
    }
}

fn run() -> Result<i32> {
    let args = Args::parse();
    let mut session = build_session(&args)?;
    let lang = session.state.lang;

    match dispatch(&mut session, args.command.unwrap_or(Command::Interactive)) {
        Ok(()) => Ok(0),
        Err(e) => {
            if matches!(e, BTError::FileError(_) | BTError::Config(_) | BTError::ParseError(_)) {
                error!("Command failed: {}", e);
            }
            BTViews::show_error(&e, lang);
            Ok(1)
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // Set up panic hook for better error messages
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("\n{}", "═".repeat(70));
        eprintln!("❌ APPLICATION PANIC");
        eprintln!("{}", "═".repeat(70));
        eprintln!("\n{}", panic_info);
        eprintln!("\n💡 Check your internet connection and the state directory, then retry.");
        eprintln!("\n{}", "═".repeat(70));
    }));

    match std::panic::catch_unwind(AssertUnwindSafe(run)) {
        Ok(Ok(code)) => std::process::exit(code),
        Ok(Err(e)) => {
            eprintln!("\n✗ {:#}", e);
            std::process::exit(1);
        }
        Err(_) => {
            eprintln!("\n⚠️  Application terminated unexpectedly");
            std::process::exit(1);
        }
    }
}
