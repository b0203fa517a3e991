mod render;
mod server;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nebula_core::{
    Clock, CompanionState, Destination, Engine, Item, MissionCheck, PulseResult, Session, Signal,
    SystemClock, TriggerKind,
};
use nebula_store::{FileConfig, Store, companion_key, load_config, open_store};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rmcp::{ServiceExt, transport::stdio};

#[derive(Parser)]
#[command(name = "nebula", about = "Nebula companion CLI and MCP server")]
struct Cli {
    /// Data directory (defaults to $NEBULA_DATA_DIR, then ~/.nebula)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Companion to act on (defaults to the config file, then "Nebula")
    #[arg(long, global = true)]
    companion: Option<String>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP server on stdio transport
    Serve,

    /// Show the companion without touching its vitals
    Status,

    /// Bring vitals up to date
    Sync,

    /// Play a round of Comet-Paper-Scissors
    Play {
        /// comet, paper or scissors
        signal: String,
    },

    /// Guess the Number Pulse (1-10)
    Pulse { guess: u8 },

    /// Count one chat turn
    Chat,

    /// Feed an item from cargo
    Feed {
        /// e.g. apple, berry, coffee, "magic cookie", "star mote"
        item: String,
    },

    /// Put the companion into a deep sleep
    Rest,

    /// Wake a sleeping companion
    Wake,

    /// Launch an expedition
    Launch {
        /// "asteroid belt", "stellar nursery" or "crab nebula"
        destination: String,
    },

    /// Check in on the active expedition
    Check,

    /// Show recent journal entries
    Journal {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// List stored companions
    List,

    /// Export the companion to a JSON file
    Export {
        /// Output file path
        path: PathBuf,
    },

    /// Import a companion from a JSON file
    Import {
        /// Input file path
        path: PathBuf,
    },

    /// Replace the companion with a fresh hatchling
    Reset,
}

/// Everything a command needs: the store, the engine built from config,
/// and which companion to act on.
struct App {
    store: Store,
    engine: Engine,
    id: String,
    name: String,
}

fn data_dir(cli: &Cli) -> PathBuf {
    cli.data_dir
        .clone()
        .or_else(|| std::env::var("NEBULA_DATA_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(nebula_store::default_base_dir)
}

fn open_app(cli: &Cli) -> Result<App> {
    let dir = data_dir(cli);
    let config: FileConfig = load_config(&dir).context("failed to load nebula.toml")?;
    let name = cli
        .companion
        .clone()
        .unwrap_or_else(|| config.companion_name().to_string());
    let store = open_store(&dir).context("failed to open companion store")?;
    tracing::debug!("data dir {}, companion '{name}'", dir.display());
    Ok(App {
        store,
        engine: Engine::new(config.engine),
        id: companion_key(&name),
        name,
    })
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut app = open_app(&cli)?;
    let now = SystemClock.now();
    let mut rng = SmallRng::from_os_rng();

    match &cli.command {
        Commands::Serve => cmd_serve(app).await,
        Commands::Status => cmd_status(&mut app, now, &mut rng),
        Commands::Sync => cmd_sync(&mut app, now, &mut rng),
        Commands::Play { signal } => cmd_play(&mut app, signal, now, &mut rng),
        Commands::Pulse { guess } => cmd_pulse(&mut app, *guess, now, &mut rng),
        Commands::Chat => cmd_chat(&mut app, now, &mut rng),
        Commands::Feed { item } => cmd_feed(&mut app, item, now, &mut rng),
        Commands::Rest => cmd_rest(&mut app, now, &mut rng),
        Commands::Wake => cmd_wake(&mut app, now, &mut rng),
        Commands::Launch { destination } => cmd_launch(&mut app, destination, now, &mut rng),
        Commands::Check => cmd_check(&mut app, now, &mut rng),
        Commands::Journal { limit } => cmd_journal(&mut app, *limit, now, &mut rng),
        Commands::List => cmd_list(&app),
        Commands::Export { path } => cmd_export(&app, path),
        Commands::Import { path } => cmd_import(&app, path, now),
        Commands::Reset => cmd_reset(&mut app, now, &mut rng),
    }
}

/// Check the companion out of the store, hatching it on first use.
fn checkout<'a>(
    app: &'a mut App,
    now: f64,
    rng: &mut SmallRng,
) -> Result<(Session<&'a mut Store>, &'a Engine)> {
    let App {
        store,
        engine,
        id,
        name,
    } = app;
    let engine: &'a Engine = engine;
    let name = name.as_str();
    let session = Session::open(store, id.as_str(), || {
        tracing::info!("hatching new companion '{name}'");
        engine.new_companion(name, now, rng)
    })
    .context("failed to load companion")?;
    Ok((session, engine))
}

fn print_hooks(hooks: &[nebula_core::NarrativeHook]) {
    for hook in hooks {
        println!("{hook}");
    }
}

fn print_status(engine: &Engine, state: &CompanionState, now: f64) {
    println!("{}", render::status_text(&engine.status(state, now)));
}

async fn cmd_serve(app: App) -> Result<()> {
    tracing::info!("starting MCP server for companion '{}'", app.name);

    let server = server::NebulaServer::new(app.store, app.engine, &app.id, &app.name);
    let service = server
        .serve(stdio())
        .await
        .context("failed to start MCP server")?;
    service.waiting().await?;
    Ok(())
}

fn cmd_status(app: &mut App, now: f64, rng: &mut SmallRng) -> Result<()> {
    let (mut session, engine) = checkout(app, now, rng)?;
    if session.is_new() {
        session.flush().context("failed to save new companion")?;
    }
    print_status(engine, session.state(), now);
    Ok(())
}

fn cmd_sync(app: &mut App, now: f64, rng: &mut SmallRng) -> Result<()> {
    let (mut session, engine) = checkout(app, now, rng)?;
    let report = session.apply(|s| Ok(engine.sync(s, &TriggerKind::ManualSync, now)))?;
    if let Some(report) = report {
        if report.clock_skew {
            tracing::warn!("stored sync time is ahead of the clock; no decay charged");
        }
        println!("synced {:.0}s", report.charged_secs);
    }
    print_status(engine, session.state(), now);
    Ok(())
}

fn cmd_play(app: &mut App, signal: &str, now: f64, rng: &mut SmallRng) -> Result<()> {
    let signal: Signal = signal.parse()?;
    let (mut session, engine) = checkout(app, now, &mut *rng)?;
    let out = session.apply(|s| engine.play_signal(s, signal, now, rng))?;
    let round = out.value.round;
    println!(
        "you: {}, {}: {} -> {:?}, {}",
        round.player,
        session.state().name,
        round.companion,
        round.outcome,
        render::award_text(&out.value.award)
    );
    print_hooks(&out.hooks);
    Ok(())
}

fn cmd_pulse(app: &mut App, guess: u8, now: f64, rng: &mut SmallRng) -> Result<()> {
    let (mut session, engine) = checkout(app, now, &mut *rng)?;
    let out = session.apply(|s| engine.pulse(s, guess, now, rng))?;
    match out.value.result {
        PulseResult::TooLow => println!("{guess}: too low"),
        PulseResult::TooHigh => println!("{guess}: too high"),
        PulseResult::Locked { attempts } => {
            let award = out
                .value
                .award
                .map(|a| render::award_text(&a))
                .unwrap_or_default();
            println!("{guess}: locked in {attempts} attempt(s), {award}");
        }
    }
    print_hooks(&out.hooks);
    Ok(())
}

fn cmd_chat(app: &mut App, now: f64, rng: &mut SmallRng) -> Result<()> {
    let (mut session, engine) = checkout(app, now, &mut *rng)?;
    let out = session.apply(|s| engine.chat_turn(s, now, rng))?;
    match out.value.milestone {
        Some(award) => println!(
            "turn {}: milestone, {}",
            out.value.turn,
            render::award_text(&award)
        ),
        None => println!("turn {}", out.value.turn),
    }
    print_hooks(&out.hooks);
    Ok(())
}

fn cmd_feed(app: &mut App, item: &str, now: f64, rng: &mut SmallRng) -> Result<()> {
    let item: Item = item.parse()?;
    let (mut session, engine) = checkout(app, now, rng)?;
    let out = session.apply(|s| engine.feed(s, item, now))?;
    match out.value.after_effect {
        Some(d) => println!("fed {item}, now {d}"),
        None => println!("fed {item}"),
    }
    print_hooks(&out.hooks);
    Ok(())
}

fn cmd_rest(app: &mut App, now: f64, rng: &mut SmallRng) -> Result<()> {
    let (mut session, engine) = checkout(app, now, rng)?;
    let report = session.apply(|s| engine.rest(s, now))?;
    println!("asleep, energy {:.1}", report.after.energy());
    Ok(())
}

fn cmd_wake(app: &mut App, now: f64, rng: &mut SmallRng) -> Result<()> {
    let (mut session, engine) = checkout(app, now, rng)?;
    let report = session.apply(|s| engine.wake(s, now))?;
    println!("awake after {:.0}s, energy {:.1}", report.charged_secs, report.after.energy());
    Ok(())
}

fn cmd_launch(app: &mut App, destination: &str, now: f64, rng: &mut SmallRng) -> Result<()> {
    let destination: Destination = destination.parse()?;
    let (mut session, engine) = checkout(app, now, rng)?;
    let mission = session.apply(|s| engine.start_mission(s, destination, now))?;
    println!(
        "launched toward the {}, back in {:.0}s",
        mission.destination, mission.duration_secs
    );
    Ok(())
}

fn cmd_check(app: &mut App, now: f64, rng: &mut SmallRng) -> Result<()> {
    let (mut session, engine) = checkout(app, now, &mut *rng)?;
    let out = session.apply(|s| Ok(engine.check_mission(s, now, rng)))?;
    match &out.value {
        MissionCheck::Idle => println!("no active mission"),
        MissionCheck::InFlight { remaining_secs } => {
            println!("in flight, {:.0}s left", remaining_secs.ceil());
        }
        MissionCheck::Completed(report) => {
            println!(
                "returned from the {}, {}",
                report.mission.destination,
                render::award_text(&report.award)
            );
            if let Some(item) = report.found {
                println!("found {item}");
            }
            if let Some(item) = report.dropped {
                println!("cargo full, left {item} behind");
            }
        }
    }
    print_hooks(&out.hooks);
    Ok(())
}

fn cmd_journal(app: &mut App, limit: usize, now: f64, rng: &mut SmallRng) -> Result<()> {
    let (session, _) = checkout(app, now, rng)?;
    for entry in session.state().recent_journal(limit) {
        println!(
            "{}  {}",
            nebula_core::time::unix_to_iso8601(entry.at),
            entry.text
        );
    }
    Ok(())
}

fn cmd_list(app: &App) -> Result<()> {
    let ids = app
        .store
        .list_companions()
        .context("failed to list companions")?;
    if ids.is_empty() {
        println!("(no companions)");
    }
    for id in ids {
        println!("{id}");
    }
    Ok(())
}

fn cmd_export(app: &App, path: &Path) -> Result<()> {
    app.store
        .export_json_file(&app.id, path)
        .context("failed to export companion")?;
    println!("exported to {}", path.display());
    Ok(())
}

fn cmd_import(app: &App, path: &Path, now: f64) -> Result<()> {
    let state = app
        .store
        .import_json_file(&app.id, path)
        .context("failed to import JSON")?;
    println!("imported from {}", path.display());
    print_status(&app.engine, &state, now);
    Ok(())
}

fn cmd_reset(app: &mut App, now: f64, rng: &mut SmallRng) -> Result<()> {
    let (mut session, engine) = checkout(app, now, &mut *rng)?;
    session.apply(|s| {
        engine.reset(s, now, rng);
        Ok(())
    })?;
    println!("{} hatched anew", session.state().name);
    Ok(())
}
