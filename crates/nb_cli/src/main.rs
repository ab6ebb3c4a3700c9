use std::io::{self, BufRead, Write};
use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use nb_core::{Error, Result};
use nb_inference::models::UpstreamConfig;
use nb_inference::{create_relay, AggregatorConfig, RelayConfig, SummaryAggregator};
use nb_speech::{
    PlaybackController, PlaybackDriver, PlaybackHandle, PlaybackSpeed, ProcessEngine, ProcessEngineConfig,
};
use nb_storage::{create_store, HistoryStore};
use nb_web::state::AppState;
use tracing::{info, warn};

mod logging;
mod render;
mod session;

use session::{SearchOutcome, SearchSession};

#[derive(Parser, Debug)]
#[command(author, version, about = "AI news briefs from the command line", long_about = None)]
pub struct Cli {
    /// Relay endpoint that holds the provider key
    #[arg(long, env = "NB_RELAY_URL", global = true)]
    relay_url: Option<String>,
    /// Provider key, used directly when no relay is set and by `serve`
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,
    #[arg(long, env = "GEMINI_MODEL", global = true)]
    model: Option<String>,
    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,
    #[arg(long, default_value = "file", help = "History backend: file (default) or memory", global = true)]
    storage: String,
    #[arg(long, env = "NB_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search for a topic and print the brief
    Search {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
        #[command(flatten)]
        speech: SpeechArgs,
    },
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },
    /// Run the HTTP relay
    Serve {
        #[arg(long, env = "NB_BIND", default_value = "0.0.0.0:3000")]
        bind: SocketAddr,
    },
}

#[derive(Subcommand, Debug)]
enum HistoryCommands {
    List,
    Show {
        id: String,
        #[command(flatten)]
        speech: SpeechArgs,
    },
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(clap::Args, Debug)]
struct SpeechArgs {
    /// Read the brief aloud
    #[arg(long)]
    speak: bool,
    #[arg(long, default_value = "1.0x", value_parser = parse_speed)]
    speed: PlaybackSpeed,
    #[arg(long, default_value = "espeak-ng")]
    tts_command: String,
    #[arg(long, default_value = "ko")]
    voice: String,
}

fn parse_speed(s: &str) -> std::result::Result<PlaybackSpeed, String> {
    PlaybackSpeed::parse(s).ok_or_else(|| format!("unsupported speed {:?}, expected 1.0x, 1.2x or 1.5x", s))
}

async fn open_history(cli: &Cli) -> Result<HistoryStore> {
    let store = create_store(&cli.storage, cli.data_dir.clone())?;
    HistoryStore::load(store).await
}

async fn open_session(cli: &Cli) -> Result<SearchSession> {
    let relay = create_relay(&RelayConfig {
        relay_url: cli.relay_url.clone(),
        api_key: cli.api_key.clone(),
        model_name: cli.model.clone(),
        timeout_secs: cli.timeout,
    })?;
    info!("🤖 Using {} relay", relay.name());
    let aggregator = SummaryAggregator::new(relay, AggregatorConfig::default());
    Ok(SearchSession::new(aggregator, open_history(cli).await?))
}

struct Speaker {
    driver: PlaybackDriver<ProcessEngine>,
    handle: PlaybackHandle,
}

/// Attaches a speech engine to the session when `--speak` is set.
fn attach_speech(session: SearchSession, speech: &SpeechArgs) -> (SearchSession, Option<Speaker>) {
    if !speech.speak {
        return (session, None);
    }
    let (engine, completions) = ProcessEngine::new(ProcessEngineConfig {
        program: speech.tts_command.clone(),
        voice: speech.voice.clone(),
    });
    let controller = PlaybackController::new(engine).with_speed(speech.speed);
    let (driver, handle) = PlaybackDriver::new(controller, completions);
    let session = session.with_playback(handle.clone(), true);
    (session, Some(Speaker { driver, handle }))
}

/// Waits until everything queued has been read. Ctrl-C stops playback.
async fn finish_speech(speaker: Option<Speaker>) -> Result<()> {
    let Some(Speaker { mut driver, handle }) = speaker else {
        return Ok(());
    };
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("⏹️ Stopping playback");
            handle.stop();
        }
    });
    let result = driver.run_until_idle().await;
    interrupt.abort();
    result
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

async fn run_search(session: &mut SearchSession, query: &str) -> Result<()> {
    info!("🔍 Searching news for \"{}\"", query);
    match session.search(query).await {
        SearchOutcome::Skipped => warn!("Empty query, nothing to search"),
        SearchOutcome::Loaded => {
            if let Some(data) = session.current() {
                print!("{}", render::brief(query, data));
            }
        }
        SearchOutcome::Failed(e) => {
            if let Some(message) = session.error() {
                eprintln!("❌ {}", message);
            }
            return Err(e);
        }
    }
    Ok(())
}

fn show_history(session: &mut SearchSession, id: &str) -> Result<()> {
    let query = session
        .history()
        .get(id)
        .map(|item| item.query.clone())
        .ok_or_else(|| Error::Config(format!("no history item with id {}", id)))?;
    if let Some(data) = session.select_history(id) {
        print!("{}", render::brief(&query, data));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    match &cli.command {
        Commands::Search { query, speech } => {
            let query = query.join(" ");
            let (mut session, speaker) = attach_speech(open_session(&cli).await?, speech);
            run_search(&mut session, &query).await?;
            finish_speech(speaker).await?;
        }
        Commands::History { command } => match command {
            HistoryCommands::List => {
                let history = open_history(&cli).await?;
                print!("{}", render::history(&history));
            }
            HistoryCommands::Show { id, speech } => {
                let session = SearchSession::replay(open_history(&cli).await?);
                let (mut session, speaker) = attach_speech(session, speech);
                show_history(&mut session, id)?;
                finish_speech(speaker).await?;
            }
            HistoryCommands::Clear { yes } => {
                let mut history = open_history(&cli).await?;
                if history.is_empty() {
                    println!("검색 기록이 없습니다.");
                } else if *yes || confirm("모든 검색 기록을 삭제하시겠습니까?")? {
                    history.clear().await?;
                    info!("🗑️ Cleared search history");
                }
            }
        },
        Commands::Serve { bind } => {
            let upstream = cli.api_key.clone().map(|key| {
                let mut config = UpstreamConfig::new(key);
                if let Some(model) = &cli.model {
                    config.model = model.clone();
                }
                config
            });
            if upstream.is_none() {
                warn!("GEMINI_API_KEY is not set, relay requests will fail");
            }
            let state = AppState::new(upstream)?;
            nb_web::serve(state, *bind).await?;
        }
    }

    Ok(())
}
