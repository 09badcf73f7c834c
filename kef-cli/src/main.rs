use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use kef_sdk::logging::{init_logging, init_logging_from_env, LoggingMode};
use kef_sdk::{
    ConfigFlow, EntryStore, FlowResult, KefClient, KefConnector, MediaPlayer, PhysicalSource,
    PlayMode, PlayerCommand, PlayerConfig, Poller,
};
use tracing::{debug, info};

mod output;

/// Control KEF LSX II, LS50 Wireless II and LS60 speakers
#[derive(Parser, Debug)]
#[command(name = "kefctl")]
#[command(version, about)]
pub struct Args {
    /// Speaker host or IP; defaults to the first configured speaker
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Entry store file [env: KEF_CONFIG]
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Log to stderr; repeat for more detail
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Validate a speaker and remember it
    Setup {
        #[arg(value_name = "HOST")]
        address: String,
    },
    /// List configured speakers
    Entries,
    /// Print the speaker's current state
    Status,
    /// Change the volume
    Volume {
        #[command(subcommand)]
        action: VolumeAction,
    },
    Mute { state: Switch },
    /// Select an input: wifi, bluetooth, tv, optical, usb, analog
    Source { name: String },
    Power { state: Switch },
    PlayPause,
    Next,
    Previous,
    /// Jump to a position in the current track
    Seek { seconds: f64 },
    /// normal, repeatOne, repeatAll, shuffle, shuffleRepeatAll, shuffleRepeatOne
    PlayMode { mode: String },
    Like,
    Dislike,
    /// Play a media URI on the streaming player
    PlayMedia { uri: String },
    /// Poll the speaker and print every refresh until interrupted
    Watch {
        /// Seconds between refreshes
        #[arg(long, default_value_t = 10)]
        interval: u64,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum VolumeAction {
    /// Set the volume, 0-100
    Set {
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        level: u8,
    },
    Up,
    Down,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Switch {
    On,
    Off,
}

impl Command {
    /// The player command this CLI command maps to, if it is one
    fn player_command(&self) -> Result<Option<PlayerCommand>> {
        let command = match self {
            Command::Volume { action } => match action {
                VolumeAction::Set { level } => PlayerCommand::SetVolumeLevel(f64::from(*level) / 100.0),
                VolumeAction::Up => PlayerCommand::VolumeUp,
                VolumeAction::Down => PlayerCommand::VolumeDown,
            },
            Command::Mute { state } => PlayerCommand::Mute(*state == Switch::On),
            Command::Source { name } => {
                let source: PhysicalSource = name.parse()?;
                PlayerCommand::SelectSource(source)
            }
            Command::Power { state: Switch::On } => PlayerCommand::TurnOn,
            Command::Power { state: Switch::Off } => PlayerCommand::TurnOff,
            Command::PlayPause => PlayerCommand::PlayPause,
            Command::Next => PlayerCommand::NextTrack,
            Command::Previous => PlayerCommand::PreviousTrack,
            Command::Seek { seconds } => PlayerCommand::Seek(*seconds),
            Command::Like => PlayerCommand::Like,
            Command::Dislike => PlayerCommand::Dislike,
            Command::PlayMedia { uri } => PlayerCommand::PlayMedia(uri.clone()),
            _ => return Ok(None),
        };
        Ok(Some(command))
    }
}

fn init_tracing(verbose: u8) -> Result<()> {
    if verbose > 0 {
        init_logging(LoggingMode::from_verbosity(verbose))?;
    } else {
        init_logging_from_env()?;
    }
    Ok(())
}

fn load_store(path: Option<&PathBuf>) -> Result<EntryStore> {
    let store = match path {
        Some(path) => EntryStore::load(path)?,
        None => EntryStore::load_default()?,
    };
    debug!(path = %store.path().display(), "using entry store");
    Ok(store)
}

/// `--host` if given, else the first configured speaker
fn resolve_host(host: Option<String>, store: &EntryStore) -> Result<String> {
    if let Some(host) = host {
        return Ok(host);
    }
    store
        .first()
        .map(|entry| entry.host.clone())
        .ok_or_else(|| anyhow!("No speaker configured. Run `kefctl setup <host>` or pass --host"))
}

fn setup(host: &str, store: &mut EntryStore) -> Result<()> {
    let result = ConfigFlow::new(KefClient::new(), store).step_user(Some(host));

    match result {
        FlowResult::CreateEntry(entry) => {
            store.save()?;
            println!("Added {} ({})", entry.title, entry.host);
        }
        FlowResult::ShowForm { errors, .. } => {
            let reason = errors.get("base").copied().unwrap_or("invalid input");
            bail!("Could not set up {}: {}", host, reason);
        }
        FlowResult::Abort(reason) => {
            println!("{} is already configured ({:?})", host, reason);
        }
    }
    Ok(())
}

fn run_command(player: &mut MediaPlayer, command: &Command, json: bool) -> Result<()> {
    player.update().context("Failed to read speaker state")?;

    if let Command::PlayMode { mode } = command {
        let mode: PlayMode = mode.parse()?;
        player.speaker().set_play_mode(mode)?;
        std::thread::sleep(player.config().command_refresh_delay);
    } else if let Some(player_command) = command.player_command()? {
        info!(command = player_command.name(), "sending command");
        if let Some(delay) = player.execute(&player_command)? {
            std::thread::sleep(delay);
        }
    }

    player.update().context("Failed to refresh speaker state")?;
    println!("{}", output::render_snapshot(&player.snapshot(), json)?);
    Ok(())
}

fn watch(player: MediaPlayer, json: bool) -> Result<()> {
    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = interrupted.clone();
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
        .context("Failed to install Ctrl-C handler")?;

    let (poller, snapshots) = Poller::spawn(player)?;

    while !interrupted.load(Ordering::SeqCst) {
        match snapshots.recv_timeout(Duration::from_millis(500)) {
            Ok(snapshot) => println!("{}\n", output::render_snapshot(&snapshot, json)?),
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {}
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    let stats = poller.shutdown()?;
    info!(
        refreshes = stats.refreshes,
        failures = stats.refresh_failures,
        "stopped watching"
    );
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose)?;

    let mut store = load_store(args.config.as_ref())?;

    match &args.command {
        Command::Setup { address } => return setup(address, &mut store),
        Command::Entries => {
            println!("{}", output::render_entries(store.entries()));
            return Ok(());
        }
        _ => {}
    }

    let host = resolve_host(args.host.clone(), &store)?;
    let speaker = KefConnector::with_client(host, KefClient::new());

    match &args.command {
        Command::Watch { interval } => {
            let config = PlayerConfig::default().with_poll_interval(Duration::from_secs(*interval));
            config.validate()?;
            watch(MediaPlayer::with_config(speaker, config), args.json)
        }
        command => run_command(&mut MediaPlayer::new(speaker), command, args.json),
    }
}
