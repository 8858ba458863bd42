//! pacer-replay
//!
//! Replays a recorded accelerometer trace through the step engine with a
//! scripted consent prompt and prints a TOML report.

use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context};
use clap::{Parser, ValueEnum};
use embassy_futures::join::join;
use embassy_futures::{block_on, yield_now};
use serde::Serialize;

use pacer_core::config::{Capabilities, EngineConfig};
use pacer_core::progress::ChatContext;
use pacer_core::Engine;
use pacer_shell::channels::{AppEvent, EventChannel, MotionFeed};
use pacer_shell::config::{save_stored, ConfigLoader};
use pacer_shell::platform::{
    parse_trace, replay, ConsentScript, HostClock, ReplayStream, ScriptedGate, TraceRecord,
};
use pacer_shell::Controller;

#[derive(Parser)]
#[command(
    name = "pacer-replay",
    about = "Replay an accelerometer trace through the Pacer step engine",
    version
)]
struct Cli {
    /// Trace file (`t_ms,x,y,z` per line, `#` comments)
    trace: PathBuf,

    /// How the consent prompt answers
    #[arg(long, value_enum, default_value_t = ConsentMode::Grant)]
    consent: ConsentMode,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Stored configuration blob, used when the TOML file is missing
    #[arg(long)]
    stored: Option<PathBuf>,

    /// Write the active configuration as a stored blob
    #[arg(long)]
    save_stored: Option<PathBuf>,

    /// Platform without a consent gate (tracking auto-starts)
    #[arg(long, conflicts_with = "no_motion")]
    no_gate: bool,

    /// Platform without a motion API
    #[arg(long)]
    no_motion: bool,

    /// Feed readings at trace speed, stamped by the host clock
    #[arg(long)]
    realtime: bool,

    /// Log engine decisions to stderr (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ConsentMode {
    /// Every request is granted
    Grant,
    /// Every request is denied
    Deny,
    /// The first request needs a user gesture; a tap is simulated first
    Gesture,
    /// The request mechanism fails
    Fail,
}

impl From<ConsentMode> for ConsentScript {
    fn from(mode: ConsentMode) -> Self {
        match mode {
            ConsentMode::Grant => ConsentScript::Grant,
            ConsentMode::Deny => ConsentScript::Deny,
            ConsentMode::Gesture => ConsentScript::Gesture,
            ConsentMode::Fail => ConsentScript::Fail,
        }
    }
}

#[derive(Serialize)]
struct Report {
    config: &'static str,
    readings: usize,
    dropped: u32,
    steps: u32,
    goal: u32,
    percent: u8,
    permission: &'static str,
    tracking_starts: u32,
    subscriptions: u32,
    error: Option<&'static str>,
    chat: ChatContext,
}

fn main() {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = run(&cli).and_then(|report| {
        toml::to_string(&report).context("failed to format report")
    });

    match result {
        Ok(text) => print!("{text}"),
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<Report> {
    let text = fs::read_to_string(&cli.trace)
        .with_context(|| format!("failed to read trace {}", cli.trace.display()))?;
    let records = parse_trace(&text)
        .with_context(|| format!("failed to parse trace {}", cli.trace.display()))?;

    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_toml(path);
    }
    if let Some(path) = &cli.stored {
        loader = loader.with_stored(path);
    }
    let (config, source) = loader.load().context("failed to load config")?;

    if let Some(path) = &cli.save_stored {
        save_stored(path, &config)
            .with_context(|| format!("failed to write stored config {}", path.display()))?;
    }

    let capabilities = if cli.no_motion {
        Capabilities::unsupported()
    } else if cli.no_gate {
        Capabilities::ungated()
    } else {
        Capabilities::gated()
    };

    let stream = ReplayStream::new();
    let engine = Engine::new(config, capabilities, stream.clone())
        .map_err(|e| anyhow!("invalid engine config: {e}"))?;
    let mut controller = Controller::new(engine, ScriptedGate::new(cli.consent.into()));

    block_on(controller.boot());

    let channel = EventChannel::new();
    let sender = channel.sender();
    let tap = cli.consent == ConsentMode::Gesture;

    let dropped = if cli.realtime {
        let mut feed = MotionFeed::new(channel.sender(), HostClock::new());
        let producer = async {
            if tap {
                sender.send(AppEvent::Gesture).await;
            }
            feed_realtime(&records, &mut feed).await;
            sender.send(AppEvent::Shutdown).await;
        };
        block_on(join(producer, controller.run(channel.receiver())));
        feed.dropped()
    } else {
        let producer = async {
            if tap {
                sender.send(AppEvent::Gesture).await;
            }
            replay(&records, &sender).await;
            sender.send(AppEvent::Shutdown).await;
        };
        block_on(join(producer, controller.run(channel.receiver())));
        0
    };

    if dropped > 0 {
        tracing::warn!(dropped, "Readings dropped while the event channel was full");
    }

    Ok(build_report(&controller, source.label(), records.len(), dropped, &stream, &config))
}

/// Deliver readings at the pace recorded in the trace
async fn feed_realtime(records: &[TraceRecord], feed: &mut MotionFeed<'_, HostClock>) {
    let Some(first) = records.first() else {
        return;
    };
    let origin = Instant::now();

    for record in records {
        let due = origin + Duration::from_millis(record.at_ms.saturating_sub(first.at_ms));
        let now = Instant::now();
        if due > now {
            thread::sleep(due - now);
        }

        feed.on_reading(record.reading);
        yield_now().await;
    }
}

fn build_report(
    controller: &Controller<ReplayStream, ScriptedGate>,
    source: &'static str,
    readings: usize,
    dropped: u32,
    stream: &ReplayStream,
    config: &EngineConfig,
) -> Report {
    let snapshot = controller.snapshot();

    Report {
        config: source,
        readings,
        dropped,
        steps: snapshot.steps,
        goal: config.goal_steps,
        percent: snapshot.progress.percent(),
        permission: snapshot.permission.label(),
        tracking_starts: controller.engine().lifecycle().starts(),
        subscriptions: stream.subscriptions(),
        error: snapshot.error_message(),
        chat: controller.engine().chat_context(),
    }
}
