//! RoomGuard host entry point.
//!
//! Runs the engine against a simulated server room, with manual
//! overrides typed on stdin.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  SimulatedRoom   LogIndicator   LogEventSink   JsonTelemetry   │
//! │  (SensorPort)    (Indicator)    (EventSink)    (EventSink)     │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              GuardService (pure logic)                 │    │
//! │  │  Estimator · Actuators · Classifier · Sequencer        │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Scheduler (delegate-driven) · stdin reader → OVERRIDE_CHANNEL │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn};

use roomguard::adapters::Tee;
use roomguard::adapters::indicator::LogIndicator;
use roomguard::adapters::json_sink::JsonTelemetrySink;
use roomguard::adapters::log_sink::LogEventSink;
use roomguard::adapters::simulated::SimulatedRoom;
use roomguard::adapters::time::HostClock;
use roomguard::app::channels::{self, OVERRIDE_CHANNEL};
use roomguard::app::ports::{SchedulerDelegate, TaskId};
use roomguard::app::service::GuardService;
use roomguard::config::GuardConfig;
use roomguard::scheduler::{Scheduler, Task};

type Sink = Tee<LogEventSink, JsonTelemetrySink<Box<dyn Write>>>;

#[derive(Debug, Parser)]
#[command(name = "roomguard", version, about = "Server-room environmental guardian")]
struct Args {
    /// JSON configuration file; built-in defaults when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Stop after this many sensor ticks.
    #[arg(short = 'n', long)]
    ticks: Option<u64>,

    /// Seed for the simulated room (random when omitted).
    #[arg(long)]
    seed: Option<u64>,

    /// Simulate a deployment without a gas sensor.
    #[arg(long)]
    no_gas_sensor: bool,

    /// Run simulated time this many times faster than wall time.
    #[arg(long, default_value_t = 1)]
    speedup: u32,

    /// Print one JSON telemetry record per sensor tick on stdout.
    #[arg(long)]
    json: bool,

    /// Log level for the roomguard crate.
    #[arg(long, default_value = "info")]
    log_level: String,
}

// ── Scheduler delegate ────────────────────────────────────────
//
// Bridges the scheduler (which knows nothing about the service) to the
// engine.  Every due task first forwards overrides posted by the input
// thread, then runs either a sensor tick or an override drain.

struct LoopDelegate<'a> {
    service: &'a mut GuardService,
    room: &'a mut SimulatedRoom,
    indicator: &'a mut LogIndicator,
    sink: &'a mut Sink,
    sensor_ticks: u64,
}

impl SchedulerDelegate for LoopDelegate<'_> {
    fn on_task_due(&mut self, task: TaskId, now_ms: u64) {
        channels::forward(&OVERRIDE_CHANNEL, &mut *self.service);
        match task {
            TaskId::SensorTick => {
                self.service.tick(
                    now_ms,
                    &mut *self.room,
                    &mut *self.indicator,
                    &mut *self.sink,
                );
                self.sensor_ticks += 1;
            }
            TaskId::InputPoll => {
                self.service
                    .apply_overrides(&mut *self.indicator, &mut *self.sink);
            }
        }
    }
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();

    // ── 1. Logging (stderr, so stdout stays clean for --json) ─
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                let app_name = env!("CARGO_PKG_NAME").replace('-', "_");
                format!("{app_name}={}", args.log_level).into()
            }),
        )
        .with_writer(io::stderr)
        .init();

    info!("╔══════════════════════════════════════╗");
    info!("║  RoomGuard v{}                    ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = load_config(args.config.as_deref())?;
    let timing = config.timing;

    // ── 3. Adapters ───────────────────────────────────────────
    let mut room = match args.seed {
        Some(seed) => {
            info!("Simulated room seeded with {}", seed);
            SimulatedRoom::seeded(seed)
        }
        None => SimulatedRoom::from_entropy(),
    };
    if args.no_gas_sensor {
        info!("Gas sensor disabled: gas channel reads NaN");
        room = room.without_gas_sensor();
    }
    let mut indicator = LogIndicator::new();
    let telemetry_out: Box<dyn Write> = if args.json {
        Box::new(io::stdout())
    } else {
        Box::new(io::sink())
    };
    let mut sink = Tee(LogEventSink::new(), JsonTelemetrySink::new(telemetry_out));
    let clock = HostClock::new(args.speedup);

    // ── 4. Service ────────────────────────────────────────────
    let mut service = GuardService::new(config).context("invalid configuration")?;
    service.start(&mut indicator, &mut sink);

    // ── 5. Manual input ───────────────────────────────────────
    spawn_input_reader()?;
    info!("Commands: fan | dehum | reset | gas+ | gas- | gas=auto | fan=on/off | dehum=on/off");

    // ── 6. Scheduler ──────────────────────────────────────────
    let mut sched = Scheduler::new();
    let now = clock.now_ms();
    sched
        .add(
            Task {
                label: "sensor",
                id: TaskId::SensorTick,
                interval_ms: timing.sensor_interval_ms,
            },
            now,
        )
        .context("scheduler rejected the sensor task")?;
    sched
        .add(
            Task {
                label: "input",
                id: TaskId::InputPoll,
                interval_ms: timing.input_poll_ms,
            },
            now,
        )
        .context("scheduler rejected the input task")?;

    // ── 7. Control loop ───────────────────────────────────────
    let mut delegate = LoopDelegate {
        service: &mut service,
        room: &mut room,
        indicator: &mut indicator,
        sink: &mut sink,
        sensor_ticks: 0,
    };
    let idle = Duration::from_millis(u64::from(timing.input_poll_ms));

    loop {
        sched.poll(clock.now_ms(), &mut delegate);

        if args.ticks.is_some_and(|limit| delegate.sensor_ticks >= limit) {
            break;
        }

        let wait = sched.next_due_ms().map_or(idle, |due| clock.until(due));
        thread::sleep(wait);
    }

    let ticks = delegate.sensor_ticks;
    if sched.missed() > 0 {
        warn!("Loop fell behind: {} periods skipped", sched.missed());
    }
    let snapshot = serde_json::to_string(&service.snapshot())?;
    info!("Stopped after {} sensor ticks: {}", ticks, snapshot);
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<GuardConfig> {
    let Some(path) = path else {
        info!("No config file given, using defaults");
        return Ok(GuardConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config = GuardConfig::from_json(&text)
        .with_context(|| format!("loading config {}", path.display()))?;
    info!("Config loaded from {}", path.display());
    Ok(config)
}

/// Read override keywords (or dashboard JSON) line by line from stdin
/// and post them to the override channel.
fn spawn_input_reader() -> Result<()> {
    thread::Builder::new()
        .name("input".into())
        .spawn(|| {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                channels::post_line(&OVERRIDE_CHANNEL, &line);
            }
            debug!("stdin closed, manual input stopped");
        })
        .context("spawning input reader")?;
    Ok(())
}
