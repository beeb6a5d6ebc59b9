//! Operator CLI: drive a playback session against a live archive backend
//! from a terminal, with a headless probe standing in for the player.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDateTime, TimeDelta};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::info;

use lookback::cursor::{StepDirection, StepUnit};
use lookback::media::ProbeSurface;
use lookback::session::{ExitTrigger, Intent, SessionController, SessionOptions, SessionSnapshot};
use lookback::transport::{HttpTransport, StreamTransport};
use lookback::telemetry;
use lookconf::LookConfig;
use lookproto::{timefmt, Camera, PlaybackRate};

/// Scrub archived camera footage from the terminal.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Config file (takes precedence over ./lookback.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend base URL (overrides config)
    #[arg(long)]
    backend: Option<String>,

    /// Camera to open, by name or 1-based index in the listing
    #[arg(short = 'C', long)]
    camera: Option<String>,

    /// Start timestamp, "YYYY-MM-DD HH:MM:SS" (default: one hour ago)
    #[arg(short, long)]
    start: Option<String>,

    /// Initial playback rate (0.5, 1, 2, 4)
    #[arg(short, long)]
    rate: Option<f64>,

    /// List cameras and exit
    #[arg(long)]
    list: bool,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,
}

enum Command {
    Intent(Intent),
    Exit(ExitTrigger),
    Status,
    Help,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config =
        LookConfig::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(backend) = cli.backend {
        config.backend.base_url = backend;
    }

    telemetry::init(&config.telemetry.log_level);

    if cli.print_config {
        println!("{}", config.to_toml()?);
        return Ok(());
    }

    let transport = Arc::new(HttpTransport::new(&config.backend)?);

    let cameras = transport
        .list_cameras()
        .await
        .context("failed to list cameras")?;
    if cli.list {
        for camera in &cameras {
            println!("{:>3}  {:<24} {}", camera.id, camera.name, camera.video_dir);
        }
        return Ok(());
    }
    if cameras.is_empty() {
        bail!("backend reports no cameras");
    }

    let camera = select_camera(&cameras, cli.camera.as_deref())?;
    info!(camera = %camera.name, dir = %camera.video_dir, "opening session");

    let start = match cli.start.as_deref() {
        Some(s) => timefmt::parse_wire(s).context("invalid --start timestamp")?,
        None => default_start(config.playback.start_rewind_mins),
    };
    let rate = cli
        .rate
        .or(Some(config.playback.default_rate))
        .and_then(PlaybackRate::from_f64)
        .context("playback rate must be one of 0.5, 1, 2, 4")?;

    let (media_tx, media_rx) = mpsc::channel(64);
    let (intent_tx, intent_rx) = mpsc::channel(16);
    let (exit_tx, exit_rx) = mpsc::channel(4);

    let controller = SessionController::new(
        &camera,
        start,
        transport.clone() as Arc<dyn StreamTransport>,
        ProbeSurface::new(media_tx),
        SessionOptions {
            quiet_period: Duration::from_millis(config.playback.quiet_period_ms),
            rate,
        },
    );

    let mut changes = controller.subscribe();
    let status = controller.subscribe();
    tokio::spawn(async move {
        while changes.changed().await.is_ok() {
            let snap = changes.borrow_and_update().clone();
            print_snapshot(&snap);
        }
    });

    // Ctrl-C is this terminal's unmount signal.
    {
        let exit_tx = exit_tx.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = exit_tx.send(ExitTrigger::Unmounting).await;
            }
        });
    }

    let driver = tokio::spawn(controller.run(intent_rx, media_rx, exit_rx));

    print_help();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        match parse_command(line.trim()) {
            Ok(None) => {}
            Ok(Some(Command::Intent(intent))) => {
                if intent_tx.send(intent).await.is_err() {
                    break;
                }
            }
            Ok(Some(Command::Exit(trigger))) => {
                let ended = matches!(
                    trigger,
                    ExitTrigger::Navigation | ExitTrigger::Unmounting
                );
                let _ = exit_tx.send(trigger).await;
                if ended {
                    break;
                }
            }
            Ok(Some(Command::Status)) => print_snapshot(&status.borrow().clone()),
            Ok(Some(Command::Help)) => print_help(),
            Err(msg) => eprintln!("{msg}"),
        }
    }

    // Stdin gone or the operator quit: make sure the session unmounts.
    let _ = exit_tx.send(ExitTrigger::Unmounting).await;
    drop(intent_tx);
    let _ = driver.await;
    Ok(())
}

fn default_start(rewind_mins: i64) -> NaiveDateTime {
    let rewind = TimeDelta::try_minutes(rewind_mins).unwrap_or_default();
    (Local::now() - rewind).naive_local()
}

fn select_camera(cameras: &[Camera], wanted: Option<&str>) -> Result<Camera> {
    match wanted {
        None => {
            if cameras.len() == 1 {
                return Ok(cameras[0].clone());
            }
            for camera in cameras {
                eprintln!("{:>3}  {:<24} {}", camera.id, camera.name, camera.video_dir);
            }
            bail!("several cameras available; pick one with --camera <name|index>");
        }
        Some(wanted) => {
            if let Ok(index) = wanted.parse::<usize>() {
                if let Some(camera) = cameras.get(index.saturating_sub(1)) {
                    return Ok(camera.clone());
                }
            }
            cameras
                .iter()
                .find(|c| c.name.eq_ignore_ascii_case(wanted))
                .cloned()
                .with_context(|| format!("no camera named {wanted:?}"))
        }
    }
}

fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let rest = line[head.len()..].trim();

    let command = match head {
        "p" | "play" | "pause" => Command::Intent(Intent::PlayPause),
        "rate" => {
            let rate: PlaybackRate = rest
                .parse()
                .map_err(|_| "rate must be one of 0.5, 1, 2, 4".to_string())?;
            Command::Intent(Intent::SetRate(rate))
        }
        "drag" => Command::Intent(Intent::DragTo(parse_percent(rest)?)),
        "commit" => Command::Intent(Intent::DragCommit(parse_percent(rest)?)),
        "release" => Command::Intent(Intent::DragCancel),
        "goto" => {
            let time = timefmt::parse_wire(rest)
                .map_err(|e| format!("bad timestamp ({e}); use YYYY-MM-DD HH:MM:SS"))?;
            Command::Intent(Intent::GoTo(time))
        }
        "day" | "month" => {
            let unit = if head == "day" {
                StepUnit::Day
            } else {
                StepUnit::Month
            };
            let direction = match rest {
                "next" | "+" => StepDirection::Forward,
                "prev" | "-" => StepDirection::Back,
                _ => return Err(format!("usage: {head} <next|prev>")),
            };
            Command::Intent(Intent::Step { unit, direction })
        }
        "hide" => Command::Exit(ExitTrigger::VisibilityHidden),
        "blur" => Command::Exit(ExitTrigger::FocusLost),
        "back" => Command::Exit(ExitTrigger::Navigation),
        "q" | "quit" => Command::Exit(ExitTrigger::Unmounting),
        "status" => Command::Status,
        "?" | "help" => Command::Help,
        other => return Err(format!("unknown command {other:?}; try ?")),
    };
    Ok(Some(command))
}

fn parse_percent(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| "expected a timeline percent (0-100)".to_string())?;
    if !(0.0..=100.0).contains(&value) {
        return Err("percent must be within 0-100".to_string());
    }
    Ok(value)
}

fn print_snapshot(snap: &SessionSnapshot) {
    let mut line = format!(
        "[{}] {} rate {}x {:5.1}%",
        snap.state,
        timefmt::format_wire(snap.display_time),
        snap.rate,
        snap.timeline_percent,
    );
    if snap.dragging {
        line.push_str(" (dragging)");
    }
    if snap.buffering {
        line.push_str(" (buffering)");
    }
    if let Some(error) = &snap.error {
        line.push_str(&format!("  !! {error}"));
    }
    println!("{line}");
}

fn print_help() {
    println!(
        "commands:\n\
         \x20 p | play | pause          toggle playback\n\
         \x20 rate <0.5|1|2|4>          change playback rate\n\
         \x20 drag <pct>                preview a timeline position\n\
         \x20 commit <pct>              commit a timeline position\n\
         \x20 release                   cancel a drag preview\n\
         \x20 goto <YYYY-MM-DD HH:MM:SS>  jump to an absolute time\n\
         \x20 day <next|prev>           step one day\n\
         \x20 month <next|prev>         step one month\n\
         \x20 hide | blur               simulate visibility/focus loss\n\
         \x20 back | q                  leave the player\n\
         \x20 status | ?                show state / this help"
    );
}
