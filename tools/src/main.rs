//! board-runner: headless runner for the community status board.
//!
//! Usage:
//!   board-runner --host play.example.org
//!   board-runner --repo rust-lang/rust --once --ticks 10
//!   board-runner --config board.json
//!
//! Periodic mode renders to the terminal on every tick and reads
//! control commands as JSON lines on stdin:
//!   {"cmd":"set_credential","token":"..."}
//!   {"cmd":"clear_credential"}
//! The bearer credential may also be seeded via the BOARD_TOKEN
//! environment variable.

use anyhow::Result;
use std::env;
use std::io::{self, BufRead};
use std::path::Path;
use tokio::sync::mpsc;

use statusboard_core::{
    config::{BoardConfig, SourceConfig},
    refresher::{RefreshOutcome, Refresher},
    render::{Card, RenderTarget, StatusLine},
    scheduler::{run_board, ControlCommand},
    simulator::Simulator,
};

/// Static feature-list content shown once at startup. Pure
/// presentation — the board logic never reads it.
const FEATURES: [(&str, &str); 6] = [
    (
        "No Hacking",
        "Our #1 rule. This is a hacking-free zone. We maintain a secure, safe environment for all members.",
    ),
    (
        "Friendly Greetings",
        "Every member is welcomed warmly. We're all about positive vibes and making new friends.",
    ),
    (
        "Family-Friendly",
        "A safe space for kids and adults. Active moderation ensures everyone feels comfortable and respected at all times.",
    ),
    (
        "Active Chat",
        "Engage in conversations, share experiences, and connect with like-minded individuals.",
    ),
    (
        "Supportive Community",
        "Whether you're new or a veteran, our community is here to help and support you.",
    ),
    (
        "Fast & Reliable",
        "Optimized performance with minimal latency for the best possible experience.",
    ),
];

/// Terminal render target. Every replace-all lands as a reprinted
/// block; the board owns what goes in each slot.
struct TerminalPanel {
    source_label: String,
}

impl TerminalPanel {
    fn new() -> Self {
        Self {
            source_label: String::new(),
        }
    }

    fn print_cards(&self, heading: &str, cards: &[Card]) {
        println!("--- {heading} ---");
        for card in cards {
            if card.subtext.is_empty() {
                println!("  {:<16} {}", card.label, card.value);
            } else {
                println!("  {:<16} {}  ({})", card.label, card.value, card.subtext);
            }
        }
    }
}

impl RenderTarget for TerminalPanel {
    fn replace_status_cards(&mut self, cards: &[Card]) {
        let heading = if self.source_label.is_empty() {
            "STATUS".to_string()
        } else {
            format!("STATUS {}", self.source_label)
        };
        self.print_cards(&heading, cards);
    }

    fn replace_live_cards(&mut self, cards: &[Card]) {
        self.print_cards("LIVE", cards);
    }

    fn set_status_line(&mut self, line: StatusLine) {
        match line {
            StatusLine::Text(text) => println!("  {text}"),
            StatusLine::Link { href, label } => println!("  {label} -> {href}"),
        }
    }

    fn set_source_label(&mut self, label: &str) {
        self.source_label = label.to_string();
    }

    fn set_last_updated(&mut self, text: &str) {
        println!("  {text}");
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let once = args.iter().any(|a| a == "--once");
    let ticks = parse_arg(&args, "--ticks", 10u64);

    let mut config = match arg_value(&args, "--config") {
        Some(path) => BoardConfig::load(Path::new(path))?,
        None => BoardConfig::default(),
    };
    if let Some(host) = arg_value(&args, "--host") {
        config.source = SourceConfig::Service {
            host:     host.to_string(),
            api_base: arg_value(&args, "--api-base")
                .unwrap_or(statusboard_core::source::SERVICE_API_BASE)
                .to_string(),
        };
    } else if let Some(slug) = arg_value(&args, "--repo") {
        config.source = SourceConfig::Repository {
            slug:     slug.to_string(),
            api_base: arg_value(&args, "--api-base")
                .unwrap_or(statusboard_core::source::REPOSITORY_API_BASE)
                .to_string(),
        };
    }
    config.seed = parse_arg(&args, "--seed", config.seed);

    let credential = env::var("BOARD_TOKEN").ok().or(config.credential.clone());

    println!("Community Status Board — board-runner");
    println!("  started:  {}", chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC"));
    println!("  seed:     {}", config.seed);
    println!("  source:   {}", source_summary(&config.source));
    println!("  mode:     {}", if once { "once" } else { "periodic" });
    println!();

    print_features();

    let source = config.build_source();
    let mut simulator = Simulator::new(config.seed);
    let mut refresher = Refresher::new(source, credential);
    let mut panel = TerminalPanel::new();

    if once {
        let outcome = refresher.refresh_once(&mut panel).await;
        for _ in 0..ticks {
            simulator.tick(&mut panel);
        }
        print_summary(&simulator, &outcome);
        return Ok(());
    }

    let (control_tx, control_rx) = mpsc::channel(8);
    spawn_control_reader(control_tx);
    run_board(
        &mut simulator,
        &mut refresher,
        &mut panel,
        &config,
        control_rx,
    )
    .await;
    Ok(())
}

/// Read stdin lines as JSON control commands and forward them to the
/// board loop. Runs on its own thread — stdin has no async story
/// worth the dependency.
fn spawn_control_reader(tx: mpsc::Sender<ControlCommand>) {
    std::thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(_) => break,
            };
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<ControlCommand>(&line) {
                Ok(cmd) => {
                    if tx.blocking_send(cmd).is_err() {
                        break;
                    }
                }
                Err(e) => log::warn!("Unknown control command: {e}"),
            }
        }
    });
}

fn print_features() {
    println!("=== COMMUNITY FEATURES ===");
    for (title, description) in FEATURES {
        println!("  {title}");
        println!("    {description}");
    }
    println!();
}

fn print_summary(simulator: &Simulator, outcome: &RefreshOutcome) {
    let s = &simulator.state;
    println!();
    println!("=== BOARD SUMMARY ===");
    println!("  ticks run:      {}", simulator.current_tick());
    println!("  players online: {}", s.players_online);
    println!("  peak today:     {}", s.peak_today);
    println!("  total members:  {}", s.total_members);
    println!("  messages today: {}", s.messages_daily);
    println!("  ping:           {}ms", s.ping_ms);
    match outcome {
        RefreshOutcome::Success(_) => println!("  status fetch:   ok"),
        RefreshOutcome::Failure(reason) => println!("  status fetch:   failed ({reason})"),
    }
}

fn source_summary(source: &SourceConfig) -> String {
    match source {
        SourceConfig::Service { host, .. } => format!("service {host}"),
        SourceConfig::Repository { slug, .. } => format!("repository {slug}"),
    }
}

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
