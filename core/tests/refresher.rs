//! Refresh-cycle behavior: graceful degradation, backpressure, and
//! credential handling, exercised against a scripted source and a
//! probe render target — no network, no real UI.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use statusboard_core::error::{BoardError, BoardResult};
use statusboard_core::refresher::{snapshot_cards, RefreshOutcome, Refresher};
use statusboard_core::render::{Card, RenderTarget, StatusLine};
use statusboard_core::snapshot::{ServiceStatus, StatusSnapshot};
use statusboard_core::source::{SourceVariant, StatusSource};

// ── Test doubles ─────────────────────────────────────────────────────────────

/// Pops one canned response per fetch and records the credential each
/// call carried.
struct ScriptedSource {
    variant:   SourceVariant,
    responses: Mutex<VecDeque<BoardResult<Value>>>,
    calls:     Mutex<Vec<Option<String>>>,
}

impl ScriptedSource {
    fn new(variant: SourceVariant, responses: Vec<BoardResult<Value>>) -> Arc<Self> {
        Arc::new(Self {
            variant,
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<Option<String>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl StatusSource for ScriptedSource {
    fn variant(&self) -> SourceVariant {
        self.variant
    }

    fn label(&self) -> String {
        "(test.example.org)".to_string()
    }

    fn display_url(&self) -> String {
        "https://status.example.org/test".to_string()
    }

    async fn fetch(&self, credential: Option<&str>) -> BoardResult<Value> {
        self.calls
            .lock()
            .unwrap()
            .push(credential.map(str::to_string));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(BoardError::Transport("script exhausted".to_string())))
    }
}

/// Records everything the refresher pushes at the surface.
#[derive(Default)]
struct ProbePanel {
    status_cards: Vec<Card>,
    live_cards:   Vec<Card>,
    status_lines: Vec<StatusLine>,
    last_updated: Option<String>,
    source_label: Option<String>,
}

impl RenderTarget for ProbePanel {
    fn replace_status_cards(&mut self, cards: &[Card]) {
        self.status_cards = cards.to_vec();
    }

    fn replace_live_cards(&mut self, cards: &[Card]) {
        self.live_cards = cards.to_vec();
    }

    fn set_status_line(&mut self, line: StatusLine) {
        self.status_lines.push(line);
    }

    fn set_source_label(&mut self, label: &str) {
        self.source_label = Some(label.to_string());
    }

    fn set_last_updated(&mut self, text: &str) {
        self.last_updated = Some(text.to_string());
    }
}

fn online_body() -> Value {
    json!({
        "online": true,
        "players": { "online": 5, "max": 20 },
        "motd": { "clean": ["Hi"] },
        "version": "1.20",
        "ip": "1.2.3.4",
        "port": 25565,
        "debug": { "ping": 23.6 }
    })
}

fn http_503() -> BoardError {
    BoardError::Http {
        status:      503,
        status_text: "Service Unavailable".to_string(),
        body:        "upstream exploded".to_string(),
    }
}

// ── Failure path ─────────────────────────────────────────────────────────────

/// HTTP 503 yields a Failure outcome; all four card slots render the
/// labeled unavailable state and the status line embeds the reason.
#[tokio::test]
async fn http_error_renders_unavailable() {
    let source = ScriptedSource::new(SourceVariant::Service, vec![Err(http_503())]);
    let mut refresher = Refresher::new(source.clone(), None);
    let mut panel = ProbePanel::default();

    let outcome = refresher.refresh_once(&mut panel).await;

    let reason = match outcome {
        RefreshOutcome::Failure(reason) => reason,
        RefreshOutcome::Success(_) => panic!("503 must not succeed"),
    };
    assert!(
        reason.contains("503 Service Unavailable"),
        "reason lost the status: {reason}"
    );

    assert_eq!(panel.status_cards.len(), 4);
    for card in &panel.status_cards {
        assert_eq!(card.value, "—", "card '{}' not blanked", card.label);
        assert_eq!(card.subtext, "Unavailable");
    }

    match panel.status_lines.last() {
        Some(StatusLine::Text(text)) => {
            assert!(text.contains(&reason), "status line lost the reason")
        }
        other => panic!("expected a failure text line, got {other:?}"),
    }
}

#[tokio::test]
async fn transport_error_is_contained() {
    let source = ScriptedSource::new(
        SourceVariant::Service,
        vec![Err(BoardError::Transport("no response from server".to_string()))],
    );
    let mut refresher = Refresher::new(source, None);
    let mut panel = ProbePanel::default();

    // Must come back as an outcome, not a panic or propagated error.
    let outcome = refresher.refresh_once(&mut panel).await;
    assert!(matches!(outcome, RefreshOutcome::Failure(_)));
    assert!(refresher.latest().is_none());
}

/// Repository boards degrade with their own four labels.
#[tokio::test]
async fn repository_failure_uses_repository_slots() {
    let source = ScriptedSource::new(SourceVariant::Repository, vec![Err(http_503())]);
    let mut refresher = Refresher::new(source, None);
    let mut panel = ProbePanel::default();

    refresher.refresh_once(&mut panel).await;

    let labels: Vec<&str> = panel
        .status_cards
        .iter()
        .map(|c| c.label.as_str())
        .collect();
    assert_eq!(labels, ["Stars", "Forks", "Watchers", "Language"]);
}

// ── Success path ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn success_renders_cards_link_and_timestamp() {
    let source = ScriptedSource::new(SourceVariant::Service, vec![Ok(online_body())]);
    let mut refresher = Refresher::new(source, None);
    let mut panel = ProbePanel::default();

    let outcome = refresher.refresh_once(&mut panel).await;

    assert!(matches!(outcome, RefreshOutcome::Success(_)));
    assert!(refresher.latest().is_some());

    assert_eq!(panel.status_cards.len(), 4);
    assert_eq!(panel.status_cards[0].label, "Server Status");
    assert_eq!(panel.status_cards[0].value, "Online");
    assert_eq!(panel.status_cards[1].value, "5 / 20");
    assert_eq!(panel.status_cards[2].value, "Hi");

    assert!(matches!(
        panel.status_lines.last(),
        Some(StatusLine::Link { .. })
    ));
    let updated = panel.last_updated.expect("last-updated line");
    assert!(updated.starts_with("Last checked:"), "got: {updated}");
    assert_eq!(panel.source_label.as_deref(), Some("(test.example.org)"));
}

/// A failed cycle after a success still renders unavailable — the
/// surface never shows the stale snapshot as if current.
#[tokio::test]
async fn failure_after_success_does_not_leave_stale_cards() {
    let source = ScriptedSource::new(
        SourceVariant::Service,
        vec![Ok(online_body()), Err(http_503())],
    );
    let mut refresher = Refresher::new(source, None);
    let mut panel = ProbePanel::default();

    refresher.refresh_once(&mut panel).await;
    assert_eq!(panel.status_cards[0].value, "Online");

    refresher.refresh_once(&mut panel).await;
    assert_eq!(panel.status_cards[0].value, "—");
    // The held snapshot is still the last successful fetch.
    assert!(refresher.latest().is_some());
}

/// Rendering one snapshot twice produces identical card sets — no
/// hidden counters.
#[tokio::test]
async fn rendering_a_snapshot_is_idempotent() {
    let snapshot = StatusSnapshot::Service(
        ServiceStatus::from_json(&online_body(), "2026-08-04T12:00:00Z".parse().unwrap())
            .unwrap(),
    );
    assert_eq!(snapshot_cards(&snapshot), snapshot_cards(&snapshot));

    let source = ScriptedSource::new(SourceVariant::Service, vec![]);
    let mut refresher = Refresher::new(source, None);
    let mut panel = ProbePanel::default();

    refresher.finish(RefreshOutcome::Success(snapshot.clone()), &mut panel);
    let first = panel.status_cards.clone();
    refresher.finish(RefreshOutcome::Success(snapshot), &mut panel);

    assert_eq!(first, panel.status_cards);
}

// ── Backpressure and credentials ─────────────────────────────────────────────

/// A scheduled tick that fires while a cycle is pending is dropped and
/// starts no second fetch.
#[tokio::test]
async fn scheduled_tick_skipped_while_in_flight() {
    let source = ScriptedSource::new(
        SourceVariant::Service,
        vec![Ok(online_body()), Ok(online_body())],
    );
    let mut refresher = Refresher::new(source.clone(), None);
    let mut panel = ProbePanel::default();

    let cycle = refresher.begin(&mut panel);
    assert!(refresher.in_flight());
    assert!(
        refresher.begin_scheduled(&mut panel).is_none(),
        "tick must be dropped while a cycle is pending"
    );

    let outcome = cycle.await;
    refresher.finish(outcome, &mut panel);
    assert!(!refresher.in_flight());
    assert_eq!(source.calls().len(), 1, "the skipped tick fetched anyway");

    // With the cycle settled, the next scheduled tick runs.
    let cycle = refresher
        .begin_scheduled(&mut panel)
        .expect("idle refresher must accept a tick");
    let outcome = cycle.await;
    refresher.finish(outcome, &mut panel);
    assert_eq!(source.calls().len(), 2);
}

/// A credential swap triggers exactly one immediate cycle carrying the
/// new value.
#[tokio::test]
async fn credential_swap_fetches_with_new_value() {
    let source = ScriptedSource::new(SourceVariant::Repository, vec![Ok(json!({}))]);
    let mut refresher = Refresher::new(source.clone(), Some("stale-token".to_string()));
    let mut panel = ProbePanel::default();

    refresher.set_credential(Some("fresh-token".to_string()));
    let outcome = refresher.begin(&mut panel).await;
    refresher.finish(outcome, &mut panel);

    assert_eq!(source.calls(), vec![Some("fresh-token".to_string())]);
}

#[tokio::test]
async fn cleared_credential_fetches_anonymously() {
    let source = ScriptedSource::new(SourceVariant::Repository, vec![Ok(json!({}))]);
    let mut refresher = Refresher::new(source.clone(), Some("old".to_string()));
    let mut panel = ProbePanel::default();

    refresher.set_credential(None);
    let outcome = refresher.begin(&mut panel).await;
    refresher.finish(outcome, &mut panel);

    assert_eq!(source.calls(), vec![None]);
    assert_eq!(refresher.credential(), None);
}

/// Every cycle starts by signaling the loading transient.
#[tokio::test]
async fn cycle_signals_loading_before_fetching() {
    let source = ScriptedSource::new(SourceVariant::Service, vec![Ok(online_body())]);
    let mut refresher = Refresher::new(source, None);
    let mut panel = ProbePanel::default();

    refresher.refresh_once(&mut panel).await;

    match panel.status_lines.first() {
        Some(StatusLine::Text(text)) => assert!(text.starts_with("Checking")),
        other => panic!("expected the loading transient first, got {other:?}"),
    }
}
