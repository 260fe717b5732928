//! The refresh pipeline — periodic external status with graceful
//! degradation.
//!
//! RULE: Nothing escapes a cycle. Transport, HTTP, and parse failures
//! all fold into RefreshOutcome::Failure; the scheduler must never
//! die because one cycle went wrong. On failure the surface shows a
//! labeled unavailable state, never silently-stale data.

use std::sync::Arc;

use chrono::Utc;
use futures::future::BoxFuture;

use crate::{
    render::{fmt_count, fmt_date, Card, IconToken, RenderTarget, StatusLine, PLACEHOLDER},
    snapshot::{RepositoryStatus, ServiceStatus, StatusSnapshot},
    source::{SourceVariant, StatusSource},
};

/// Reference refresh period for the status block.
pub const REFRESH_INTERVAL_MS: u64 = 60_000;

/// The result of one refresh cycle. Exactly one render path runs per
/// outcome; there is no merged or partial state.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    Success(StatusSnapshot),
    Failure(String),
}

/// A refresh cycle in flight, owned by the scheduler's completion set.
pub type CycleFuture = BoxFuture<'static, RefreshOutcome>;

/// One full cycle: fetch, then normalize. Every error is folded into
/// Failure here — the underlying error is logged, only the
/// human-readable message travels to the surface.
pub async fn run_cycle(
    source: Arc<dyn StatusSource>,
    credential: Option<String>,
) -> RefreshOutcome {
    let fetched_at = Utc::now();
    let body = match source.fetch(credential.as_deref()).await {
        Ok(body) => body,
        Err(err) => {
            log::warn!("status fetch failed: {err}");
            return RefreshOutcome::Failure(err.to_string());
        }
    };
    let normalized = match source.variant() {
        SourceVariant::Service => {
            ServiceStatus::from_json(&body, fetched_at).map(StatusSnapshot::Service)
        }
        SourceVariant::Repository => {
            RepositoryStatus::from_json(&body).map(StatusSnapshot::Repository)
        }
    };
    match normalized {
        Ok(snapshot) => RefreshOutcome::Success(snapshot),
        Err(err) => {
            log::warn!("status body did not normalize: {err}");
            RefreshOutcome::Failure(err.to_string())
        }
    }
}

pub struct Refresher {
    source:     Arc<dyn StatusSource>,
    credential: Option<String>,
    in_flight:  bool,
    latest:     Option<StatusSnapshot>,
}

impl Refresher {
    pub fn new(source: Arc<dyn StatusSource>, credential: Option<String>) -> Self {
        Self {
            source,
            credential,
            in_flight: false,
            latest: None,
        }
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// The most recent successful snapshot, if any cycle has succeeded.
    pub fn latest(&self) -> Option<&StatusSnapshot> {
        self.latest.as_ref()
    }

    pub fn credential(&self) -> Option<&str> {
        self.credential.as_deref()
    }

    /// Install or clear the bearer credential. The caller follows up
    /// with [`Refresher::begin`] — a credential change always
    /// refetches.
    pub fn set_credential(&mut self, credential: Option<String>) {
        self.credential = credential;
    }

    /// Start a cycle for a scheduled tick. Returns None while another
    /// cycle is pending — the tick is dropped, not queued.
    pub fn begin_scheduled(&mut self, target: &mut dyn RenderTarget) -> Option<CycleFuture> {
        if self.in_flight {
            log::debug!("refresh tick skipped: cycle already in flight");
            return None;
        }
        Some(self.begin(target))
    }

    /// Start a cycle unconditionally (startup, credential change).
    /// May overlap an in-flight cycle; renders land in completion
    /// order, so the last write wins.
    pub fn begin(&mut self, target: &mut dyn RenderTarget) -> CycleFuture {
        self.in_flight = true;
        target.set_status_line(StatusLine::Text(self.checking_text()));
        Box::pin(run_cycle(self.source.clone(), self.credential.clone()))
    }

    /// Apply a completed cycle to held state and the surface.
    pub fn finish(&mut self, outcome: RefreshOutcome, target: &mut dyn RenderTarget) {
        self.in_flight = false;
        match outcome {
            RefreshOutcome::Success(snapshot) => {
                self.render_snapshot(&snapshot, target);
                self.latest = Some(snapshot);
            }
            RefreshOutcome::Failure(reason) => {
                // The held snapshot stays — it is still the most
                // recent successful fetch — but the surface only ever
                // shows the labeled unavailable state.
                self.render_unavailable(&reason, target);
            }
        }
    }

    /// Begin, await, finish. For one-shot runs and tests.
    pub async fn refresh_once(&mut self, target: &mut dyn RenderTarget) -> RefreshOutcome {
        let cycle = self.begin(target);
        let outcome = cycle.await;
        self.finish(outcome.clone(), target);
        outcome
    }

    fn render_snapshot(&self, snapshot: &StatusSnapshot, target: &mut dyn RenderTarget) {
        target.set_source_label(&self.source.label());
        target.replace_status_cards(&snapshot_cards(snapshot));
        let href = match snapshot {
            StatusSnapshot::Repository(repo) if !repo.html_url.is_empty() => {
                repo.html_url.clone()
            }
            _ => self.source.display_url(),
        };
        target.set_status_line(StatusLine::Link {
            href,
            label: self.view_label().to_string(),
        });
        target.set_last_updated(&last_updated_text(snapshot));
    }

    fn render_unavailable(&self, reason: &str, target: &mut dyn RenderTarget) {
        target.set_source_label(&self.source.label());
        target.replace_status_cards(&unavailable_cards(self.source.variant()));
        target.set_status_line(StatusLine::Text(self.failure_text(reason)));
    }

    fn checking_text(&self) -> String {
        match self.source.variant() {
            SourceVariant::Service => "Checking server status…".to_string(),
            SourceVariant::Repository => "Checking repository…".to_string(),
        }
    }

    fn failure_text(&self, reason: &str) -> String {
        match self.source.variant() {
            SourceVariant::Service => format!("Could not check server: {reason}"),
            SourceVariant::Repository => format!("Could not load repository: {reason}"),
        }
    }

    fn view_label(&self) -> &'static str {
        match self.source.variant() {
            SourceVariant::Service => "View server status",
            SourceVariant::Repository => "View repository",
        }
    }
}

/// The four status card slots for a successful snapshot. Pure — the
/// same snapshot always yields the same cards.
pub fn snapshot_cards(snapshot: &StatusSnapshot) -> Vec<Card> {
    match snapshot {
        StatusSnapshot::Service(s) => service_cards(s),
        StatusSnapshot::Repository(r) => repository_cards(r),
    }
}

fn service_cards(s: &ServiceStatus) -> Vec<Card> {
    let status_icon = if s.online {
        IconToken::Server
    } else {
        IconToken::Offline
    };
    let status_value = if s.online { "Online" } else { "Offline" };
    let status_sub = if s.online {
        format!("{} players", fmt_count(s.players_online))
    } else {
        "Server is not reachable".to_string()
    };

    let players_value = if s.online {
        format!(
            "{} / {}",
            fmt_count(s.players_online),
            fmt_count(s.players_max)
        )
    } else {
        PLACEHOLDER.to_string()
    };
    let players_sub = if s.online && !s.sample_names.is_empty() {
        format!("List: {}", s.sample_names.join(", "))
    } else {
        String::new()
    };

    let motd_value = if s.motd.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        s.motd.clone()
    };
    let motd_sub = s
        .address
        .as_ref()
        .map(|a| format!("Address: {a}"))
        .unwrap_or_default();

    let ping = s
        .ping_ms
        .map(|p| format!("{p}ms"))
        .unwrap_or_else(|| PLACEHOLDER.to_string());
    let protocol = s
        .protocol
        .clone()
        .unwrap_or_else(|| PLACEHOLDER.to_string());

    vec![
        Card::new(status_icon, "Server Status", status_value, status_sub),
        Card::new(IconToken::Players, "Players", players_value, players_sub),
        Card::new(IconToken::Motd, "MOTD", motd_value, motd_sub),
        Card::new(
            IconToken::Version,
            "Version",
            s.version.clone(),
            format!("Protocol: {protocol} • Ping: {ping}"),
        ),
    ]
}

fn repository_cards(r: &RepositoryStatus) -> Vec<Card> {
    vec![
        Card::new(IconToken::Star, "Stars", fmt_count(Some(r.stars)), ""),
        Card::new(IconToken::Fork, "Forks", fmt_count(Some(r.forks)), ""),
        Card::new(
            IconToken::Watchers,
            "Watchers",
            fmt_count(Some(r.watchers)),
            "",
        ),
        Card::new(
            IconToken::Language,
            "Language",
            r.language.clone().unwrap_or_else(|| PLACEHOLDER.to_string()),
            "",
        ),
    ]
}

/// The four card slots in their labeled unavailable state.
pub fn unavailable_cards(variant: SourceVariant) -> Vec<Card> {
    let slots: [(&str, IconToken); 4] = match variant {
        SourceVariant::Service => [
            ("Server Status", IconToken::Offline),
            ("Players", IconToken::Players),
            ("MOTD", IconToken::Motd),
            ("Version", IconToken::Version),
        ],
        SourceVariant::Repository => [
            ("Stars", IconToken::Star),
            ("Forks", IconToken::Fork),
            ("Watchers", IconToken::Watchers),
            ("Language", IconToken::Language),
        ],
    };
    slots
        .iter()
        .map(|(label, icon)| Card::new(*icon, label, PLACEHOLDER, "Unavailable"))
        .collect()
}

fn last_updated_text(snapshot: &StatusSnapshot) -> String {
    match snapshot {
        // Poll time — the service API has no server-side timestamp.
        StatusSnapshot::Service(s) => {
            format!("Last checked: {}", fmt_date(Some(s.fetched_at)))
        }
        // The provider's own last-activity time.
        StatusSnapshot::Repository(r) => {
            format!("Last push: {}", fmt_date(r.last_pushed_at))
        }
    }
}
