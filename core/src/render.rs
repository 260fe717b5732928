//! Render-target capability — the seam between board logic and any UI.
//!
//! RULE: Core logic never touches markup. It hands fully-formed cards
//! and status lines to a RenderTarget and does not know whether the
//! other side is a retained-mode DOM, a terminal, or a test probe.
//! A render pass always overwrites whole card slots; there is no
//! partial update.

use chrono::{DateTime, Utc};

/// Value shown wherever a field is absent.
pub const PLACEHOLDER: &str = "—";

/// Icon slot identifiers understood by the display layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconToken {
    Server,
    Offline,
    Players,
    Motd,
    Version,
    Ping,
    Members,
    Uptime,
    Messages,
    Pulse,
    Star,
    Fork,
    Watchers,
    Language,
}

/// One labeled display card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub icon:    IconToken,
    pub label:   String,
    pub value:   String,
    pub subtext: String,
}

impl Card {
    pub fn new(
        icon: IconToken,
        label: &str,
        value: impl Into<String>,
        subtext: impl Into<String>,
    ) -> Self {
        Self {
            icon,
            label: label.to_string(),
            value: value.into(),
            subtext: subtext.into(),
        }
    }
}

/// The link/status text slot under the source heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusLine {
    Text(String),
    Link { href: String, label: String },
}

/// The contract every display surface must fulfill.
pub trait RenderTarget {
    /// Replace all status-block card slots (4 slots).
    fn replace_status_cards(&mut self, cards: &[Card]);

    /// Replace all live-block card slots (6 slots).
    fn replace_live_cards(&mut self, cards: &[Card]);

    fn set_status_line(&mut self, line: StatusLine);

    /// Identifier shown next to the status-block heading.
    fn set_source_label(&mut self, label: &str);

    fn set_last_updated(&mut self, text: &str);
}

/// 12345 -> "12,345". `None` renders as the placeholder.
pub fn fmt_count(n: Option<i64>) -> String {
    let n = match n {
        Some(n) => n,
        None => return PLACEHOLDER.to_string(),
    };
    let digits = n.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if n < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

pub fn fmt_date(ts: Option<DateTime<Utc>>) -> String {
    match ts {
        Some(t) => t.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => PLACEHOLDER.to_string(),
    }
}
