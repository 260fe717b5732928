//! The cooperative event loop driving both subsystems.
//!
//! One current-thread runtime, two periodic timers, one control
//! channel. The refresher's network await is the only suspension
//! point; cycles run as futures in a completion set so live ticks
//! keep rendering while a fetch is slow.
//!
//! RULE: A failed cycle never stops the loop. Scheduled refresh ticks
//! that fire while a cycle is pending are dropped, not queued.

use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::{
    config::BoardConfig, refresher::Refresher, render::RenderTarget, simulator::Simulator,
};

/// External control inputs. Each credential change triggers an
/// immediate out-of-schedule refresh cycle with the new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum ControlCommand {
    SetCredential { token: String },
    ClearCredential,
}

/// Run the board until the process is torn down.
///
/// Renders the live block once, starts the immediate startup refresh,
/// then multiplexes: simulator ticks, scheduled refresh ticks (skipped
/// while a cycle is pending), cycle completions (rendered in
/// completion order), and control commands.
pub async fn run_board(
    simulator: &mut Simulator,
    refresher: &mut Refresher,
    target: &mut dyn RenderTarget,
    config: &BoardConfig,
    mut control: mpsc::Receiver<ControlCommand>,
) {
    let sim_period = Duration::from_millis(config.sim_interval_ms);
    let refresh_period = Duration::from_millis(config.refresh_interval_ms);

    // Start both timers one period out — the startup render and the
    // startup cycle below cover time zero.
    let mut sim_tick = interval_at(Instant::now() + sim_period, sim_period);
    let mut refresh_tick = interval_at(Instant::now() + refresh_period, refresh_period);
    sim_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
    refresh_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut cycles = FuturesUnordered::new();
    let mut control_open = true;

    target.replace_live_cards(&simulator.live_cards());
    cycles.push(refresher.begin(target));

    loop {
        tokio::select! {
            _ = sim_tick.tick() => {
                simulator.tick(target);
            }
            _ = refresh_tick.tick() => {
                if let Some(cycle) = refresher.begin_scheduled(target) {
                    cycles.push(cycle);
                }
            }
            Some(outcome) = cycles.next(), if !cycles.is_empty() => {
                refresher.finish(outcome, target);
            }
            cmd = control.recv(), if control_open => {
                match cmd {
                    Some(ControlCommand::SetCredential { token }) => {
                        refresher.set_credential(Some(token));
                        cycles.push(refresher.begin(target));
                    }
                    Some(ControlCommand::ClearCredential) => {
                        refresher.set_credential(None);
                        cycles.push(refresher.begin(target));
                    }
                    // Control side hung up; the board keeps running.
                    None => control_open = false,
                }
            }
        }
    }
}
