//! fencing-agent demo driver.
//!
//! Wires a [`FencingAgent`] session to a [`ReplayChannel`] carrying a short
//! canned event feed and logs every delegate callback, so the full decode
//! and fan-out path can be watched without a native engine present.
//!
//! # Environment
//!
//! - `FENCING_GEODOMAIN`: geodomain name to run under (default
//!   `demo.geodomain`)

use std::env;

use serde_json::{Value, json};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use fencing_agent::agent::{FencingAgent, FencingAgentDelegate};
use fencing_agent::channel::ReplayChannel;
use fencing_agent::event::{AgentStatus, Envelope};
use fencing_agent::model::{FencingAgentState, FencingAgentStateUpdate};
use fencing_agent::profile::FencingAgentProfile;

/// Geodomain used when no environment override is present.
const DEFAULT_GEODOMAIN: &str = "demo.geodomain";

/// Delegate that logs every lifecycle event it receives.
struct LoggingDelegate;

impl FencingAgentDelegate for LoggingDelegate {
    fn on_started(&self, state: &FencingAgentState, status: &AgentStatus) {
        info!(
            fences = state.fences.len(),
            domain_status = state.geodomain.status.as_str(),
            running = ?status.is_running,
            "agent started"
        );
    }

    fn fences_refreshed(&self, update: &FencingAgentStateUpdate, _status: &AgentStatus) {
        info!(
            old_fences = update.old_state.fences.len(),
            new_fences = update.new_state.fences.len(),
            new_status = update.new_state.geodomain.status.as_str(),
            "fences refreshed"
        );
    }

    fn on_error(&self, content: &Value, _status: &AgentStatus) {
        warn!(%content, "agent exception");
    }

    fn on_quit(&self, _state: &FencingAgentState, _status: &AgentStatus) {
        info!("agent quit");
    }
}

fn snapshot(geodomain: &str, status: &str, ttl: u64) -> Value {
    json!({
        "fences": [{
            "fence": {
                "anchorpoint": [10.0, 45.0],
                "points": [[10.0, 45.0], [10.1, 45.0], [10.1, 45.1]],
                "ttl": ttl
            },
            "meta": {
                "status": status,
                "retrievalTime": "2026-01-15T10:30:00Z"
            }
        }],
        "geodomain": {
            "geodomain": {
                "requirements": [
                    {"baseType": "PROFILE", "value": "default"},
                    {"baseType": "INTERVAL", "stateChanges": [3.0, 6.0], "initialState": false,
                     "floor": 0.0, "ceiling": 10.0, "unit": "km"}
                ],
                "domainName": geodomain
            },
            "status": {"status": status, "retrievalTime": "2026-01-15T10:30:00Z"}
        }
    })
}

fn demo_feed(geodomain: &str) -> anyhow::Result<Vec<Envelope>> {
    let status = json!({"isRunning": true, "geodomain": geodomain});
    let feed = vec![
        json!({
            "status": status,
            "message": {"type": "onStart", "content": snapshot(geodomain, "AMBIENT", 30)}
        }),
        json!({
            "status": status,
            "message": {"type": "fencesRefreshed", "content": {
                "oldSnapshot": snapshot(geodomain, "AMBIENT", 30),
                "newSnapshot": snapshot(geodomain, "ENTERED", 29)
            }}
        }),
        json!({
            "status": status,
            "message": {"type": "onQuit", "content": snapshot(geodomain, "EXITED", 28)}
        }),
    ];
    let envelopes = feed
        .into_iter()
        .map(Envelope::from_json)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(envelopes)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("fencing_agent=info".parse()?))
        .init();

    let geodomain =
        env::var("FENCING_GEODOMAIN").unwrap_or_else(|_| DEFAULT_GEODOMAIN.to_string());

    info!(%geodomain, "starting demo session");

    let profile = FencingAgentProfile::from_json(&json!({"geodomain": geodomain}), false)?;
    let channel = ReplayChannel::new(demo_feed(&profile.geodomain)?);

    let mut agent = FencingAgent::connect(&profile, channel).await?;
    agent.add_delegate(Box::new(LoggingDelegate));

    agent.start().await?;
    agent.run().await?;
    agent.quit().await?;

    info!(calls = agent.channel().calls().len(), "demo session complete");

    Ok(())
}
