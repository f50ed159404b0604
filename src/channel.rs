//! The request/response boundary to the native geofencing engine.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::ChannelError;
use crate::event::Envelope;
use crate::profile::FencingAgentProfile;

/// Async channel to the native geofencing engine.
///
/// The engine's internals (location sensing, boundary computation) live on
/// the far side of this trait; the session layer depends only on the five
/// request kinds below and can therefore run against a test double that
/// replays canned envelopes.
#[async_trait]
pub trait NativeGeofenceChannel: Send + Sync {
    /// Create the native agent for the profile's geodomain. Called once per
    /// session; failure is fatal to the session and is never retried.
    async fn create_agent(&self, profile: &FencingAgentProfile) -> Result<(), ChannelError>;

    /// Ask the native agent to begin fence surveillance.
    async fn start(&self, geodomain: &str) -> Result<(), ChannelError>;

    /// Ask the native agent to shut down.
    async fn quit(&self, geodomain: &str) -> Result<(), ChannelError>;

    /// Ask the native engine to drop cached fence data for the domain.
    async fn purge_cache(&self, geodomain: &str) -> Result<(), ChannelError>;

    /// Deliver the next event envelope for the domain, or `None` once the
    /// native side has stopped emitting events.
    ///
    /// One-shot: the call must be reissued after every delivered envelope to
    /// keep receiving events. Errors the native agent hits while watching
    /// arrive as `onException` envelopes through this same path, not as a
    /// separate failure channel.
    async fn watch_for_next_event(&self, geodomain: &str) -> Option<Envelope>;
}

// ============================================================================
// Replay channel
// ============================================================================

/// In-memory channel that replays a canned envelope feed, for tests and the
/// demo driver.
///
/// Every native call is recorded in arrival order so call sequencing (create
/// before watch, one watch per delivered envelope) can be asserted.
pub struct ReplayChannel {
    envelopes: Mutex<VecDeque<Envelope>>,
    calls: Mutex<Vec<String>>,
    fail_create: bool,
}

impl ReplayChannel {
    /// A channel that will deliver `envelopes` in order, then report the
    /// native side as closed.
    pub fn new(envelopes: Vec<Envelope>) -> Self {
        Self {
            envelopes: Mutex::new(envelopes.into()),
            calls: Mutex::new(Vec::new()),
            fail_create: false,
        }
    }

    /// A channel whose `createAgent` call fails, for exercising fatal
    /// session startup.
    pub fn failing() -> Self {
        Self {
            envelopes: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            fail_create: true,
        }
    }

    /// The native calls recorded so far, in arrival order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("replay call log poisoned").clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("replay call log poisoned").push(call);
    }
}

#[async_trait]
impl NativeGeofenceChannel for ReplayChannel {
    async fn create_agent(&self, profile: &FencingAgentProfile) -> Result<(), ChannelError> {
        self.record(format!("createAgent:{}", profile.geodomain));
        if self.fail_create {
            Err(ChannelError::CreateAgent(
                "replay channel configured to fail".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    async fn start(&self, geodomain: &str) -> Result<(), ChannelError> {
        self.record(format!("start:{geodomain}"));
        Ok(())
    }

    async fn quit(&self, geodomain: &str) -> Result<(), ChannelError> {
        self.record(format!("quit:{geodomain}"));
        Ok(())
    }

    async fn purge_cache(&self, geodomain: &str) -> Result<(), ChannelError> {
        self.record(format!("purgeCache:{geodomain}"));
        Ok(())
    }

    async fn watch_for_next_event(&self, geodomain: &str) -> Option<Envelope> {
        self.record(format!("watchForNextEvent:{geodomain}"));
        self.envelopes
            .lock()
            .expect("replay envelope queue poisoned")
            .pop_front()
    }
}
