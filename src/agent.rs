//! The fencing agent session: native lifecycle calls, delegate fan-out, and
//! the event watch loop.
//!
//! # Ordering Guarantees
//!
//! The watch loop is strictly sequential. At most one "next event" request
//! is outstanding at any time, and it is reissued only after the current
//! envelope has been decoded and fanned out to every registered delegate.
//! No event is dropped and no two events are processed out of order, at the
//! cost of serializing all delegate work against the arrival of the next
//! native event.

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::channel::NativeGeofenceChannel;
use crate::error::AgentError;
use crate::event::{AgentEvent, AgentStatus, Envelope};
use crate::model::{FencingAgentState, FencingAgentStateUpdate};
use crate::profile::FencingAgentProfile;

/// Listener for decoded agent lifecycle events.
///
/// Implement only the callbacks you care about; the default bodies ignore
/// the event, which is the same as leaving that delegate slot empty.
pub trait FencingAgentDelegate: Send + Sync {
    /// The native agent finished starting.
    fn on_started(&self, _state: &FencingAgentState, _status: &AgentStatus) {}

    /// A refresh produced a before/after state pair.
    fn fences_refreshed(&self, _update: &FencingAgentStateUpdate, _status: &AgentStatus) {}

    /// The native side reported an exception. The content passes through
    /// undecoded.
    fn on_error(&self, _content: &Value, _status: &AgentStatus) {}

    /// The native agent shut down.
    fn on_quit(&self, _state: &FencingAgentState, _status: &AgentStatus) {}
}

/// A geofencing session: one profile, one native channel, and an ordered
/// list of delegates.
pub struct FencingAgent<C: NativeGeofenceChannel> {
    profile: FencingAgentProfile,
    channel: C,
    delegates: Vec<Box<dyn FencingAgentDelegate>>,
}

impl<C: NativeGeofenceChannel> FencingAgent<C> {
    /// Create the native agent and return the session.
    ///
    /// The profile is copied in, so later changes to the caller's value do
    /// not reach the running session. A failed `createAgent` call is fatal
    /// and propagates unretried.
    pub async fn connect(profile: &FencingAgentProfile, channel: C) -> Result<Self, AgentError> {
        let profile = profile.copy();
        channel.create_agent(&profile).await?;
        info!(geodomain = %profile.geodomain, "native agent created");
        Ok(Self {
            profile,
            channel,
            delegates: Vec::new(),
        })
    }

    /// Register a delegate. Delegates are notified in registration order;
    /// there is no removal.
    pub fn add_delegate(&mut self, delegate: Box<dyn FencingAgentDelegate>) {
        debug!(delegates = self.delegates.len() + 1, "delegate registered");
        self.delegates.push(delegate);
    }

    /// The profile this session runs under.
    pub fn profile(&self) -> &FencingAgentProfile {
        &self.profile
    }

    /// The channel this session talks through.
    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Ask the native agent to begin surveillance. The acknowledgement is
    /// discarded; a transport failure propagates once.
    pub async fn start(&self) -> Result<(), AgentError> {
        self.channel.start(&self.profile.geodomain).await?;
        Ok(())
    }

    /// Ask the native agent to shut down. The watch loop is not torn down by
    /// this call; it ends when the native side stops emitting events.
    pub async fn quit(&self) -> Result<(), AgentError> {
        self.channel.quit(&self.profile.geodomain).await?;
        Ok(())
    }

    /// Ask the native engine to drop cached fence data for the domain.
    pub async fn purge_cache(&self) -> Result<(), AgentError> {
        self.channel.purge_cache(&self.profile.geodomain).await?;
        Ok(())
    }

    /// Watch for native events until the channel closes.
    ///
    /// Awaits one envelope, dispatches it to every delegate, and only then
    /// requests the next one. Returns `Ok` when the native side stops
    /// emitting events; a decode or dispatch failure ends the loop and is
    /// surfaced exactly once.
    pub async fn run(&self) -> Result<(), AgentError> {
        loop {
            debug!(geodomain = %self.profile.geodomain, "watching for next event");
            let Some(envelope) = self
                .channel
                .watch_for_next_event(&self.profile.geodomain)
                .await
            else {
                info!(geodomain = %self.profile.geodomain, "native channel closed");
                return Ok(());
            };
            self.dispatch(&envelope)?;
        }
    }

    /// Decode one envelope and notify every delegate in registration order.
    ///
    /// The envelope content is validated once, before any delegate runs; an
    /// unrecognized tag or invalid content therefore fails dispatch for all
    /// delegates alike.
    pub fn dispatch(&self, envelope: &Envelope) -> Result<(), AgentError> {
        let event = match AgentEvent::from_envelope(envelope) {
            Ok(event) => event,
            Err(error) => {
                warn!(kind = %envelope.message.kind, %error, "failed to decode event envelope");
                return Err(error.into());
            }
        };

        debug!(
            kind = %envelope.message.kind,
            delegates = self.delegates.len(),
            "dispatching event"
        );
        for delegate in &self.delegates {
            match &event {
                AgentEvent::Started(state) => delegate.on_started(state, &envelope.status),
                AgentEvent::Quit(state) => delegate.on_quit(state, &envelope.status),
                AgentEvent::FencesRefreshed(update) => {
                    delegate.fences_refreshed(update, &envelope.status)
                }
                AgentEvent::Exception(content) => delegate.on_error(content, &envelope.status),
            }
        }
        Ok(())
    }
}
