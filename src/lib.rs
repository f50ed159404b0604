//! fencing-agent - a validating data model and event-dispatch layer for a
//! native geofencing engine.
//!
//! # Overview
//!
//! This crate sits between an application and a native geofencing engine. It
//! accepts raw wire-format JSON describing geofence state, requirement
//! predicates, and agent lifecycle events; validates and normalizes that
//! JSON into a typed domain model; and routes the resulting events to zero
//! or more registered delegates.
//!
//! The native engine itself (location sensing, boundary computation) stays
//! behind the [`channel::NativeGeofenceChannel`] trait, so sessions run
//! unchanged against the real engine or against a canned replay feed.
//!
//! # Validation Guarantees
//!
//! Every entity is validated all-or-nothing: a constructor either returns a
//! fully valid, immutable value or fails with a typed error naming the
//! offending field, the expected constraint, and the received value. No
//! partially constructed model object ever escapes, and nothing is cached
//! between snapshots beyond the old/new pair carried inside a refresh event.
//!
//! # Modules
//!
//! - [`requirement`]: Typed predicates attached to a geodomain
//! - [`model`]: Geodomain, fence, and agent-state entities
//! - [`profile`]: Validated session configuration
//! - [`event`]: Wire envelopes and decoded lifecycle events
//! - [`channel`]: The async boundary to the native engine
//! - [`agent`]: The session: lifecycle calls, delegate fan-out, watch loop
//! - [`error`]: Validation, channel, and session error types

pub mod agent;
pub mod channel;
pub mod error;
pub mod event;
pub mod model;
pub mod profile;
pub mod requirement;
mod wire;
