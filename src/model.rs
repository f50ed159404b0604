//! Domain model for geofence state.
//!
//! Every type here is built fresh from each wire-format JSON payload and is
//! immutable after construction. Validation is all-or-nothing: a constructor
//! either returns a fully valid entity or fails with the first violation it
//! encounters, in a fixed field order (required collection → collection
//! elements → scalar fields → enum fields → timestamp fields). No partial
//! objects ever escape.
//!
//! Wire shapes follow the native serializer:
//!
//! ```json
//! {
//!     "fence": { "anchorpoint": [lon, lat], "points": [[lon, lat], ...], "ttl": 30 },
//!     "meta":  { "status": "DWELLING", "retrievalTime": "2026-01-15T10:30:00Z" }
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::error::ValidationError;
use crate::requirement::Requirement;
use crate::wire;

/// Presence status reported for a geodomain or an individual fence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DomainStatus {
    /// The tracked subject is in the domain's ambient area, near no fence.
    Ambient,
    /// The tracked subject is inside a fence and staying there.
    Dwelling,
    /// The tracked subject left a fence since the previous snapshot.
    Exited,
    /// The tracked subject entered a fence since the previous snapshot.
    Entered,
}

impl DomainStatus {
    fn parse(raw: &str, field: &str) -> Result<Self, ValidationError> {
        match raw {
            "AMBIENT" => Ok(DomainStatus::Ambient),
            "DWELLING" => Ok(DomainStatus::Dwelling),
            "EXITED" => Ok(DomainStatus::Exited),
            "ENTERED" => Ok(DomainStatus::Entered),
            other => Err(ValidationError::UnknownStatus {
                field: field.to_string(),
                received: other.to_string(),
            }),
        }
    }

    /// The wire spelling of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            DomainStatus::Ambient => "AMBIENT",
            DomainStatus::Dwelling => "DWELLING",
            DomainStatus::Exited => "EXITED",
            DomainStatus::Entered => "ENTERED",
        }
    }
}

/// A longitude/latitude pair, carried on the wire as a 2-element array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    /// Validate a `[longitude, latitude]` array.
    ///
    /// Longitude must lie in [-180,180] and latitude in [-90,90]; any arity
    /// other than 2 is rejected.
    pub fn from_json(json: &Value, field: &str) -> Result<Self, ValidationError> {
        let pair = wire::require_array(json, field)?;
        if pair.len() != 2 {
            return Err(ValidationError::TypeMismatch {
                field: field.to_string(),
                expected: "a 2-element [longitude, latitude] array",
                received: json.to_string(),
            });
        }
        let longitude = wire::number(&pair[0], &format!("{field}[0]"))?;
        let latitude = wire::number(&pair[1], &format!("{field}[1]"))?;
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(ValidationError::OutOfRange {
                field: format!("{field}[0]"),
                expected: "a longitude in [-180,180]",
                received: longitude.to_string(),
            });
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(ValidationError::OutOfRange {
                field: format!("{field}[1]"),
                expected: "a latitude in [-90,90]",
                received: latitude.to_string(),
            });
        }
        Ok(Self {
            longitude,
            latitude,
        })
    }
}

/// Bearing hints the native engine attaches to a fence when the session
/// profile asked for approach detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproachDetails {
    pub is_approaching: bool,
    /// Bearing back toward the fence, in degrees.
    pub reciprocal_bearing: f64,
    /// Bearing that moves away from the fence fastest, in degrees.
    pub evasive_bearing: f64,
}

impl ApproachDetails {
    fn from_json(json: &Value, field: &str) -> Result<Self, ValidationError> {
        let obj = wire::require_object(json, field)?;
        Ok(Self {
            is_approaching: wire::get_bool(obj, &format!("{field}.isApproaching"))?,
            reciprocal_bearing: wire::get_number(obj, &format!("{field}.reciprocalBearing"))?,
            evasive_bearing: wire::get_number(obj, &format!("{field}.evasiveBearing"))?,
        })
    }
}

/// A named geographic region under surveillance, with aggregate status and
/// the requirements attached to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Geodomain {
    pub status: DomainStatus,
    pub retrieval_time: DateTime<Utc>,
    pub requirements: Vec<Requirement>,
    /// Human-readable domain name, when the native side includes one.
    pub domain_name: Option<String>,
    /// Engine-internal domain identifier, when the native side includes one.
    pub identifier: Option<String>,
}

impl Geodomain {
    /// Validate the nested geodomain wire object:
    /// `{geodomain: {requirements, domainName?, identifier?}, status: {status, retrievalTime}}`.
    pub fn from_json(json: &Value) -> Result<Self, ValidationError> {
        let obj = wire::require_object(json, "geodomain")?;
        let inner = wire::require_object(
            wire::require(obj, "geodomain.geodomain")?,
            "geodomain.geodomain",
        )?;

        let raw_requirements = wire::require_array(
            wire::require(inner, "geodomain.geodomain.requirements")?,
            "geodomain.geodomain.requirements",
        )?;
        let mut requirements = Vec::with_capacity(raw_requirements.len());
        for requirement in raw_requirements {
            requirements.push(Requirement::from_json(requirement)?);
        }

        let domain_name = wire::opt_string(inner, "geodomain.geodomain.domainName")?;
        let identifier = wire::opt_string(inner, "geodomain.geodomain.identifier")?;

        let status_obj =
            wire::require_object(wire::require(obj, "geodomain.status")?, "geodomain.status")?;
        let status = DomainStatus::parse(
            wire::get_string(status_obj, "geodomain.status.status")?.as_str(),
            "geodomain.status.status",
        )?;
        let retrieval_time = wire::get_timestamp(status_obj, "geodomain.status.retrievalTime")?;

        Ok(Self {
            status,
            retrieval_time,
            requirements,
            domain_name,
            identifier,
        })
    }
}

/// A single polygon boundary nested within a geodomain's tracked area.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartFence {
    pub anchor_point: GeoPoint,
    pub points: Vec<GeoPoint>,
    /// Time-to-live count; its unit and meaning belong to the native engine.
    pub ttl: u64,
    pub status: DomainStatus,
    pub retrieval_time: DateTime<Utc>,
    /// Present when the session profile asked for approach detection.
    pub approach_details: Option<ApproachDetails>,
}

impl SmartFence {
    /// Validate the fence wire object:
    /// `{fence: {anchorpoint, points, ttl}, meta: {status, retrievalTime, approachDetails?}}`.
    pub fn from_json(json: &Value) -> Result<Self, ValidationError> {
        let obj = wire::require_object(json, "fence")?;
        let fence = wire::require_object(wire::require(obj, "fence.fence")?, "fence.fence")?;
        let meta = wire::require_object(wire::require(obj, "fence.meta")?, "fence.meta")?;

        let raw_points = wire::require_array(
            wire::require(fence, "fence.fence.points")?,
            "fence.fence.points",
        )?;
        let mut points = Vec::with_capacity(raw_points.len());
        for (i, point) in raw_points.iter().enumerate() {
            points.push(GeoPoint::from_json(point, &format!("fence.fence.points[{i}]"))?);
        }

        let anchor_point = GeoPoint::from_json(
            wire::require(fence, "fence.fence.anchorpoint")?,
            "fence.fence.anchorpoint",
        )?;

        let raw_ttl = wire::get_whole(fence, "fence.fence.ttl")?;
        if raw_ttl < 0 {
            return Err(ValidationError::OutOfRange {
                field: "fence.fence.ttl".to_string(),
                expected: "a non-negative whole number",
                received: raw_ttl.to_string(),
            });
        }

        let status = DomainStatus::parse(
            wire::get_string(meta, "fence.meta.status")?.as_str(),
            "fence.meta.status",
        )?;
        let retrieval_time = wire::get_timestamp(meta, "fence.meta.retrievalTime")?;

        let approach_details = match wire::optional(meta, "fence.meta.approachDetails") {
            Some(details) => {
                Some(ApproachDetails::from_json(details, "fence.meta.approachDetails")?)
            }
            None => None,
        };

        Ok(Self {
            anchor_point,
            points,
            ttl: raw_ttl as u64,
            status,
            retrieval_time,
            approach_details,
        })
    }
}

/// Snapshot of everything the native engine reports for one geodomain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FencingAgentState {
    pub fences: Vec<SmartFence>,
    pub geodomain: Geodomain,
}

impl FencingAgentState {
    /// Validate a `{fences: [...], geodomain: {...}}` snapshot, propagating
    /// the first failure from either side.
    pub fn from_json(json: &Value) -> Result<Self, ValidationError> {
        let obj = wire::require_object(json, "state")?;

        let raw_fences = wire::require_array(wire::require(obj, "state.fences")?, "state.fences")?;
        let mut fences = Vec::with_capacity(raw_fences.len());
        for fence in raw_fences {
            fences.push(SmartFence::from_json(fence)?);
        }

        let geodomain = Geodomain::from_json(wire::require(obj, "state.geodomain")?)?;

        Ok(Self { fences, geodomain })
    }
}

/// Before/after snapshot pair carried by a refresh event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FencingAgentStateUpdate {
    pub old_state: FencingAgentState,
    pub new_state: FencingAgentState,
}

impl FencingAgentStateUpdate {
    /// Validate an `{oldSnapshot, newSnapshot}` pair; either sub-build
    /// failing fails the whole update.
    pub fn from_json(json: &Value) -> Result<Self, ValidationError> {
        let obj = wire::require_object(json, "update")?;
        let old_state = FencingAgentState::from_json(wire::require(obj, "update.oldSnapshot")?)?;
        let new_state = FencingAgentState::from_json(wire::require(obj, "update.newSnapshot")?)?;
        Ok(Self {
            old_state,
            new_state,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fence_json() -> Value {
        json!({
            "fence": {
                "anchorpoint": [10.0, 45.0],
                "points": [[10.0, 45.0], [10.1, 45.0], [10.1, 45.1]],
                "ttl": 30
            },
            "meta": {
                "status": "DWELLING",
                "retrievalTime": "2026-01-15T10:30:00Z"
            }
        })
    }

    fn geodomain_json() -> Value {
        json!({
            "geodomain": {
                "requirements": [
                    {"baseType": "PROFILE", "value": "default"}
                ],
                "domainName": "harbor",
                "identifier": "geo-7"
            },
            "status": {
                "status": "AMBIENT",
                "retrievalTime": "2026-01-15T10:30:00Z"
            }
        })
    }

    #[test]
    fn test_geo_point_accepts_valid_pair() {
        let point = GeoPoint::from_json(&json!([10, 45]), "p").unwrap();
        assert_eq!(point.longitude, 10.0);
        assert_eq!(point.latitude, 45.0);
    }

    #[test]
    fn test_geo_point_rejects_out_of_range() {
        assert!(GeoPoint::from_json(&json!([181, 0]), "p").is_err());
        assert!(GeoPoint::from_json(&json!([-181, 0]), "p").is_err());
        assert!(GeoPoint::from_json(&json!([0, 91]), "p").is_err());
        assert!(GeoPoint::from_json(&json!([0, -91]), "p").is_err());
    }

    #[test]
    fn test_geo_point_rejects_wrong_arity() {
        assert!(GeoPoint::from_json(&json!([10.0]), "p").is_err());
        assert!(GeoPoint::from_json(&json!([10.0, 45.0, 1.0]), "p").is_err());
        assert!(GeoPoint::from_json(&json!("10,45"), "p").is_err());
    }

    #[test]
    fn test_smart_fence_builds_from_wire_shape() {
        let fence = SmartFence::from_json(&fence_json()).unwrap();
        assert_eq!(fence.points.len(), 3);
        assert_eq!(fence.ttl, 30);
        assert_eq!(fence.status, DomainStatus::Dwelling);
        assert!(fence.approach_details.is_none());
    }

    #[test]
    fn test_smart_fence_parses_approach_details() {
        let mut payload = fence_json();
        payload["meta"]["approachDetails"] = json!({
            "isApproaching": true,
            "reciprocalBearing": 12.5,
            "evasiveBearing": 192.5
        });
        let fence = SmartFence::from_json(&payload).unwrap();
        let details = fence.approach_details.unwrap();
        assert!(details.is_approaching);
        assert_eq!(details.reciprocal_bearing, 12.5);

        payload["meta"]["approachDetails"] = json!({"isApproaching": "yes"});
        assert!(SmartFence::from_json(&payload).is_err());
    }

    #[test]
    fn test_smart_fence_rejects_bad_point() {
        let mut payload = fence_json();
        payload["fence"]["points"][1] = json!([181.0, 0.0]);
        assert!(SmartFence::from_json(&payload).is_err());
    }

    #[test]
    fn test_smart_fence_rejects_bad_ttl() {
        let mut payload = fence_json();
        payload["fence"]["ttl"] = json!(-1);
        assert!(SmartFence::from_json(&payload).is_err());
        payload["fence"]["ttl"] = json!(2.5);
        assert!(SmartFence::from_json(&payload).is_err());
    }

    #[test]
    fn test_smart_fence_rejects_unknown_status_and_bad_time() {
        let mut payload = fence_json();
        payload["meta"]["status"] = json!("LOITERING");
        assert!(matches!(
            SmartFence::from_json(&payload).unwrap_err(),
            ValidationError::UnknownStatus { .. }
        ));

        let mut payload = fence_json();
        payload["meta"]["retrievalTime"] = json!("yesterday");
        assert!(matches!(
            SmartFence::from_json(&payload).unwrap_err(),
            ValidationError::InvalidTimestamp { .. }
        ));
    }

    #[test]
    fn test_geodomain_builds_from_wire_shape() {
        let domain = Geodomain::from_json(&geodomain_json()).unwrap();
        assert_eq!(domain.status, DomainStatus::Ambient);
        assert_eq!(domain.requirements.len(), 1);
        assert_eq!(domain.domain_name.as_deref(), Some("harbor"));
        assert_eq!(domain.identifier.as_deref(), Some("geo-7"));
    }

    #[test]
    fn test_geodomain_optional_names_may_be_absent() {
        let mut payload = geodomain_json();
        let inner = payload["geodomain"].as_object_mut().unwrap();
        inner.remove("domainName");
        inner.remove("identifier");
        let domain = Geodomain::from_json(&payload).unwrap();
        assert!(domain.domain_name.is_none());
        assert!(domain.identifier.is_none());
    }

    #[test]
    fn test_geodomain_propagates_requirement_failure() {
        let mut payload = geodomain_json();
        payload["geodomain"]["requirements"][0] = json!({"baseType": "COLOR", "red": 999,
                                                          "green": 0, "blue": 0, "alpha": 0});
        assert!(Geodomain::from_json(&payload).is_err());
    }

    #[test]
    fn test_geodomain_requires_requirement_array() {
        let mut payload = geodomain_json();
        payload["geodomain"]["requirements"] = json!("none");
        assert!(Geodomain::from_json(&payload).is_err());
    }

    #[test]
    fn test_state_builds_and_propagates_failures() {
        let state = FencingAgentState::from_json(&json!({
            "fences": [fence_json()],
            "geodomain": geodomain_json()
        }))
        .unwrap();
        assert_eq!(state.fences.len(), 1);

        let bad = json!({"fences": "nope", "geodomain": geodomain_json()});
        assert!(FencingAgentState::from_json(&bad).is_err());

        let mut bad_domain = geodomain_json();
        bad_domain["status"]["status"] = json!("UNKNOWN");
        let bad = json!({"fences": [], "geodomain": bad_domain});
        assert!(FencingAgentState::from_json(&bad).is_err());
    }

    #[test]
    fn test_state_update_builds_both_snapshots() {
        let snapshot = json!({"fences": [fence_json()], "geodomain": geodomain_json()});
        let update = FencingAgentStateUpdate::from_json(&json!({
            "oldSnapshot": snapshot,
            "newSnapshot": snapshot
        }))
        .unwrap();
        assert_eq!(update.old_state, update.new_state);

        let half = json!({"oldSnapshot": snapshot});
        assert!(FencingAgentStateUpdate::from_json(&half).is_err());
    }
}
