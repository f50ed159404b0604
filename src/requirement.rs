//! Requirement predicates attached to a geodomain.
//!
//! A requirement is a typed predicate the native engine evaluates against a
//! fenced domain; this layer validates and models it. Every wire-format
//! requirement object carries a `baseType` tag drawn from a closed set of
//! five kinds, and construction dispatches purely on that tag.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::wire;

/// A named predicate attached to a geodomain.
///
/// The tag set is closed: any `baseType` outside these five variants is a
/// construction error. (The native engine internally knows a sixth `BLOB`
/// kind but refuses to serialize it across the bridge, so it never appears
/// here.)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "baseType")]
pub enum Requirement {
    /// An RGBA color predicate.
    #[serde(rename = "COLOR")]
    Color(ColorRequirement),
    /// A fixed-width set of named boolean slots.
    #[serde(rename = "BOOLEANSET")]
    BooleanSet(BooleanSetRequirement),
    /// A numeric band over a scalar axis.
    #[serde(rename = "THRESHOLD")]
    Threshold(ThresholdRequirement),
    /// A boolean signal toggling at listed points along a scalar axis.
    #[serde(rename = "INTERVAL")]
    Interval(IntervalRequirement),
    /// An opaque named profile reference.
    #[serde(rename = "PROFILE")]
    Profile(ProfileRequirement),
}

impl Requirement {
    /// Build a requirement from wire-format JSON, dispatching on `baseType`.
    ///
    /// Fails when `baseType` is absent or unrecognized, or when any field of
    /// the selected variant violates its validation rule.
    pub fn from_json(json: &Value) -> Result<Self, ValidationError> {
        let obj = wire::require_object(json, "requirement")?;
        let base_type = wire::get_string(obj, "requirement.baseType")?;
        match base_type.as_str() {
            "COLOR" => Ok(Requirement::Color(ColorRequirement::from_object(obj)?)),
            "BOOLEANSET" => Ok(Requirement::BooleanSet(BooleanSetRequirement::from_object(obj)?)),
            "THRESHOLD" => Ok(Requirement::Threshold(ThresholdRequirement::from_object(obj)?)),
            "INTERVAL" => Ok(Requirement::Interval(IntervalRequirement::from_object(obj)?)),
            "PROFILE" => Ok(Requirement::Profile(ProfileRequirement::from_object(obj)?)),
            _ => Err(ValidationError::UnknownRequirementType(base_type)),
        }
    }

    /// The discriminant tag this requirement was built from.
    pub fn base_type(&self) -> &'static str {
        match self {
            Requirement::Color(_) => "COLOR",
            Requirement::BooleanSet(_) => "BOOLEANSET",
            Requirement::Threshold(_) => "THRESHOLD",
            Requirement::Interval(_) => "INTERVAL",
            Requirement::Profile(_) => "PROFILE",
        }
    }
}

/// An RGBA color predicate; each channel is a whole number in [0,255].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColorRequirement {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl ColorRequirement {
    fn from_object(obj: &Map<String, Value>) -> Result<Self, ValidationError> {
        Ok(Self {
            red: color_channel(obj, "requirement.red")?,
            green: color_channel(obj, "requirement.green")?,
            blue: color_channel(obj, "requirement.blue")?,
            alpha: color_channel(obj, "requirement.alpha")?,
        })
    }
}

fn color_channel(obj: &Map<String, Value>, field: &str) -> Result<u8, ValidationError> {
    let n = wire::get_whole(obj, field)?;
    if !(0..=255).contains(&n) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            expected: "an integer in [0,255]",
            received: n.to_string(),
        });
    }
    Ok(n as u8)
}

/// Sixteen named boolean slots (`bool0` .. `bool15`), any of which may be
/// independently absent on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BooleanSetRequirement {
    pub slots: [Option<bool>; 16],
}

impl BooleanSetRequirement {
    fn from_object(obj: &Map<String, Value>) -> Result<Self, ValidationError> {
        let mut slots = [None; 16];
        for (i, slot) in slots.iter_mut().enumerate() {
            *slot = wire::opt_bool(obj, &format!("requirement.bool{i}"))?;
        }
        Ok(Self { slots })
    }

    /// The value of slot `index`, or `None` when the slot was absent or the
    /// index exceeds the fixed width.
    pub fn slot(&self, index: usize) -> Option<bool> {
        self.slots.get(index).copied().flatten()
    }
}

/// A numeric band over a scalar axis, in the stated unit.
///
/// The lower bound must not exceed the upper bound.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdRequirement {
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub unit: String,
}

impl ThresholdRequirement {
    fn from_object(obj: &Map<String, Value>) -> Result<Self, ValidationError> {
        let lower_bound = wire::get_number(obj, "requirement.lowerBound")?;
        let upper_bound = wire::get_number(obj, "requirement.upperBound")?;
        if lower_bound > upper_bound {
            return Err(ValidationError::OutOfRange {
                field: "requirement.lowerBound".to_string(),
                expected: "a value at or below `upperBound`",
                received: lower_bound.to_string(),
            });
        }
        let unit = wire::get_string(obj, "requirement.unit")?;
        Ok(Self {
            lower_bound,
            upper_bound,
            unit,
        })
    }
}

/// A boolean signal that toggles at each listed point along a scalar axis
/// bounded by `[floor, ceiling]`.
///
/// The wire key for the point list is `stateChanges`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalRequirement {
    pub state_change_points: Vec<f64>,
    pub initial_state: bool,
    pub floor: f64,
    pub ceiling: f64,
    pub unit: String,
}

impl IntervalRequirement {
    fn from_object(obj: &Map<String, Value>) -> Result<Self, ValidationError> {
        let raw_points = wire::require_array(
            wire::require(obj, "requirement.stateChanges")?,
            "requirement.stateChanges",
        )?;
        let mut state_change_points = Vec::with_capacity(raw_points.len());
        for (i, point) in raw_points.iter().enumerate() {
            state_change_points.push(wire::number(point, &format!("requirement.stateChanges[{i}]"))?);
        }

        let initial_state = wire::get_bool(obj, "requirement.initialState")?;
        let floor = wire::get_number(obj, "requirement.floor")?;
        let ceiling = wire::get_number(obj, "requirement.ceiling")?;
        let unit = wire::get_string(obj, "requirement.unit")?;

        Ok(Self {
            state_change_points,
            initial_state,
            floor,
            ceiling,
            unit,
        })
    }

    /// The signal's value at `point`.
    ///
    /// Starts from `initial_state` and toggles once for every change point
    /// whose value is at or below `point`. A pure toggle commutes, so only
    /// the count of passed points matters, never their stored order.
    ///
    /// Fails when `point` lies outside `[floor, ceiling]`.
    pub fn state_at(&self, point: f64) -> Result<bool, ValidationError> {
        if !(self.floor..=self.ceiling).contains(&point) {
            return Err(ValidationError::OutOfRange {
                field: "point".to_string(),
                expected: "a value between the interval floor and ceiling",
                received: point.to_string(),
            });
        }
        let flips = self
            .state_change_points
            .iter()
            .filter(|&&change| change <= point)
            .count();
        Ok(if flips % 2 == 0 {
            self.initial_state
        } else {
            !self.initial_state
        })
    }
}

/// An opaque named profile reference, interpreted by the native engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileRequirement {
    pub value: String,
}

impl ProfileRequirement {
    fn from_object(obj: &Map<String, Value>) -> Result<Self, ValidationError> {
        Ok(Self {
            value: wire::get_string(obj, "requirement.value")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn interval(points: Vec<f64>, initial: bool) -> IntervalRequirement {
        IntervalRequirement {
            state_change_points: points,
            initial_state: initial,
            floor: 0.0,
            ceiling: 10.0,
            unit: "km".to_string(),
        }
    }

    #[test]
    fn test_dispatch_matches_base_type() {
        let cases = vec![
            (
                json!({"baseType": "COLOR", "red": 0, "green": 128, "blue": 255, "alpha": 255}),
                "COLOR",
            ),
            (json!({"baseType": "BOOLEANSET", "bool0": true}), "BOOLEANSET"),
            (
                json!({"baseType": "THRESHOLD", "lowerBound": 1.0, "upperBound": 2.0, "unit": "km"}),
                "THRESHOLD",
            ),
            (
                json!({"baseType": "INTERVAL", "stateChanges": [3.0], "initialState": false,
                       "floor": 0.0, "ceiling": 10.0, "unit": "km"}),
                "INTERVAL",
            ),
            (json!({"baseType": "PROFILE", "value": "quiet-hours"}), "PROFILE"),
        ];

        for (payload, expected_tag) in cases {
            let requirement = Requirement::from_json(&payload).unwrap();
            assert_eq!(requirement.base_type(), expected_tag);
        }
    }

    #[test]
    fn test_unknown_base_type_rejected() {
        let err = Requirement::from_json(&json!({"baseType": "BLOB"})).unwrap_err();
        assert!(matches!(err, ValidationError::UnknownRequirementType(tag) if tag == "BLOB"));
    }

    #[test]
    fn test_missing_base_type_rejected() {
        let err = Requirement::from_json(&json!({"red": 1})).unwrap_err();
        assert!(matches!(err, ValidationError::MissingField { .. }));
    }

    #[test]
    fn test_non_object_requirement_rejected() {
        assert!(Requirement::from_json(&json!(42)).is_err());
        assert!(Requirement::from_json(&json!(null)).is_err());
    }

    #[test]
    fn test_color_accepts_full_channel_range() {
        let requirement = Requirement::from_json(
            &json!({"baseType": "COLOR", "red": 0, "green": 255, "blue": 17, "alpha": 255}),
        )
        .unwrap();
        let Requirement::Color(color) = requirement else {
            panic!("expected a color requirement");
        };
        assert_eq!(color.red, 0);
        assert_eq!(color.green, 255);
    }

    #[test]
    fn test_color_rejects_out_of_range_and_fractional() {
        for bad in [json!(256), json!(-1), json!(3.5)] {
            let payload = json!({"baseType": "COLOR", "red": bad, "green": 0, "blue": 0, "alpha": 0});
            assert!(Requirement::from_json(&payload).is_err(), "accepted {payload}");
        }
    }

    #[test]
    fn test_boolean_set_slots_independently_absent() {
        let requirement = Requirement::from_json(
            &json!({"baseType": "BOOLEANSET", "bool0": true, "bool15": false}),
        )
        .unwrap();
        let Requirement::BooleanSet(set) = requirement else {
            panic!("expected a boolean set requirement");
        };
        assert_eq!(set.slot(0), Some(true));
        assert_eq!(set.slot(1), None);
        assert_eq!(set.slot(15), Some(false));
        assert_eq!(set.slot(16), None);
    }

    #[test]
    fn test_boolean_set_rejects_non_boolean_slot() {
        let err =
            Requirement::from_json(&json!({"baseType": "BOOLEANSET", "bool3": 1})).unwrap_err();
        assert!(matches!(err, ValidationError::TypeMismatch { field, .. } if field.ends_with("bool3")));
    }

    #[test]
    fn test_threshold_requires_ordered_bounds() {
        let payload = json!({"baseType": "THRESHOLD", "lowerBound": 5.0, "upperBound": 1.0, "unit": "m"});
        assert!(Requirement::from_json(&payload).is_err());

        // Equal bounds describe a degenerate but legal band.
        let payload = json!({"baseType": "THRESHOLD", "lowerBound": 2.0, "upperBound": 2.0, "unit": "m"});
        assert!(Requirement::from_json(&payload).is_ok());
    }

    #[test]
    fn test_interval_rejects_points_outside_bounds() {
        let interval = interval(vec![3.0, 6.0], false);
        assert!(interval.state_at(-0.1).is_err());
        assert!(interval.state_at(10.1).is_err());
        assert!(interval.state_at(f64::NAN).is_err());
    }

    #[test]
    fn test_interval_state_toggles_per_passed_point() {
        let interval = interval(vec![3.0, 6.0], false);
        assert_eq!(interval.state_at(0.0).unwrap(), false);
        assert_eq!(interval.state_at(2.9).unwrap(), false);
        assert_eq!(interval.state_at(3.0).unwrap(), true);
        assert_eq!(interval.state_at(4.0).unwrap(), true);
        assert_eq!(interval.state_at(6.0).unwrap(), false);
        assert_eq!(interval.state_at(10.0).unwrap(), false);
    }

    #[test]
    fn test_interval_storage_order_does_not_matter() {
        // An unsorted point list evaluates exactly like the sorted one: only
        // the number of points at or below the query matters.
        let sorted = interval(vec![3.0, 6.0], false);
        let unsorted = interval(vec![6.0, 3.0], false);
        for point in [0.0, 3.0, 4.0, 6.0, 10.0] {
            assert_eq!(
                sorted.state_at(point).unwrap(),
                unsorted.state_at(point).unwrap(),
                "diverged at {point}"
            );
        }
        assert_eq!(unsorted.state_at(4.0).unwrap(), true);
    }

    #[test]
    fn test_interval_initial_state_respected() {
        let interval = interval(vec![5.0], true);
        assert_eq!(interval.state_at(0.0).unwrap(), true);
        assert_eq!(interval.state_at(5.0).unwrap(), false);
    }

    #[test]
    fn test_interval_rejects_malformed_wire_fields() {
        let base = json!({"baseType": "INTERVAL", "stateChanges": [1.0], "initialState": false,
                          "floor": 0.0, "ceiling": 10.0, "unit": "km"});

        let mut missing_points = base.clone();
        missing_points.as_object_mut().unwrap().remove("stateChanges");
        assert!(Requirement::from_json(&missing_points).is_err());

        let mut bad_points = base.clone();
        bad_points["stateChanges"] = json!([1.0, "two"]);
        assert!(Requirement::from_json(&bad_points).is_err());

        let mut bad_initial = base.clone();
        bad_initial["initialState"] = json!("false");
        assert!(Requirement::from_json(&bad_initial).is_err());
    }

    #[test]
    fn test_profile_requirement_requires_string_value() {
        assert!(Requirement::from_json(&json!({"baseType": "PROFILE", "value": 7})).is_err());
        let requirement =
            Requirement::from_json(&json!({"baseType": "PROFILE", "value": "p1"})).unwrap();
        assert_eq!(requirement.base_type(), "PROFILE");
    }
}
