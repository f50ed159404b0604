//! Session configuration for a fencing agent.

use serde::Serialize;
use serde_json::Value;

use crate::error::ValidationError;
use crate::wire;

/// Config keys a profile object may carry. Anything else is rejected unless
/// lenient mode is requested.
const RECOGNIZED_KEYS: [&str; 5] = [
    "geodomain",
    "detectApproach",
    "zoomLevel",
    "range",
    "interiorFocus",
];

/// Default surveillance range around the anchor, in kilometers.
const DEFAULT_RANGE_KM: f64 = 2.0;

/// Default map zoom level for fence resolution.
const DEFAULT_ZOOM_LEVEL: u8 = 16;

/// Validated configuration for a geofencing session.
///
/// Immutable once constructed. A session copies the profile it is handed, so
/// changes a caller makes to its own value after session start never reach
/// the running session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FencingAgentProfile {
    /// Name of the geodomain to watch. The only required option.
    pub geodomain: String,
    /// Surveillance range around the anchor, in kilometers.
    pub range: f64,
    /// Map zoom level, a whole number strictly between 0 and 32.
    pub zoom_level: u8,
    /// Whether the native engine should compute approach details per fence.
    pub detect_approach: bool,
    /// Whether surveillance focuses on fence interiors rather than borders.
    pub interior_focus: bool,
}

impl FencingAgentProfile {
    /// Validate a raw config object.
    ///
    /// Unless `lenient` is set, any key outside the five recognized option
    /// names fails construction — this catches typoed option names instead
    /// of silently applying a default over them. `geodomain` is required;
    /// every other option falls back to its default when absent or `null`.
    pub fn from_json(config: &Value, lenient: bool) -> Result<Self, ValidationError> {
        let obj = wire::require_object(config, "profile")?;

        if !lenient {
            for key in obj.keys() {
                if !RECOGNIZED_KEYS.contains(&key.as_str()) {
                    return Err(ValidationError::UnknownProfileKey(key.clone()));
                }
            }
        }

        let geodomain = wire::get_string(obj, "profile.geodomain")?;

        let range = match wire::optional(obj, "profile.range") {
            Some(value) => wire::number(value, "profile.range")?,
            None => DEFAULT_RANGE_KM,
        };

        let zoom_level = match wire::optional(obj, "profile.zoomLevel") {
            Some(value) => {
                let level = wire::whole(value, "profile.zoomLevel")?;
                if !(1..=31).contains(&level) {
                    return Err(ValidationError::OutOfRange {
                        field: "profile.zoomLevel".to_string(),
                        expected: "a whole number strictly between 0 and 32",
                        received: level.to_string(),
                    });
                }
                level as u8
            }
            None => DEFAULT_ZOOM_LEVEL,
        };

        let detect_approach = match wire::optional(obj, "profile.detectApproach") {
            Some(value) => wire::boolean(value, "profile.detectApproach")?,
            None => false,
        };

        let interior_focus = match wire::optional(obj, "profile.interiorFocus") {
            Some(value) => wire::boolean(value, "profile.interiorFocus")?,
            None => true,
        };

        Ok(Self {
            geodomain,
            range,
            zoom_level,
            detect_approach,
            interior_focus,
        })
    }

    /// A value-equal, independently owned copy of this profile.
    ///
    /// Field validity is carried over from construction, so no re-validation
    /// is needed.
    pub fn copy(&self) -> Self {
        self.clone()
    }
}
