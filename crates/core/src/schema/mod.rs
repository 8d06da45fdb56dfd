//! Camera and scene parameter set edited by the Director's Chair.
//!
//! Every enumerated field is a closed Rust enum and every numeric field is a
//! bounded newtype, so an out-of-set value can never be stored. JSON keys and
//! literals match the payload preview shown to the user.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{DirectorsChairError, Result};

macro_rules! closed_set {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal, default = $default:ident {
            $($variant:ident => $literal:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every legal value, in the order the control presents them.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Serialized literal of the value.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $literal),+
                }
            }

            /// Human readable label, as shown in the dropdown.
            pub fn label(self) -> String {
                self.as_str().replace('_', " ")
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = DirectorsChairError;

            fn from_str(value: &str) -> Result<Self> {
                match value {
                    $($literal => Ok($name::$variant),)+
                    other => Err(DirectorsChairError::invalid_control($field, other)),
                }
            }
        }
    };
}

closed_set! {
    /// Side of the subject the camera faces.
    CameraAngle, "camera angle", default = Front {
        Front => "front",
        Side => "side",
        Back => "back",
        Top => "top",
    }
}

closed_set! {
    /// Vertical placement of the camera.
    CameraHeight, "camera height", default = EyeLevel {
        Ground => "ground",
        Low => "low",
        EyeLevel => "eye_level",
        High => "high",
        BirdEye => "bird_eye",
    }
}

closed_set! {
    /// Lighting model applied to the scene.
    Lighting, "lighting model", default = StudioSoft {
        StudioSoft => "studio_soft",
        StudioHard => "studio_hard",
        NaturalMorning => "natural_morning",
        NaturalNoon => "natural_noon",
        NeonCyberpunk => "neon_cyberpunk",
        CinematicWarm => "cinematic_warm",
    }
}

closed_set! {
    /// Color grading palette.
    ColorPalette, "color palette", default = Neutral {
        Neutral => "neutral",
        Vibrant => "vibrant",
        Pastel => "pastel",
        Noir => "noir",
        Matrix => "matrix",
    }
}

fn check_bound(field: &'static str, value: i64, min: u16, max: u16) -> Result<u16> {
    if value < i64::from(min) || value > i64::from(max) {
        return Err(DirectorsChairError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(value as u16)
}

/// Lens focal length in millimeters, within `[16, 85]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u16")]
pub struct FieldOfView(u16);

impl FieldOfView {
    pub const MIN: u16 = 16;
    pub const MAX: u16 = 85;
    pub const UNIT: &'static str = "mm";

    pub fn new(millimeters: u16) -> Result<Self> {
        Self::try_from(i64::from(millimeters))
    }

    pub fn get(self) -> u16 {
        self.0
    }
}

impl Default for FieldOfView {
    fn default() -> Self {
        Self(35)
    }
}

impl TryFrom<i64> for FieldOfView {
    type Error = DirectorsChairError;

    fn try_from(value: i64) -> Result<Self> {
        check_bound("field of view", value, Self::MIN, Self::MAX).map(Self)
    }
}

impl From<FieldOfView> for u16 {
    fn from(value: FieldOfView) -> Self {
        value.0
    }
}

impl fmt::Display for FieldOfView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.0, Self::UNIT)
    }
}

/// Camera orbit around the subject in degrees, within `[0, 360]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u16")]
pub struct CameraRotation(u16);

impl CameraRotation {
    pub const MIN: u16 = 0;
    pub const MAX: u16 = 360;
    pub const UNIT: &'static str = "°";

    pub fn new(degrees: u16) -> Result<Self> {
        Self::try_from(i64::from(degrees))
    }

    pub fn get(self) -> u16 {
        self.0
    }
}

impl Default for CameraRotation {
    fn default() -> Self {
        Self(120)
    }
}

impl TryFrom<i64> for CameraRotation {
    type Error = DirectorsChairError;

    fn try_from(value: i64) -> Result<Self> {
        check_bound("camera rotation", value, Self::MIN, Self::MAX).map(Self)
    }
}

impl From<CameraRotation> for u16 {
    fn from(value: CameraRotation) -> Self {
        value.0
    }
}

impl fmt::Display for CameraRotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.0, Self::UNIT)
    }
}

/// The adjustable camera and atmosphere parameters. Fields are independent of
/// each other; there are no cross-field constraints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Controls {
    pub camera_angle: CameraAngle,
    pub fov: FieldOfView,
    pub camera_rotation: CameraRotation,
    pub camera_height: CameraHeight,
    pub lighting: Lighting,
    pub color_palette: ColorPalette,
}

/// Full scene configuration: the controls plus an optional reference image
/// encoded as a data URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneConfiguration {
    #[serde(default)]
    pub reference_image: Option<String>,
    pub controls: Controls,
}

impl SceneConfiguration {
    /// Pretty JSON with two-space indentation, keys in declaration order.
    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Single-line JSON, as sent with the generate action.
    pub fn to_compact_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn has_reference_image(&self) -> bool {
        self.reference_image.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_literals() {
        let config = SceneConfiguration::default();

        assert_eq!(config.reference_image, None);
        assert_eq!(config.controls.camera_angle, CameraAngle::Front);
        assert_eq!(config.controls.fov.get(), 35);
        assert_eq!(config.controls.camera_rotation.get(), 120);
        assert_eq!(config.controls.camera_height, CameraHeight::EyeLevel);
        assert_eq!(config.controls.lighting, Lighting::StudioSoft);
        assert_eq!(config.controls.color_palette, ColorPalette::Neutral);
    }

    #[test]
    fn pretty_json_matches_the_payload_preview() {
        let json = SceneConfiguration::default().to_pretty_json().unwrap();
        let expected = r#"{
  "reference_image": null,
  "controls": {
    "camera_angle": "front",
    "fov": 35,
    "camera_rotation": 120,
    "camera_height": "eye_level",
    "lighting": "studio_soft",
    "color_palette": "neutral"
  }
}"#;
        assert_eq!(json, expected);
    }

    #[test]
    fn json_round_trip_preserves_every_field() {
        let config = SceneConfiguration {
            reference_image: Some("data:image/png;base64,AAAA".to_string()),
            controls: Controls {
                camera_angle: CameraAngle::Top,
                fov: FieldOfView::new(85).unwrap(),
                camera_rotation: CameraRotation::new(0).unwrap(),
                camera_height: CameraHeight::BirdEye,
                lighting: Lighting::NeonCyberpunk,
                color_palette: ColorPalette::Matrix,
            },
        };

        let parsed = SceneConfiguration::from_json(&config.to_pretty_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn rejects_out_of_range_numbers() {
        assert!(FieldOfView::new(15).is_err());
        assert!(FieldOfView::new(86).is_err());
        assert!(CameraRotation::new(361).is_err());
        assert_eq!(CameraRotation::new(360).unwrap().get(), 360);

        let json = r#"{"controls":{"camera_angle":"front","fov":-4,"camera_rotation":120,
            "camera_height":"eye_level","lighting":"studio_soft","color_palette":"neutral"}}"#;
        let err = SceneConfiguration::from_json(json).unwrap_err();
        assert!(format!("{err}").contains("field of view"));
    }

    #[test]
    fn rejects_literals_outside_the_closed_set() {
        let err = "diagonal".parse::<CameraAngle>().unwrap_err();
        assert!(format!("{err}").contains("diagonal"));

        let json = r#"{"controls":{"camera_angle":"diagonal","fov":35,"camera_rotation":120,
            "camera_height":"eye_level","lighting":"studio_soft","color_palette":"neutral"}}"#;
        assert!(SceneConfiguration::from_json(json).is_err());
    }

    #[test]
    fn labels_replace_underscores() {
        assert_eq!(CameraHeight::BirdEye.label(), "bird eye");
        assert_eq!(Lighting::NaturalMorning.label(), "natural morning");
        assert_eq!(ColorPalette::ALL.len(), 5);
        assert_eq!(Lighting::ALL[4], Lighting::NeonCyberpunk);
    }
}
