use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{
    schema::{CameraAngle, CameraHeight, CameraRotation, ColorPalette, FieldOfView, Lighting},
    DirectorsChairError, Result,
};

/// One discrete edit emitted by a control widget. Each variant carries a value
/// that is already legal for its field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum ControlUpdate {
    CameraAngle(CameraAngle),
    Fov(FieldOfView),
    CameraRotation(CameraRotation),
    CameraHeight(CameraHeight),
    Lighting(Lighting),
    ColorPalette(ColorPalette),
}

impl ControlUpdate {
    /// Field names accepted by [`ControlUpdate::parse`].
    pub const FIELDS: &'static [&'static str] = &[
        "camera_angle",
        "fov",
        "camera_rotation",
        "camera_height",
        "lighting",
        "color_palette",
    ];

    /// Builds an update from a field name and its textual value.
    pub fn parse(field: &str, value: &str) -> Result<Self> {
        let value = value.trim();
        match field.trim() {
            "camera_angle" => value.parse().map(Self::CameraAngle),
            "fov" => parse_number(value, "field of view")
                .and_then(FieldOfView::try_from)
                .map(Self::Fov),
            "camera_rotation" => parse_number(value, "camera rotation")
                .and_then(CameraRotation::try_from)
                .map(Self::CameraRotation),
            "camera_height" => value.parse().map(Self::CameraHeight),
            "lighting" => value.parse().map(Self::Lighting),
            "color_palette" => value.parse().map(Self::ColorPalette),
            other => Err(DirectorsChairError::invalid_control("control field", other)),
        }
    }

    pub fn field(&self) -> &'static str {
        match self {
            Self::CameraAngle(_) => "camera_angle",
            Self::Fov(_) => "fov",
            Self::CameraRotation(_) => "camera_rotation",
            Self::CameraHeight(_) => "camera_height",
            Self::Lighting(_) => "lighting",
            Self::ColorPalette(_) => "color_palette",
        }
    }
}

/// Parses the `field=value` form used on the command line.
impl FromStr for ControlUpdate {
    type Err = DirectorsChairError;

    fn from_str(assignment: &str) -> Result<Self> {
        let (field, value) = assignment.split_once('=').ok_or_else(|| {
            DirectorsChairError::msg(format!("expected `field=value`, got `{assignment}`"))
        })?;
        Self::parse(field, value)
    }
}

fn parse_number(value: &str, field: &'static str) -> Result<i64> {
    value
        .parse::<i64>()
        .map_err(|_| DirectorsChairError::invalid_control(field, value))
}

/// Fill fraction of a range slider, in `[0, 1]`.
///
/// Linear interpolation of `value` between `min` and `max`. Values outside the
/// range are clamped so the track fill never overshoots; a degenerate range
/// reports an empty track.
pub fn slider_fraction(value: f32, min: f32, max: f32) -> f32 {
    let span = max - min;
    if span <= f32::EPSILON {
        return 0.0;
    }
    ((value - min) / span).clamp(0.0, 1.0)
}

/// Fill fraction of the lens slider.
pub fn fov_fraction(fov: FieldOfView) -> f32 {
    slider_fraction(
        f32::from(fov.get()),
        f32::from(FieldOfView::MIN),
        f32::from(FieldOfView::MAX),
    )
}

/// Position of the compass needle along its track.
pub fn compass_fraction(rotation: CameraRotation) -> f32 {
    f32::from(rotation.get()) / f32::from(CameraRotation::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_assignments_for_every_field() {
        assert_eq!(
            "camera_angle=side".parse::<ControlUpdate>().unwrap(),
            ControlUpdate::CameraAngle(CameraAngle::Side)
        );
        assert_eq!(
            "fov = 50".parse::<ControlUpdate>().unwrap(),
            ControlUpdate::Fov(FieldOfView::new(50).unwrap())
        );
        assert_eq!(
            "camera_rotation=360".parse::<ControlUpdate>().unwrap(),
            ControlUpdate::CameraRotation(CameraRotation::new(360).unwrap())
        );
        assert_eq!(
            "camera_height=bird_eye".parse::<ControlUpdate>().unwrap(),
            ControlUpdate::CameraHeight(CameraHeight::BirdEye)
        );
        assert_eq!(
            "lighting=cinematic_warm".parse::<ControlUpdate>().unwrap(),
            ControlUpdate::Lighting(Lighting::CinematicWarm)
        );
        assert_eq!(
            "color_palette=noir".parse::<ControlUpdate>().unwrap(),
            ControlUpdate::ColorPalette(ColorPalette::Noir)
        );
    }

    #[test]
    fn rejects_malformed_assignments() {
        assert!("fov".parse::<ControlUpdate>().is_err());
        assert!("fov=wide".parse::<ControlUpdate>().is_err());
        assert!("fov=90".parse::<ControlUpdate>().is_err());
        assert!("aperture=f1.8".parse::<ControlUpdate>().is_err());
        assert!("camera_angle=FRONT".parse::<ControlUpdate>().is_err());
    }

    #[test]
    fn field_names_round_trip_through_parse() {
        for field in ControlUpdate::FIELDS {
            let value = match *field {
                "fov" => "35",
                "camera_rotation" => "120",
                "camera_angle" => "front",
                "camera_height" => "eye_level",
                "lighting" => "studio_soft",
                _ => "neutral",
            };
            assert_eq!(ControlUpdate::parse(field, value).unwrap().field(), *field);
        }
    }

    #[test]
    fn slider_fraction_interpolates_and_clamps() {
        assert_eq!(slider_fraction(16.0, 16.0, 85.0), 0.0);
        assert_eq!(slider_fraction(85.0, 16.0, 85.0), 1.0);
        assert!((slider_fraction(50.5, 16.0, 85.0) - 0.5).abs() < 1e-6);
        assert_eq!(slider_fraction(100.0, 16.0, 85.0), 1.0);
        assert_eq!(slider_fraction(0.0, 16.0, 85.0), 0.0);
        assert_eq!(slider_fraction(5.0, 5.0, 5.0), 0.0);
    }

    #[test]
    fn widget_fractions_follow_the_stored_values() {
        assert!((fov_fraction(FieldOfView::new(85).unwrap()) - 1.0).abs() < f32::EPSILON);
        assert!((compass_fraction(CameraRotation::new(180).unwrap()) - 0.5).abs() < f32::EPSILON);
        assert_eq!(compass_fraction(CameraRotation::default()), 120.0 / 360.0);
    }
}
