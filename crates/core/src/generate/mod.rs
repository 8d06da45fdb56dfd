//! The "Generate Scene" action and what it hands to the engine.
//!
//! No backend is contacted: triggering logs the serialized configuration and
//! holds a busy flag for a fixed window. The engine payload and the mock
//! generation records are produced locally.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::GenerateSettings, schema::SceneConfiguration, timeline::PlaybackClock,
    DirectorsChairError, Result,
};

const NEGATIVE_PROMPT: &str = "blurry, low quality, noise, artifacts";
const MOCK_IMAGE_HOST: &str = "https://mockstorage.dev/images";

/// Busy-flag state machine behind the generate button.
#[derive(Debug, Clone)]
pub struct GenerateAction {
    busy_window: Duration,
    busy_since: Option<Duration>,
}

impl GenerateAction {
    pub fn new(settings: &GenerateSettings) -> Self {
        Self {
            busy_window: settings.busy_window(),
            busy_since: None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy_since.is_some()
    }

    /// Sends the configuration if the action is idle.
    ///
    /// Returns the compact JSON payload that was logged, or `None` when a
    /// previous trigger is still inside its busy window.
    pub fn trigger(
        &mut self,
        config: &SceneConfiguration,
        clock: &PlaybackClock,
    ) -> Result<Option<String>> {
        if self.is_busy() {
            tracing::debug!("generate ignored while busy");
            return Ok(None);
        }

        let payload = config.to_compact_json()?;
        tracing::info!(payload = payload.as_str(), "sending payload");
        self.busy_since = Some(clock.elapsed());
        Ok(Some(payload))
    }

    /// Clears the busy flag once the window has elapsed. Returns `true` on the
    /// tick that clears it.
    pub fn tick(&mut self, clock: &PlaybackClock) -> bool {
        match self.busy_since {
            Some(since) if clock.elapsed().saturating_sub(since) >= self.busy_window => {
                self.busy_since = None;
                true
            }
            _ => false,
        }
    }

    /// Offset at which the busy flag will clear, if busy.
    pub fn ready_at(&self) -> Option<Duration> {
        self.busy_since.map(|since| since + self.busy_window)
    }
}

impl Default for GenerateAction {
    fn default() -> Self {
        Self::new(&GenerateSettings::default())
    }
}

/// Controllability payload in the shape the image engine expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiboPayload {
    pub prompt: String,
    pub negative_prompt: String,
    pub controllability_params: ControllabilityParams,
    pub output_settings: OutputSettings,
    /// `-1` lets the engine pick a seed.
    pub seed: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllabilityParams {
    pub camera_angle: String,
    pub fov_mm: u16,
    pub camera_rotation_deg: u16,
    pub camera_height: String,
    pub lighting_style: String,
    pub color_scheme: String,
    pub has_reference_image: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSettings {
    pub aspect_ratio: String,
    pub bit_depth: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            aspect_ratio: "1:1".to_string(),
            bit_depth: "8bit".to_string(),
        }
    }
}

impl FiboPayload {
    pub fn from_configuration(config: &SceneConfiguration, seed: Option<u64>) -> Self {
        let controls = &config.controls;
        let prompt = format!(
            "{} view, {} lens, {} camera, {} lighting, {} palette",
            controls.camera_angle.label(),
            controls.fov,
            controls.camera_height.label(),
            controls.lighting.label(),
            controls.color_palette.label(),
        );

        Self {
            prompt,
            negative_prompt: NEGATIVE_PROMPT.to_string(),
            controllability_params: ControllabilityParams {
                camera_angle: controls.camera_angle.as_str().to_string(),
                fov_mm: controls.fov.get(),
                camera_rotation_deg: controls.camera_rotation.get(),
                camera_height: controls.camera_height.as_str().to_string(),
                lighting_style: controls.lighting.label(),
                color_scheme: controls.color_palette.as_str().to_string(),
                has_reference_image: config.has_reference_image(),
            },
            output_settings: OutputSettings::default(),
            seed: seed
                .and_then(|seed| i64::try_from(seed).ok())
                .unwrap_or(-1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStatus {
    Success,
    Failed,
}

/// One generation, with the exact configuration that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub uuid: Uuid,
    pub spec: serde_json::Value,
    /// Mock result location; absent for failed generations.
    pub generated_image_url: Option<String>,
    pub status: GenerationStatus,
    pub created_at: DateTime<Utc>,
}

/// In-memory generation log. Cleared with the process.
#[derive(Debug, Default)]
pub struct GenerationHistory {
    records: Vec<GenerationRecord>,
}

impl GenerationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a generation of `config` with the given outcome. Successful
    /// generations point at a mock image URL.
    pub fn record(
        &mut self,
        config: &SceneConfiguration,
        status: GenerationStatus,
    ) -> Result<GenerationRecord> {
        let uuid = Uuid::new_v4();
        let generated_image_url = match status {
            GenerationStatus::Success => Some(format!("{MOCK_IMAGE_HOST}/{uuid}.jpg")),
            GenerationStatus::Failed => None,
        };
        let record = GenerationRecord {
            uuid,
            spec: serde_json::to_value(config)?,
            generated_image_url,
            status,
            created_at: Utc::now(),
        };
        tracing::info!(%uuid, ?status, "recorded generation");
        self.records.push(record.clone());
        Ok(record)
    }

    pub fn get(&self, uuid: &Uuid) -> Result<&GenerationRecord> {
        self.records
            .iter()
            .find(|record| &record.uuid == uuid)
            .ok_or_else(|| DirectorsChairError::NotFound(format!("generation `{uuid}`")))
    }

    /// Records, newest first.
    pub fn list(&self) -> impl Iterator<Item = &GenerationRecord> {
        self.records.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ColorPalette, Lighting};

    #[test]
    fn busy_flag_blocks_until_the_window_elapses() {
        let mut action = GenerateAction::default();
        let config = SceneConfiguration::default();

        let payload = action
            .trigger(&config, &PlaybackClock::at_millis(100))
            .unwrap()
            .expect("idle action sends");
        assert_eq!(SceneConfiguration::from_json(&payload).unwrap(), config);
        assert!(action.is_busy());
        assert_eq!(action.ready_at(), Some(Duration::from_millis(2_100)));

        assert!(action.trigger(&config, &PlaybackClock::at_millis(500)).unwrap().is_none());
        assert!(!action.tick(&PlaybackClock::at_millis(2_099)));
        assert!(action.tick(&PlaybackClock::at_millis(2_100)));
        assert!(!action.is_busy());
        assert!(!action.tick(&PlaybackClock::at_millis(9_000)));

        assert!(action.trigger(&config, &PlaybackClock::at_millis(2_200)).unwrap().is_some());
    }

    #[test]
    fn payload_reflects_the_controls() {
        let mut config = SceneConfiguration::default();
        config.controls.lighting = Lighting::CinematicWarm;
        config.controls.color_palette = ColorPalette::Noir;

        let payload = FiboPayload::from_configuration(&config, None);
        assert_eq!(
            payload.prompt,
            "front view, 35mm lens, eye level camera, cinematic warm lighting, noir palette"
        );
        assert_eq!(payload.negative_prompt, NEGATIVE_PROMPT);
        assert_eq!(payload.controllability_params.fov_mm, 35);
        assert_eq!(payload.controllability_params.camera_rotation_deg, 120);
        assert_eq!(payload.controllability_params.lighting_style, "cinematic warm");
        assert!(!payload.controllability_params.has_reference_image);
        assert_eq!(payload.output_settings.aspect_ratio, "1:1");
        assert_eq!(payload.seed, -1);

        assert_eq!(FiboPayload::from_configuration(&config, Some(7)).seed, 7);
    }

    #[test]
    fn history_records_and_finds_generations() {
        let mut history = GenerationHistory::new();
        let first = history
            .record(&SceneConfiguration::default(), GenerationStatus::Success)
            .unwrap();
        let second = history
            .record(&SceneConfiguration::default(), GenerationStatus::Success)
            .unwrap();

        assert_eq!(history.len(), 2);
        assert_eq!(history.get(&first.uuid).unwrap(), &first);
        assert!(first
            .generated_image_url
            .as_deref()
            .unwrap()
            .ends_with(&format!("{}.jpg", first.uuid)));
        assert_eq!(first.spec["controls"]["fov"], 35);

        let newest: Vec<_> = history.list().map(|r| r.uuid).collect();
        assert_eq!(newest, vec![second.uuid, first.uuid]);
    }

    #[test]
    fn failed_generations_have_no_image() {
        let mut history = GenerationHistory::new();
        let failed = history
            .record(&SceneConfiguration::default(), GenerationStatus::Failed)
            .unwrap();

        assert_eq!(failed.status, GenerationStatus::Failed);
        assert_eq!(failed.generated_image_url, None);
        assert_eq!(history.get(&failed.uuid).unwrap().status, GenerationStatus::Failed);
        assert_eq!(
            serde_json::to_value(&failed).unwrap()["status"],
            serde_json::json!("failed")
        );
    }

    #[test]
    fn unknown_generation_is_not_found() {
        let history = GenerationHistory::new();
        let err = history.get(&Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, DirectorsChairError::NotFound(_)));
    }
}
