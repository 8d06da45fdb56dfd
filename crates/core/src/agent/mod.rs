//! Natural-language edits of the scene configuration.
//!
//! Without a language model attached the agent runs in mock mode: any
//! instruction moves the lighting to the dramatic cinematic look, or reports
//! that nothing needed to change when it is already there.

use serde::{Deserialize, Serialize};

use crate::{
    controls::ControlUpdate,
    schema::{Lighting, SceneConfiguration},
    store::ConfigStore,
    DirectorsChairError, Result,
};

/// Closest member of the lighting set to the dramatic cinematic style.
const DRAMATIC_LIGHTING: Lighting = Lighting::CinematicWarm;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentPatchRequest {
    pub current: SceneConfiguration,
    pub instruction: String,
}

impl AgentPatchRequest {
    pub fn new(current: SceneConfiguration, instruction: impl Into<String>) -> Self {
        Self {
            current,
            instruction: instruction.into(),
        }
    }
}

/// Proposed configuration plus a one-sentence summary of the change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentPatchResponse {
    pub new_spec: SceneConfiguration,
    pub patch_summary: String,
}

impl AgentPatchResponse {
    /// Control edits that turn `current` into the proposal, in field order.
    pub fn updates(&self, current: &SceneConfiguration) -> Vec<ControlUpdate> {
        let (old, new) = (&current.controls, &self.new_spec.controls);
        let mut updates = Vec::new();
        if old.camera_angle != new.camera_angle {
            updates.push(ControlUpdate::CameraAngle(new.camera_angle));
        }
        if old.fov != new.fov {
            updates.push(ControlUpdate::Fov(new.fov));
        }
        if old.camera_rotation != new.camera_rotation {
            updates.push(ControlUpdate::CameraRotation(new.camera_rotation));
        }
        if old.camera_height != new.camera_height {
            updates.push(ControlUpdate::CameraHeight(new.camera_height));
        }
        if old.lighting != new.lighting {
            updates.push(ControlUpdate::Lighting(new.lighting));
        }
        if old.color_palette != new.color_palette {
            updates.push(ControlUpdate::ColorPalette(new.color_palette));
        }
        updates
    }

    /// Applies the proposal through the store's setters. Returns how many
    /// setters reported a change.
    pub fn apply_to(&self, store: &mut ConfigStore) -> usize {
        let mut changed = 0;
        for update in self.updates(store.configuration()) {
            if store.apply(update) {
                changed += 1;
            }
        }
        if store.set_reference_image(self.new_spec.reference_image.clone()) {
            changed += 1;
        }
        changed
    }
}

/// Mock agent: proposes a patch for `request` without contacting a model.
pub fn propose_patch(request: &AgentPatchRequest) -> Result<AgentPatchResponse> {
    let instruction = request.instruction.trim();
    if instruction.is_empty() {
        return Err(DirectorsChairError::msg("agent instruction must not be empty"));
    }
    tracing::info!(instruction, "mocking agent patch");

    let mut new_spec = request.current.clone();
    let patch_summary = if new_spec.controls.lighting != DRAMATIC_LIGHTING {
        new_spec.controls.lighting = DRAMATIC_LIGHTING;
        format!(
            "Mock: The lighting style was changed to {}.",
            DRAMATIC_LIGHTING.label()
        )
    } else {
        "Mock: No changes were needed based on the instruction.".to_string()
    };

    Ok(AgentPatchResponse {
        new_spec,
        patch_summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::CameraAngle;

    #[test]
    fn switches_lighting_to_the_dramatic_style() {
        let mut current = SceneConfiguration::default();
        current.controls.camera_angle = CameraAngle::Side;
        let request = AgentPatchRequest::new(current.clone(), "make it more dramatic");

        let response = propose_patch(&request).unwrap();
        assert_eq!(response.new_spec.controls.lighting, Lighting::CinematicWarm);
        assert_eq!(response.new_spec.controls.camera_angle, CameraAngle::Side);
        assert_eq!(
            response.patch_summary,
            "Mock: The lighting style was changed to cinematic warm."
        );
        assert_eq!(
            response.updates(&current),
            vec![ControlUpdate::Lighting(Lighting::CinematicWarm)]
        );
        assert_eq!(request.current, current);
    }

    #[test]
    fn reports_no_change_when_already_dramatic() {
        let mut current = SceneConfiguration::default();
        current.controls.lighting = Lighting::CinematicWarm;

        let response = propose_patch(&AgentPatchRequest::new(current.clone(), "darker")).unwrap();
        assert_eq!(response.new_spec, current);
        assert_eq!(
            response.patch_summary,
            "Mock: No changes were needed based on the instruction."
        );
        assert!(response.updates(&current).is_empty());
    }

    #[test]
    fn applying_goes_through_the_store_setters() {
        let mut store = ConfigStore::new();
        let request = AgentPatchRequest::new(store.configuration().clone(), "moodier");
        let response = propose_patch(&request).unwrap();

        assert_eq!(response.apply_to(&mut store), 1);
        assert_eq!(store.controls().lighting, Lighting::CinematicWarm);
        assert_eq!(store.revision(), 1);

        assert_eq!(response.apply_to(&mut store), 0);
        assert_eq!(store.revision(), 1);
    }

    #[test]
    fn blank_instructions_are_rejected() {
        let request = AgentPatchRequest::new(SceneConfiguration::default(), "   ");
        assert!(propose_patch(&request).is_err());
    }
}
