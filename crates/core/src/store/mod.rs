//! Owner of the live [`SceneConfiguration`].
//!
//! Each setter short-circuits when the new value equals the current one, so
//! subscribers only ever hear about real changes. Control edits swap the whole
//! [`Controls`] record in one assignment and readers never observe a partially
//! applied update.

use std::fmt;

use crate::{
    controls::ControlUpdate,
    schema::{
        CameraAngle, CameraHeight, CameraRotation, ColorPalette, Controls, FieldOfView, Lighting,
        SceneConfiguration,
    },
};

type Listener = Box<dyn FnMut(&SceneConfiguration) + Send>;

/// Handle returned by [`ConfigStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
pub struct ConfigStore {
    config: SceneConfiguration,
    revision: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing configuration, e.g. one loaded from JSON.
    pub fn with_configuration(config: SceneConfiguration) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn configuration(&self) -> &SceneConfiguration {
        &self.config
    }

    pub fn controls(&self) -> &Controls {
        &self.config.controls
    }

    pub fn reference_image(&self) -> Option<&str> {
        self.config.reference_image.as_deref()
    }

    /// Number of state changes applied so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Registers a callback invoked with the new configuration after every
    /// effective change.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&SceneConfiguration) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    pub fn set_camera_angle(&mut self, camera_angle: CameraAngle) -> bool {
        self.update_controls(|c| c.camera_angle = camera_angle)
    }

    pub fn set_field_of_view(&mut self, fov: FieldOfView) -> bool {
        self.update_controls(|c| c.fov = fov)
    }

    pub fn set_camera_rotation(&mut self, camera_rotation: CameraRotation) -> bool {
        self.update_controls(|c| c.camera_rotation = camera_rotation)
    }

    pub fn set_camera_height(&mut self, camera_height: CameraHeight) -> bool {
        self.update_controls(|c| c.camera_height = camera_height)
    }

    pub fn set_lighting(&mut self, lighting: Lighting) -> bool {
        self.update_controls(|c| c.lighting = lighting)
    }

    pub fn set_color_palette(&mut self, color_palette: ColorPalette) -> bool {
        self.update_controls(|c| c.color_palette = color_palette)
    }

    /// Stores an encoded reference image, or clears it with `None`.
    pub fn set_reference_image(&mut self, image: Option<String>) -> bool {
        if self.config.reference_image == image {
            return false;
        }
        self.config.reference_image = image;
        self.commit("reference_image");
        true
    }

    /// Routes a widget edit to the matching setter.
    pub fn apply(&mut self, update: ControlUpdate) -> bool {
        match update {
            ControlUpdate::CameraAngle(v) => self.set_camera_angle(v),
            ControlUpdate::Fov(v) => self.set_field_of_view(v),
            ControlUpdate::CameraRotation(v) => self.set_camera_rotation(v),
            ControlUpdate::CameraHeight(v) => self.set_camera_height(v),
            ControlUpdate::Lighting(v) => self.set_lighting(v),
            ControlUpdate::ColorPalette(v) => self.set_color_palette(v),
        }
    }

    /// Restores the start-up defaults.
    pub fn reset(&mut self) -> bool {
        let defaults = SceneConfiguration::default();
        if self.config == defaults {
            return false;
        }
        self.config = defaults;
        self.commit("reset");
        true
    }

    fn update_controls(&mut self, edit: impl FnOnce(&mut Controls)) -> bool {
        let mut next = self.config.controls;
        edit(&mut next);
        if next == self.config.controls {
            return false;
        }
        self.config.controls = next;
        self.commit("controls");
        true
    }

    fn commit(&mut self, what: &'static str) {
        self.revision += 1;
        tracing::debug!(what, revision = self.revision, "scene configuration changed");
        for (_, listener) in &mut self.listeners {
            listener(&self.config);
        }
    }
}

impl fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigStore")
            .field("config", &self.config)
            .field("revision", &self.revision)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
