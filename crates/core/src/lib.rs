//! Core library for the Director's Chair scene configuration tool.
//!
//! The crate owns the camera/scene parameter set edited by the control panel
//! ([`ConfigStore`]), the staged render simulator that plays back the engine
//! log ([`RenderStage`], driven asynchronously by [`RenderSession`]) and the
//! generate action with its engine payload and in-memory history.

pub mod agent;
pub mod config;
pub mod controls;
pub mod error;
pub mod generate;
pub mod render;
pub mod schema;
pub mod session;
pub mod store;
pub mod timeline;
pub mod upload;

pub use agent::{propose_patch, AgentPatchRequest, AgentPatchResponse};
pub use config::{AppConfig, GenerateSettings, RenderTiming};
pub use controls::ControlUpdate;
pub use error::{DirectorsChairError, Result};
pub use generate::{
    FiboPayload, GenerateAction, GenerationHistory, GenerationRecord, GenerationStatus,
};
pub use render::{RenderSnapshot, RenderStage, RenderStatus, ShotRecord, StartOutcome};
pub use schema::{
    CameraAngle, CameraHeight, CameraRotation, ColorPalette, Controls, FieldOfView, Lighting,
    SceneConfiguration,
};
pub use session::RenderSession;
pub use store::{ConfigStore, SubscriptionId};
pub use timeline::{PlaybackClock, ScheduledEvent, Scheduler};
