//! The map tool's scene: sky dome, terrain, brush, picking and the text
//! overlay, driven one frame at a time by [`SceneOrchestrator`].

pub mod brush;
pub mod orchestrator;
pub mod picking;
pub mod sky_dome;
pub mod state;
pub mod ui;

pub use brush::{BRUSH_COLOR, Brush};
pub use orchestrator::{
    Component, FRAME_STAGES, FrameContext, FrameReport, FrameStage, RENDER_STAGES, RenderStage,
    SceneError, SceneOptions, SceneOrchestrator, Stage, SubsystemError,
};
pub use picking::{PickRay, PickingTool};
pub use sky_dome::{SKY_APEX_COLOR, SKY_CENTER_COLOR, SkyDome};
pub use state::{SceneState, ToggleSet};
pub use ui::{OverlayFrame, Sentence, UiError, UiOverlay};
