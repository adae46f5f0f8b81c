//! Text overlay: frame rate, camera pose, sky colors, mouse position and the
//! terrain's render counts.
//!
//! Each sentence owns a glyph mesh sized for its maximum length. Text is
//! rebuilt in place every frame with [`RenderDevice::write_mesh`], so a
//! sentence that outgrows its capacity is reported instead of reallocated.

use glam::Vec4;
use thiserror::Error;
use tracing::{debug, warn};

use maptool_render::{
    CameraPose, DeviceError, MeshDesc, MeshHandle, RenderDevice, SceneMatrices, ShaderDispatcher,
    ShaderError, VertexData, VertexPositionUv,
};
use maptool_terrain::RenderStats;

const GLYPH_WIDTH: f32 = 8.0;
const GLYPH_HEIGHT: f32 = 16.0;
const LINE_SPACING: f32 = 20.0;
const MARGIN: f32 = 10.0;
/// Glyph atlas is a 16x16 grid of ASCII cells.
const ATLAS_COLUMNS: u32 = 16;

const TEXT_COLOR: Vec4 = Vec4::ONE;

const BLANK_GLYPH_VERTEX: VertexPositionUv = VertexPositionUv {
    position: [0.0; 3],
    uv: [0.0; 2],
};

#[derive(Debug, Error)]
pub enum UiError {
    #[error("{sentence:?} text is {length} characters, capacity is {max_length}")]
    SentenceTooLong {
        sentence: Sentence,
        length: usize,
        max_length: usize,
    },

    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error(transparent)]
    Shader(#[from] ShaderError),
}

/// Lines of the overlay, top to bottom.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sentence {
    Fps,
    Position,
    Rotation,
    ApexColor,
    CenterColor,
    Mouse,
    RenderCount,
    CellsDrawn,
    CellsCulled,
}

impl Sentence {
    pub const ALL: [Sentence; 9] = [
        Sentence::Fps,
        Sentence::Position,
        Sentence::Rotation,
        Sentence::ApexColor,
        Sentence::CenterColor,
        Sentence::Mouse,
        Sentence::RenderCount,
        Sentence::CellsDrawn,
        Sentence::CellsCulled,
    ];

    /// Capacity in characters.
    pub fn max_length(self) -> usize {
        match self {
            Sentence::Fps => 16,
            Sentence::Position | Sentence::Rotation => 48,
            Sentence::ApexColor | Sentence::CenterColor => 40,
            Sentence::Mouse
            | Sentence::RenderCount
            | Sentence::CellsDrawn
            | Sentence::CellsCulled => 32,
        }
    }

    fn line(self) -> usize {
        self as usize
    }
}

/// Per-frame values shown by [`UiOverlay::frame`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayFrame {
    pub fps: u32,
    pub pose: CameraPose,
    pub apex_color: Vec4,
    pub center_color: Vec4,
    pub mouse: Option<(i32, i32)>,
}

#[derive(Debug)]
struct Line {
    mesh: MeshHandle,
    text: String,
    color: Vec4,
    index_count: u32,
}

#[derive(Debug)]
pub struct UiOverlay {
    width: u32,
    height: u32,
    lines: Vec<Line>,
}

impl UiOverlay {
    /// Allocate one glyph mesh per sentence for a `width` x `height` screen.
    pub fn new(device: &mut dyn RenderDevice, width: u32, height: u32) -> Result<Self, UiError> {
        let mut overlay = Self {
            width,
            height,
            lines: Vec::with_capacity(Sentence::ALL.len()),
        };
        for sentence in Sentence::ALL {
            let blank = vec![BLANK_GLYPH_VERTEX; sentence.max_length() * 4];
            let label = format!("ui {sentence:?}");
            let desc = MeshDesc::triangles(&label, VertexData::PositionUv(&blank), &[]);
            match device.create_mesh(&desc) {
                Ok(mesh) => overlay.lines.push(Line {
                    mesh,
                    text: String::new(),
                    color: TEXT_COLOR,
                    index_count: 0,
                }),
                Err(e) => {
                    overlay.release(device);
                    return Err(e.into());
                }
            }
        }
        debug!(sentences = overlay.lines.len(), "ui overlay built");
        Ok(overlay)
    }

    pub fn release(self, device: &mut dyn RenderDevice) {
        for line in &self.lines {
            if let Err(e) = device.release_mesh(line.mesh) {
                warn!("failed to release ui sentence: {e}");
            }
        }
    }

    /// Refresh the camera, sky, mouse and frame-rate lines.
    pub fn frame(
        &mut self,
        device: &mut dyn RenderDevice,
        values: &OverlayFrame,
    ) -> Result<(), UiError> {
        let p = values.pose.position;
        let r = values.pose.rotation;
        let a = values.apex_color;
        let c = values.center_color;
        let mouse = match values.mouse {
            Some((x, y)) => format!("Mouse: {x}, {y}"),
            None => "Mouse: -".to_string(),
        };

        let fps = format!("Fps: {}", values.fps);
        self.set_text(device, Sentence::Fps, &fps, fps_color(values.fps))?;
        self.set_text(
            device,
            Sentence::Position,
            &format!("X: {:.2}  Y: {:.2}  Z: {:.2}", p.x, p.y, p.z),
            TEXT_COLOR,
        )?;
        self.set_text(
            device,
            Sentence::Rotation,
            &format!("rX: {:.2}  rY: {:.2}  rZ: {:.2}", r.x, r.y, r.z),
            TEXT_COLOR,
        )?;
        self.set_text(
            device,
            Sentence::ApexColor,
            &format!("Apex: {:.2} {:.2} {:.2}", a.x, a.y, a.z),
            TEXT_COLOR,
        )?;
        self.set_text(
            device,
            Sentence::CenterColor,
            &format!("Center: {:.2} {:.2} {:.2}", c.x, c.y, c.z),
            TEXT_COLOR,
        )?;
        self.set_text(device, Sentence::Mouse, &mouse, TEXT_COLOR)
    }

    /// Refresh the terrain culling lines.
    pub fn update_render_counts(
        &mut self,
        device: &mut dyn RenderDevice,
        stats: RenderStats,
    ) -> Result<(), UiError> {
        let lines = [
            (Sentence::RenderCount, "Render Count", stats.render_count),
            (Sentence::CellsDrawn, "Cells Drawn", stats.cells_drawn),
            (Sentence::CellsCulled, "Cells Culled", stats.cells_culled),
        ];
        for (sentence, name, count) in lines {
            self.set_text(device, sentence, &format!("{name}: {count}"), TEXT_COLOR)?;
        }
        Ok(())
    }

    /// One font draw per non-empty sentence.
    pub fn render(
        &self,
        device: &mut dyn RenderDevice,
        shaders: &mut dyn ShaderDispatcher,
        matrices: &SceneMatrices,
    ) -> Result<(), UiError> {
        for line in self.lines.iter().filter(|l| l.index_count > 0) {
            device.bind_mesh(line.mesh)?;
            shaders.render_font(line.index_count, matrices, line.color)?;
        }
        Ok(())
    }

    pub fn text(&self, sentence: Sentence) -> &str {
        self.lines.get(sentence.line()).map_or("", |l| l.text.as_str())
    }

    pub fn color(&self, sentence: Sentence) -> Vec4 {
        self.lines.get(sentence.line()).map_or(TEXT_COLOR, |l| l.color)
    }

    fn set_text(
        &mut self,
        device: &mut dyn RenderDevice,
        sentence: Sentence,
        text: &str,
        color: Vec4,
    ) -> Result<(), UiError> {
        let length = text.chars().count();
        if length > sentence.max_length() {
            return Err(UiError::SentenceTooLong {
                sentence,
                length,
                max_length: sentence.max_length(),
            });
        }
        let (vertices, indices) = self.glyph_quads(sentence, text);
        let Some(line) = self.lines.get_mut(sentence.line()) else {
            return Ok(());
        };
        if line.text != text {
            device.write_mesh(
                line.mesh,
                &MeshDesc::triangles("ui sentence", VertexData::PositionUv(&vertices), &indices),
            )?;
            line.text = text.to_string();
            line.index_count = indices.len() as u32;
        }
        line.color = color;
        Ok(())
    }

    /// Screen-space quads in the ortho frame, origin at the screen center.
    fn glyph_quads(&self, sentence: Sentence, text: &str) -> (Vec<VertexPositionUv>, Vec<u32>) {
        let left = -(self.width as f32) / 2.0 + MARGIN;
        let top = self.height as f32 / 2.0 - MARGIN - sentence.line() as f32 * LINE_SPACING;
        let cell = 1.0 / ATLAS_COLUMNS as f32;

        let mut vertices = Vec::with_capacity(text.len() * 4);
        let mut indices = Vec::with_capacity(text.len() * 6);
        for (i, ch) in text.chars().enumerate() {
            let code = if ch.is_ascii_graphic() || ch == ' ' { ch as u32 } else { '?' as u32 };
            let u = (code % ATLAS_COLUMNS) as f32 * cell;
            let v = (code / ATLAS_COLUMNS) as f32 * cell;
            let x0 = left + i as f32 * GLYPH_WIDTH;
            let x1 = x0 + GLYPH_WIDTH;
            let y0 = top;
            let y1 = top - GLYPH_HEIGHT;

            let base = vertices.len() as u32;
            vertices.extend_from_slice(&[
                VertexPositionUv { position: [x0, y0, 0.0], uv: [u, v] },
                VertexPositionUv { position: [x1, y0, 0.0], uv: [u + cell, v] },
                VertexPositionUv { position: [x0, y1, 0.0], uv: [u, v + cell] },
                VertexPositionUv { position: [x1, y1, 0.0], uv: [u + cell, v + cell] },
            ]);
            indices.extend_from_slice(&[base, base + 2, base + 1, base + 1, base + 2, base + 3]);
        }
        (vertices, indices)
    }
}

/// Green at 60 fps and above, yellow from 30, red below.
fn fps_color(fps: u32) -> Vec4 {
    match fps {
        60.. => Vec4::new(0.0, 1.0, 0.0, 1.0),
        30..=59 => Vec4::new(1.0, 1.0, 0.0, 1.0),
        _ => Vec4::new(1.0, 0.0, 0.0, 1.0),
    }
}
