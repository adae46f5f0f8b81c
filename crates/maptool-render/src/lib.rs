//! Rendering seam for the map tool: camera pose, view frustum, directional
//! light, mesh and uniform layouts, the device and shader traits the scene
//! drives each frame, and a headless implementation of both.

pub mod camera;
pub mod device;
pub mod frustum;
pub mod headless;
pub mod light;
pub mod mesh;
pub mod shader;
pub mod texture;

pub use camera::{Camera, CameraMotion, CameraPose, CameraSpeeds};
pub use device::{DeviceError, MeshHandle, RasterState, RenderDevice};
pub use frustum::{Aabb, Frustum};
pub use headless::{DrawCall, DrawKind, HeadlessDevice, RecordingShaders};
pub use light::{DirectionalLight, LightUniform, wrap_degrees};
pub use mesh::{
    MeshDesc, Topology, VertexData, VertexPositionColor, VertexPositionNormalUv, VertexPositionUv,
};
pub use shader::{MatrixUniform, SceneMatrices, ShaderDispatcher, ShaderError, SkyUniform};
pub use texture::{TextureCatalog, TextureError, TextureId, TextureLookup, TextureManager};
