// ABOUTME: Composites the terminal's layer canvases through a glitch post-processing pipeline.
// ABOUTME: Scene graph, textures, passes and composer on wgpu, plus frame pacing and glitch ramps.

pub mod bridge;
pub mod camera;
pub mod clock;
pub mod composer;
pub mod driver;
pub mod glitch;
mod gpu;
pub mod overlay;
pub mod passes;
pub mod refresh;
pub mod scene;
pub mod texture;
pub mod uniforms;

pub use bridge::{BridgeError, LayerPlacement};
pub use camera::OrthographicCamera;
pub use clock::Clock;
pub use composer::EffectComposer;
pub use driver::{AnimationDriver, DriverState, Frame};
pub use glitch::{GlitchController, Ramp};
pub use gpu::GpuState;
pub use overlay::GlitchOverlay;
pub use passes::{BlendFunction, Effect, EffectPass, Pass, RenderPass};
pub use refresh::{RefreshBridge, RefreshTrigger};
pub use scene::{Material, Mesh, PlaneGeometry, Scene};
pub use texture::{DirtyFlag, LayerTexture};
pub use uniforms::{ParamRegistry, Uniform};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no compatible GPU adapter")]
    NoAdapter,

    #[error("surface reports no texture formats")]
    NoSurfaceFormat,

    #[error("no canvases to composite")]
    NoCanvases,

    #[error("effect {effect} has {count} uniforms, at most 4 fit")]
    TooManyUniforms { effect: String, count: usize },

    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("failed to request device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("failed to acquire frame: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    #[error(transparent)]
    Bridge(#[from] BridgeError),
}
