// ABOUTME: The glitch overlay: terminal layers composited through a scene pass and the glitch effect.
// ABOUTME: Built once from an opened element's canvases; renders to a mount target window.

use std::sync::Arc;
use std::time::Duration;

use glitch_core::{Canvas, GlitchProfile, LayerRole};
use winit::window::Window;

use crate::bridge::{build_scene, place_layers};
use crate::camera::OrthographicCamera;
use crate::composer::EffectComposer;
use crate::gpu::GpuState;
use crate::passes::{BlendFunction, Effect, EffectPass, RenderPass};
use crate::texture::{DirtyFlag, GpuTexture, LayerTexture};
use crate::uniforms::{ParamRegistry, Uniform, TIME};
use crate::RenderError;

/// Name of the glitch effect in the pass list
pub const GLITCH_EFFECT: &str = "filmShader";

const GLITCH_SHADER: &str = include_str!("../../../shaders/glitch.wgsl");

pub struct GlitchOverlay {
    gpu: GpuState,
    layers: Vec<LayerTexture<GpuTexture>>,
    composer: EffectComposer,
    registry: ParamRegistry,
}

impl GlitchOverlay {
    /// The surface is sized once to the canvases, which already carry the device scale
    pub async fn new(
        target: Arc<Window>,
        canvases: &[Canvas],
        profile: &GlitchProfile,
    ) -> Result<Self, RenderError> {
        let placements = place_layers(canvases, profile.layer_order)?;
        let size = canvases
            .first()
            .map(Canvas::size)
            .ok_or(RenderError::NoCanvases)?;

        let gpu = GpuState::new(target, size).await?;

        let layers: Vec<LayerTexture<GpuTexture>> = canvases
            .iter()
            .map(|canvas| {
                LayerTexture::new(
                    canvas.role(),
                    GpuTexture::new(&gpu.device, canvas.role(), canvas.size()),
                )
            })
            .collect();
        let views: Vec<&wgpu::TextureView> = layers.iter().map(|layer| layer.target().view()).collect();

        let scene = build_scene(&placements);
        let render_pass = RenderPass::new(
            &gpu.device,
            gpu.format(),
            gpu.size,
            scene,
            OrthographicCamera::overlay(),
            &views,
        );

        let glitch = Effect::new(GLITCH_EFFECT, GLITCH_SHADER, BlendFunction::Normal)
            .with_uniform("scaleFactor", Uniform::new(profile.low));
        let effect_pass = EffectPass::new(&gpu.device, gpu.format(), glitch)?;

        let mut composer = EffectComposer::new(&gpu);
        composer.add_pass(Box::new(render_pass));
        composer.add_pass(Box::new(effect_pass));
        let registry = composer.registry();

        tracing::info!(
            "Glitch overlay ready: {} layers, {}x{}",
            layers.len(),
            gpu.size.0,
            gpu.size.1
        );

        Ok(Self {
            gpu,
            layers,
            composer,
            registry,
        })
    }

    pub fn registry(&self) -> &ParamRegistry {
        &self.registry
    }

    pub fn size(&self) -> (u32, u32) {
        self.gpu.size
    }

    /// Dirty flags the refresh bridge marks, one per layer
    pub fn dirty_flags(&self) -> Vec<(LayerRole, DirtyFlag)> {
        self.layers
            .iter()
            .map(|layer| (layer.role(), layer.dirty_flag()))
            .collect()
    }

    /// Upload every dirty layer from its canvas. Returns how many were uploaded.
    pub fn sync_textures(&mut self, canvases: &[Canvas]) -> usize {
        let mut uploaded = 0;
        for (layer, canvas) in self.layers.iter_mut().zip(canvases) {
            if layer.sync(&self.gpu.queue, canvas) {
                uploaded += 1;
            }
        }
        uploaded
    }

    /// Render one frame with `time` written to every time uniform
    pub fn render(&mut self, time: f32, delta: Duration) -> Result<(), RenderError> {
        self.registry.set(TIME, time);
        self.composer.render(&self.gpu, delta)
    }
}
