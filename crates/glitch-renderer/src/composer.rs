// ABOUTME: Runs an ordered list of passes, ping-ponging between two offscreen targets.
// ABOUTME: The last pass draws straight to the surface; lost surfaces are reconfigured and skipped.

use std::time::Duration;

use crate::gpu::GpuState;
use crate::passes::{FrameContext, Pass};
use crate::uniforms::ParamRegistry;
use crate::RenderError;

struct RenderTarget {
    // Keeps the view's texture alive
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl RenderTarget {
    fn new(device: &wgpu::Device, format: wgpu::TextureFormat, size: (u32, u32), label: &str) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size.0.max(1),
                height: size.1.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}

/// Where pass `index` of `count` writes: a ping-pong slot, or `None` for the surface
pub fn output_slot(index: usize, count: usize) -> Option<usize> {
    if index + 1 == count {
        None
    } else {
        Some(index % 2)
    }
}

pub struct EffectComposer {
    passes: Vec<Box<dyn Pass>>,
    targets: [RenderTarget; 2],
    size: (u32, u32),
}

impl EffectComposer {
    pub fn new(gpu: &GpuState) -> Self {
        let format = gpu.format();
        Self {
            passes: Vec::new(),
            targets: [
                RenderTarget::new(&gpu.device, format, gpu.size, "Composer Target A"),
                RenderTarget::new(&gpu.device, format, gpu.size, "Composer Target B"),
            ],
            size: gpu.size,
        }
    }

    pub fn add_pass(&mut self, pass: Box<dyn Pass>) {
        tracing::debug!("Added pass {}", pass.name());
        self.passes.push(pass);
    }

    pub fn passes(&self) -> impl Iterator<Item = &dyn Pass> {
        self.passes.iter().map(|pass| pass.as_ref())
    }

    /// Index every pass's uniforms by name
    pub fn registry(&self) -> ParamRegistry {
        ParamRegistry::from_uniforms(self.passes.iter().flat_map(|pass| pass.uniforms()))
    }

    /// Run every pass once. `delta` is the clock time since the previous frame.
    pub fn render(&mut self, gpu: &GpuState, delta: Duration) -> Result<(), RenderError> {
        if self.passes.is_empty() {
            return Ok(());
        }

        let frame = match gpu.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::warn!("Surface lost, reconfiguring");
                gpu.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                tracing::warn!("Surface timeout, skipping frame");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        let surface_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Composer Encoder"),
            });

        {
            let mut ctx = FrameContext {
                device: &gpu.device,
                queue: &gpu.queue,
                encoder: &mut encoder,
                resolution: self.size,
                delta,
            };
            let count = self.passes.len();
            let mut input: Option<usize> = None;
            for (index, pass) in self.passes.iter_mut().enumerate() {
                let slot = output_slot(index, count);
                let output = match slot {
                    Some(slot) => &self.targets[slot].view,
                    None => &surface_view,
                };
                let input_view = input.map(|slot| &self.targets[slot].view);
                pass.render(&mut ctx, input_view, output);
                input = slot;
            }
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}
