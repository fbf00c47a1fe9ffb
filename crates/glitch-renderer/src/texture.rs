// ABOUTME: Layer textures that mirror terminal canvases on the GPU.
// ABOUTME: A shared dirty flag marks a layer stale; sync uploads it once and clears the flag.

use glitch_core::{Canvas, LayerRole};
use std::cell::Cell;
use std::rc::Rc;

/// Shared "needs update" bit for one layer texture
#[derive(Debug, Clone, Default)]
pub struct DirtyFlag(Rc<Cell<bool>>);

impl DirtyFlag {
    pub fn new(dirty: bool) -> Self {
        Self(Rc::new(Cell::new(dirty)))
    }

    pub fn mark(&self) {
        self.0.set(true);
    }

    pub fn is_dirty(&self) -> bool {
        self.0.get()
    }

    /// Clear the flag, returning whether it was set
    pub fn take(&self) -> bool {
        self.0.replace(false)
    }
}

/// Something a canvas can be uploaded into
pub trait TextureTarget {
    type Context;

    /// Returns false when the canvas could not be uploaded
    fn upload(&mut self, context: &Self::Context, canvas: &Canvas) -> bool;
}

pub struct LayerTexture<T> {
    role: LayerRole,
    target: T,
    dirty: DirtyFlag,
    uploads: u64,
}

impl<T: TextureTarget> LayerTexture<T> {
    /// Starts dirty so the first sync uploads the canvas
    pub fn new(role: LayerRole, target: T) -> Self {
        Self {
            role,
            target,
            dirty: DirtyFlag::new(true),
            uploads: 0,
        }
    }

    pub fn role(&self) -> LayerRole {
        self.role
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn dirty_flag(&self) -> DirtyFlag {
        self.dirty.clone()
    }

    pub fn uploads(&self) -> u64 {
        self.uploads
    }

    /// Upload `canvas` if the layer is dirty. Returns whether an upload happened.
    /// A rejected upload leaves the layer dirty.
    pub fn sync(&mut self, context: &T::Context, canvas: &Canvas) -> bool {
        if !self.dirty.is_dirty() || !self.target.upload(context, canvas) {
            return false;
        }
        self.dirty.take();
        self.uploads += 1;
        tracing::trace!("Uploaded {} layer", self.role.label());
        true
    }
}

/// RGBA8 sRGB texture sized to the canvases
pub struct GpuTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    size: (u32, u32),
}

impl GpuTexture {
    pub fn new(device: &wgpu::Device, role: LayerRole, size: (u32, u32)) -> Self {
        let label = format!("{} Layer Texture", role.label());
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&label),
            size: wgpu::Extent3d {
                width: size.0.max(1),
                height: size.1.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            size: (size.0.max(1), size.1.max(1)),
        }
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }
}

impl TextureTarget for GpuTexture {
    type Context = wgpu::Queue;

    fn upload(&mut self, queue: &wgpu::Queue, canvas: &Canvas) -> bool {
        if canvas.size() != self.size {
            tracing::warn!(
                "Skipping {} upload: canvas {:?} does not match texture {:?}",
                canvas.role().label(),
                canvas.size(),
                self.size
            );
            return false;
        }
        let (width, height) = self.size;
        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            canvas.pixels(),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingTarget {
        uploaded: Vec<u8>,
        rejecting: bool,
    }

    impl TextureTarget for RecordingTarget {
        type Context = ();

        fn upload(&mut self, _context: &(), canvas: &Canvas) -> bool {
            if self.rejecting {
                return false;
            }
            self.uploaded.push(canvas.pixel(0, 0)[0]);
            true
        }
    }

    fn canvas(red: f32) -> Canvas {
        let mut canvas = Canvas::new(LayerRole::Screen, 1, 1);
        canvas.fill([red, 0.0, 0.0, 1.0]);
        canvas
    }

    #[test]
    fn first_sync_uploads() {
        let mut layer = LayerTexture::new(LayerRole::Screen, RecordingTarget::default());
        assert!(layer.dirty_flag().is_dirty());
        assert!(layer.sync(&(), &canvas(1.0)));
        assert_eq!(layer.target().uploaded, vec![255]);
    }

    #[test]
    fn clean_layer_is_never_uploaded() {
        let mut layer = LayerTexture::new(LayerRole::Screen, RecordingTarget::default());
        layer.sync(&(), &canvas(1.0));

        assert!(!layer.sync(&(), &canvas(0.0)));
        assert!(!layer.sync(&(), &canvas(0.0)));
        assert_eq!(layer.uploads(), 1);
    }

    #[test]
    fn marking_dirty_uploads_exactly_once() {
        let mut layer = LayerTexture::new(LayerRole::Cursor, RecordingTarget::default());
        layer.sync(&(), &canvas(1.0));

        let flag = layer.dirty_flag();
        flag.mark();
        flag.mark();

        assert!(layer.sync(&(), &canvas(0.0)));
        assert!(!layer.sync(&(), &canvas(0.0)));
        assert_eq!(layer.target().uploaded, vec![255, 0]);
        assert!(!flag.is_dirty());
    }

    #[test]
    fn rejected_upload_stays_dirty_and_uncounted() {
        let target = RecordingTarget {
            rejecting: true,
            ..RecordingTarget::default()
        };
        let mut layer = LayerTexture::new(LayerRole::Link, target);

        assert!(!layer.sync(&(), &canvas(1.0)));
        assert!(layer.dirty_flag().is_dirty());
        assert_eq!(layer.uploads(), 0);

        layer.target.rejecting = false;
        assert!(layer.sync(&(), &canvas(1.0)));
        assert!(!layer.dirty_flag().is_dirty());
        assert_eq!(layer.uploads(), 1);
    }
}
