// ABOUTME: Scene graph for the overlay: textured unit planes stacked along z.
// ABOUTME: Pure data; the render pass turns it into GPU draws.

use bytemuck::{Pod, Zeroable};
use glitch_core::LayerRole;

use crate::camera::{translation, Mat4};

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
            wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Axis-aligned plane centered on the origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneGeometry {
    pub width: f32,
    pub height: f32,
}

impl PlaneGeometry {
    pub const INDICES: [u16; 6] = [0, 2, 1, 2, 3, 1];

    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Top-left, top-right, bottom-left, bottom-right. v = 0 is the top row of the texture.
    pub fn vertices(&self) -> [Vertex; 4] {
        let hw = self.width / 2.0;
        let hh = self.height / 2.0;
        [
            Vertex { position: [-hw, hh, 0.0], uv: [0.0, 0.0] },
            Vertex { position: [hw, hh, 0.0], uv: [1.0, 0.0] },
            Vertex { position: [-hw, -hh, 0.0], uv: [0.0, 1.0] },
            Vertex { position: [hw, -hh, 0.0], uv: [1.0, 1.0] },
        ]
    }
}

/// Unlit material sampling one layer texture
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub transparent: bool,
    pub opacity: f32,
    /// Index of the layer texture this material maps
    pub map: usize,
}

impl Material {
    pub fn transparent(map: usize) -> Self {
        Self {
            transparent: true,
            opacity: 1.0,
            map,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub role: LayerRole,
    pub geometry: PlaneGeometry,
    pub material: Material,
    pub position: [f32; 3],
}

impl Mesh {
    pub fn new(role: LayerRole, geometry: PlaneGeometry, material: Material) -> Self {
        Self {
            role,
            geometry,
            material,
            position: [0.0; 3],
        }
    }

    pub fn at_depth(mut self, z: f32) -> Self {
        self.position[2] = z;
        self
    }

    pub fn model_matrix(&self) -> Mat4 {
        // Geometry carries the plane's size, so the model matrix only places it
        let [x, y, z] = self.position;
        translation(x, y, z)
    }
}

#[derive(Debug, Default)]
pub struct Scene {
    meshes: Vec<Mesh>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, mesh: Mesh) {
        self.meshes.push(mesh);
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    /// Mesh indices back to front: farthest from a camera on +z first, ties in insertion order
    pub fn draw_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.meshes.len()).collect();
        order.sort_by(|&a, &b| {
            self.meshes[a].position[2].total_cmp(&self.meshes[b].position[2])
        });
        order
    }
}
