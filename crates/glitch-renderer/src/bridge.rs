// ABOUTME: Maps the terminal's canvases to scene depths and builds the overlay scene.
// ABOUTME: Fixed order expects (link, cursor, screen); z-index order sorts by the canvas z-index.

use glitch_core::{Canvas, LayerOrder, LayerRole};
use thiserror::Error;

use crate::scene::{Material, Mesh, PlaneGeometry, Scene};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BridgeError {
    #[error("expected 3 canvases (link, cursor, screen), got {0}")]
    CanvasCount(usize),

    #[error("canvas {index} is the {found} layer, expected {expected}")]
    UnexpectedRole {
        index: usize,
        found: &'static str,
        expected: &'static str,
    },
}

/// Where one canvas ends up in the scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerPlacement {
    /// Index into the canvas slice, also the texture index
    pub canvas: usize,
    pub role: LayerRole,
    pub depth: f32,
}

const FIXED_ROLES: [LayerRole; 3] = [LayerRole::Link, LayerRole::Cursor, LayerRole::Screen];

pub fn place_layers(canvases: &[Canvas], order: LayerOrder) -> Result<Vec<LayerPlacement>, BridgeError> {
    match order {
        LayerOrder::Fixed => place_fixed(canvases),
        LayerOrder::ZIndex => Ok(place_by_z_index(canvases)),
    }
}

fn place_fixed(canvases: &[Canvas]) -> Result<Vec<LayerPlacement>, BridgeError> {
    if canvases.len() != FIXED_ROLES.len() {
        return Err(BridgeError::CanvasCount(canvases.len()));
    }

    canvases
        .iter()
        .zip(FIXED_ROLES)
        .enumerate()
        .map(|(index, (canvas, expected))| {
            if canvas.role() != expected {
                return Err(BridgeError::UnexpectedRole {
                    index,
                    found: canvas.role().label(),
                    expected: expected.label(),
                });
            }
            // link 2, cursor 1, screen 0
            let depth = (FIXED_ROLES.len() - 1 - index) as f32;
            Ok(LayerPlacement {
                canvas: index,
                role: expected,
                depth,
            })
        })
        .collect()
}

fn place_by_z_index(canvases: &[Canvas]) -> Vec<LayerPlacement> {
    let mut indices: Vec<usize> = (0..canvases.len()).collect();
    // sort_by_key is stable, so equal z-indices keep element order
    indices.sort_by_key(|&i| canvases[i].z_index().unwrap_or(0));

    indices
        .into_iter()
        .enumerate()
        .map(|(depth, canvas)| LayerPlacement {
            canvas,
            role: canvases[canvas].role(),
            depth: depth as f32,
        })
        .collect()
}

/// One unit plane per placement with a transparent material mapping its texture
pub fn build_scene(placements: &[LayerPlacement]) -> Scene {
    let plane = PlaneGeometry::new(1.0, 1.0);
    let mut scene = Scene::new();
    for placement in placements {
        scene.add(
            Mesh::new(placement.role, plane, Material::transparent(placement.canvas))
                .at_depth(placement.depth),
        );
    }
    scene
}
