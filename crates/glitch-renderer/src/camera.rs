// ABOUTME: Orthographic camera and the small column-major matrix math it needs.
// ABOUTME: Clip depth follows wgpu's [0, 1] range.

/// Column-major 4x4 matrix, `m[column][row]`
pub type Mat4 = [[f32; 4]; 4];

pub const IDENTITY: Mat4 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

pub fn translation(x: f32, y: f32, z: f32) -> Mat4 {
    let mut m = IDENTITY;
    m[3] = [x, y, z, 1.0];
    m
}

pub fn scale(x: f32, y: f32, z: f32) -> Mat4 {
    let mut m = IDENTITY;
    m[0][0] = x;
    m[1][1] = y;
    m[2][2] = z;
    m
}

pub fn multiply(a: &Mat4, b: &Mat4) -> Mat4 {
    let mut out = [[0.0; 4]; 4];
    for (col, out_col) in out.iter_mut().enumerate() {
        for (row, value) in out_col.iter_mut().enumerate() {
            *value = (0..4).map(|k| a[k][row] * b[col][k]).sum();
        }
    }
    out
}

pub fn transform_point(m: &Mat4, p: [f32; 3]) -> [f32; 3] {
    let v = [p[0], p[1], p[2], 1.0];
    let mut out = [0.0; 4];
    for (row, value) in out.iter_mut().enumerate() {
        *value = (0..4).map(|k| m[k][row] * v[k]).sum();
    }
    [out[0] / out[3], out[1] / out[3], out[2] / out[3]]
}

/// Looks down -z from `position`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthographicCamera {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
}

impl OrthographicCamera {
    pub fn new(left: f32, right: f32, top: f32, bottom: f32, near: f32, far: f32) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
            near,
            far,
            position: [0.0, 0.0, 0.0],
        }
    }

    /// Unit frustum around the origin, seen from z = 400
    pub fn overlay() -> Self {
        let mut camera = Self::new(-0.5, 0.5, 0.5, -0.5, 1.0, 1000.0);
        camera.position[2] = 400.0;
        camera
    }

    pub fn projection(&self) -> Mat4 {
        let w = self.right - self.left;
        let h = self.top - self.bottom;
        let d = self.far - self.near;
        [
            [2.0 / w, 0.0, 0.0, 0.0],
            [0.0, 2.0 / h, 0.0, 0.0],
            [0.0, 0.0, -1.0 / d, 0.0],
            [
                -(self.right + self.left) / w,
                -(self.top + self.bottom) / h,
                -self.near / d,
                1.0,
            ],
        ]
    }

    pub fn view(&self) -> Mat4 {
        let [x, y, z] = self.position;
        translation(-x, -y, -z)
    }

    pub fn view_projection(&self) -> Mat4 {
        multiply(&self.projection(), &self.view())
    }
}
