//! Matrix plumbing between the orbit rig and the GPU scene.
//!
//! Everything here is pure math over plain arrays so it can be unit tested
//! off the browser. Matrices are column-major in the WGSL convention, f64 on
//! the CPU side and narrowed to f32 at the boundary.

use orbit::RotationState;

/// World-space radius of the globe mesh (the unit sphere is scaled by this).
pub const GLOBE_RADIUS: f64 = 100.0;
/// Cloud shell sits just above the surface.
pub const CLOUD_SHELL_SCALE: f64 = 1.02;
/// Atmosphere rim shell, drawn back-face only.
pub const ATMOS_SHELL_SCALE: f64 = 1.06;
/// Decorative cloud drift, independent of the orbit rig.
pub const CLOUD_DRIFT_RAD_PER_S: f64 = 0.012;

const FOV_Y_RAD: f64 = std::f64::consts::FRAC_PI_4;

pub fn vec3_sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub fn vec3_mul(a: [f64; 3], s: f64) -> [f64; 3] {
    [a[0] * s, a[1] * s, a[2] * s]
}

pub fn vec3_dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub fn vec3_cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

pub fn vec3_normalize(a: [f64; 3]) -> [f64; 3] {
    let n = vec3_dot(a, a).sqrt();
    if n <= 0.0 {
        [0.0, 0.0, 0.0]
    } else {
        vec3_mul(a, 1.0 / n)
    }
}

pub fn mat4_mul(a: [[f32; 4]; 4], b: [[f32; 4]; 4]) -> [[f32; 4]; 4] {
    // Column-major matrix multiply: c = a * b
    let mut c = [[0.0f32; 4]; 4];
    for col in 0..4 {
        for row in 0..4 {
            c[col][row] = a[0][row] * b[col][0]
                + a[1][row] * b[col][1]
                + a[2][row] * b[col][2]
                + a[3][row] * b[col][3];
        }
    }
    c
}

pub fn mat4_scale_uniform(s: f64) -> [[f32; 4]; 4] {
    let s = s as f32;
    [
        [s, 0.0, 0.0, 0.0],
        [0.0, s, 0.0, 0.0],
        [0.0, 0.0, s, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

pub fn mat4_rot_x(angle_rad: f64) -> [[f32; 4]; 4] {
    let (sin, cos) = (angle_rad.sin() as f32, angle_rad.cos() as f32);
    [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, cos, sin, 0.0],
        [0.0, -sin, cos, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

pub fn mat4_rot_y(angle_rad: f64) -> [[f32; 4]; 4] {
    let (sin, cos) = (angle_rad.sin() as f32, angle_rad.cos() as f32);
    [
        [cos, 0.0, -sin, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [sin, 0.0, cos, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

pub fn mat4_perspective_rh_z0(fov_y_rad: f64, aspect: f64, near: f64, far: f64) -> [[f32; 4]; 4] {
    let f = 1.0 / (0.5 * fov_y_rad).tan();
    let m00 = (f / aspect) as f32;
    let m11 = f as f32;
    let m22 = (far / (near - far)) as f32;
    let m23 = ((near * far) / (near - far)) as f32;

    // Column-major (WGSL) perspective matrix, RH, depth range [0, 1].
    [
        [m00, 0.0, 0.0, 0.0],
        [0.0, m11, 0.0, 0.0],
        [0.0, 0.0, m22, -1.0],
        [0.0, 0.0, m23, 0.0],
    ]
}

pub fn mat4_look_at_rh(eye: [f64; 3], target: [f64; 3], up: [f64; 3]) -> [[f32; 4]; 4] {
    let f = vec3_normalize(vec3_sub(target, eye));
    let s = vec3_normalize(vec3_cross(f, up));
    let u = vec3_cross(s, f);

    let ex = -vec3_dot(s, eye);
    let ey = -vec3_dot(u, eye);
    let ez = vec3_dot(f, eye);

    // Column-major (WGSL) view matrix.
    [
        [s[0] as f32, s[1] as f32, s[2] as f32, 0.0],
        [u[0] as f32, u[1] as f32, u[2] as f32, 0.0],
        [(-f[0]) as f32, (-f[1]) as f32, (-f[2]) as f32, 0.0],
        [ex as f32, ey as f32, ez as f32, 1.0],
    ]
}

/// Per-frame matrix bundle consumed by the GPU layer.
#[derive(Debug, Clone, Copy)]
pub struct SceneMatrices {
    pub view_proj: [[f32; 4]; 4],
    pub surface_model: [[f32; 4]; 4],
    pub clouds_model: [[f32; 4]; 4],
    pub atmos_model: [[f32; 4]; 4],
    pub eye: [f32; 3],
    pub light_dir: [f32; 3],
}

/// Camera position for a given orbit distance. The camera never moves off
/// the +Z axis; all apparent rotation lives in the model matrices.
pub fn camera_eye(distance: f64) -> [f64; 3] {
    [0.0, 0.0, distance]
}

pub fn camera_view_proj(distance: f64, canvas_width: f64, canvas_height: f64) -> [[f32; 4]; 4] {
    let aspect = if canvas_height <= 0.0 {
        1.0
    } else {
        (canvas_width / canvas_height).max(1e-6)
    };
    let near = (distance * 0.01).max(1.0);
    let far = distance + GLOBE_RADIUS * 40.0;
    let view = mat4_look_at_rh(camera_eye(distance), [0.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
    let proj = mat4_perspective_rh_z0(FOV_Y_RAD, aspect, near, far);
    mat4_mul(proj, view)
}

/// Build the frame's matrices from the smoothed orbit state.
///
/// Tilt is applied after spin so dragging up and down always pivots around
/// the horizontal screen axis regardless of how far the globe has turned.
pub fn scene_matrices(
    rotation: &RotationState,
    distance: f64,
    cloud_angle_rad: f64,
    canvas_width: f64,
    canvas_height: f64,
) -> SceneMatrices {
    let tilt = mat4_rot_x(rotation.current.x);
    let spin = mat4_rot_y(rotation.current.y);
    let cloud_spin = mat4_rot_y(rotation.current.y + cloud_angle_rad);

    let surface_model = mat4_mul(tilt, mat4_mul(spin, mat4_scale_uniform(GLOBE_RADIUS)));
    let clouds_model = mat4_mul(
        tilt,
        mat4_mul(
            cloud_spin,
            mat4_scale_uniform(GLOBE_RADIUS * CLOUD_SHELL_SCALE),
        ),
    );
    let atmos_model = mat4_scale_uniform(GLOBE_RADIUS * ATMOS_SHELL_SCALE);

    let eye = camera_eye(distance);
    // Key light sits up and to the left of the camera, in world space.
    let light_dir = vec3_normalize([-0.55, 0.45, 0.85]);

    SceneMatrices {
        view_proj: camera_view_proj(distance, canvas_width, canvas_height),
        surface_model,
        clouds_model,
        atmos_model,
        eye: [eye[0] as f32, eye[1] as f32, eye[2] as f32],
        light_dir: [
            light_dir[0] as f32,
            light_dir[1] as f32,
            light_dir[2] as f32,
        ],
    }
}
