//! Vector/matrix helpers on plain arrays. Matrices are column-major `[f32; 16]`
//! (index `[col*4+row]`), matching what the backends upload.

pub type Vec2 = [f32; 2];
pub type Vec3 = [f32; 3];
pub type Vec4 = [f32; 4];
pub type Mat4 = [f32; 16];

pub use surface_api::IDENTITY_TRANSFORM as IDENTITY;

/// Drop y: (x, y, z) -> (x, z).
pub fn xz(v: Vec3) -> Vec2 {
    [v[0], v[2]]
}

/// Lift a horizontal (x, z) pair back to 3D with the given y.
pub fn from_xz(v: Vec2, y: f32) -> Vec3 {
    [v[0], y, v[1]]
}

pub fn xyz(v: Vec4) -> Vec3 {
    [v[0], v[1], v[2]]
}

pub fn extend(v: Vec3, w: f32) -> Vec4 {
    [v[0], v[1], v[2], w]
}

/// `max(lower, min(upper, v))`. Unlike `f32::clamp` this does not panic when `lower > upper`.
pub fn clamp(v: f32, lower: f32, upper: f32) -> f32 {
    lower.max(upper.min(v))
}

pub fn abs3(v: Vec3) -> Vec3 {
    [v[0].abs(), v[1].abs(), v[2].abs()]
}

pub fn scale3(v: Vec3, s: f32) -> Vec3 {
    [v[0] * s, v[1] * s, v[2] * s]
}

pub fn neg3(v: Vec3) -> Vec3 {
    [-v[0], -v[1], -v[2]]
}

pub fn column(m: &Mat4, col: usize) -> Vec4 {
    [m[col * 4], m[col * 4 + 1], m[col * 4 + 2], m[col * 4 + 3]]
}

/// Local +y basis vector (plane normal for an anchor transform).
pub fn up(m: &Mat4) -> Vec3 {
    xyz(column(m, 1))
}

pub fn translation(m: &Mat4) -> Vec3 {
    xyz(column(m, 3))
}

pub fn set_translation(m: &mut Mat4, t: Vec3) {
    m[12] = t[0];
    m[13] = t[1];
    m[14] = t[2];
}

/// Copy of `m` with only the translation replaced; rotation and scale are untouched.
pub fn translating(m: &Mat4, t: Vec3) -> Mat4 {
    let mut result = *m;
    set_translation(&mut result, t);
    result
}

/// `a * b` (b applied first).
pub fn mul(a: &Mat4, b: &Mat4) -> Mat4 {
    let mut out = [0.0f32; 16];
    for col in 0..4 {
        for row in 0..4 {
            let mut sum = 0.0;
            for k in 0..4 {
                sum += a[k * 4 + row] * b[col * 4 + k];
            }
            out[col * 4 + row] = sum;
        }
    }
    out
}

/// `m * (p, 1)`, returned homogeneous.
pub fn transform_point(m: &Mat4, p: Vec3) -> Vec4 {
    let mut out = [0.0f32; 4];
    for (row, o) in out.iter_mut().enumerate() {
        *o = m[row] * p[0] + m[4 + row] * p[1] + m[8 + row] * p[2] + m[12 + row];
    }
    out
}

/// Translation * non-uniform scale.
pub fn from_translation_scale(t: Vec3, s: Vec3) -> Mat4 {
    [
        s[0], 0.0, 0.0, 0.0, //
        0.0, s[1], 0.0, 0.0, //
        0.0, 0.0, s[2], 0.0, //
        t[0], t[1], t[2], 1.0,
    ]
}
