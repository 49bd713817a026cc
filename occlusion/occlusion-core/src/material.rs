//! Surface appearance for occlusion and outline meshes.

bitflags::bitflags! {
    /// Color channels a material writes. Empty means depth-only.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ColorWriteMask: u8 {
        const RED = 1 << 0;
        const GREEN = 1 << 1;
        const BLUE = 1 << 2;
        const ALPHA = 1 << 3;
    }
}

impl Default for ColorWriteMask {
    fn default() -> Self {
        Self::all()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LightingModel {
    /// Unshaded: the diffuse color is written as-is.
    Constant,
    #[default]
    Lambert,
}

/// Linear RGBA color, components in [0, 1].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::WHITE
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Material {
    pub color_write_mask: ColorWriteMask,
    pub lighting_model: LightingModel,
    pub diffuse: Rgba,
}

impl Material {
    /// Writes depth only; invisible but hides whatever is drawn behind it afterwards.
    pub fn depth_only() -> Self {
        Self {
            color_write_mask: ColorWriteMask::empty(),
            ..Self::default()
        }
    }

    pub fn constant(color: Rgba) -> Self {
        Self {
            color_write_mask: ColorWriteMask::all(),
            lighting_model: LightingModel::Constant,
            diffuse: color,
        }
    }

    pub fn writes_color(&self) -> bool {
        !self.color_write_mask.is_empty()
    }
}
