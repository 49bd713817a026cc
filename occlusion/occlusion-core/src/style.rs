//! Outline customization: the color and stroke width a host picks per surface.

use surface_api::TrackedSurface;

use crate::material::Rgba;
use crate::vecmath;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LengthUnit {
    Millimeters,
    Centimeters,
    Meters,
    Inches,
}

impl LengthUnit {
    fn meters_per_unit(self) -> f32 {
        match self {
            LengthUnit::Millimeters => 0.001,
            LengthUnit::Centimeters => 0.01,
            LengthUnit::Meters => 1.0,
            LengthUnit::Inches => 0.0254,
        }
    }
}

/// A length with its unit; tracking extents are always in meters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Length {
    pub value: f32,
    pub unit: LengthUnit,
}

impl Length {
    pub const fn new(value: f32, unit: LengthUnit) -> Self {
        Self { value, unit }
    }

    pub const fn millimeters(value: f32) -> Self {
        Self::new(value, LengthUnit::Millimeters)
    }

    pub const fn meters(value: f32) -> Self {
        Self::new(value, LengthUnit::Meters)
    }

    pub fn to_meters(self) -> f32 {
        self.value * self.unit.meters_per_unit()
    }
}

/// Per-surface outline appearance supplied by the host.
pub trait OutlineStyle {
    fn color_for_surface(&self, surface: &TrackedSurface) -> Rgba;
    fn width_for_surface(&self, surface: &TrackedSurface) -> Length;
}

/// Colors each surface by its normal (|up| as RGB) with a constant stroke.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrientationStyle {
    pub alpha: f32,
    pub stroke_width: Length,
}

impl Default for OrientationStyle {
    fn default() -> Self {
        Self { alpha: 0.8, stroke_width: Length::millimeters(5.0) }
    }
}

impl OutlineStyle for OrientationStyle {
    fn color_for_surface(&self, surface: &TrackedSurface) -> Rgba {
        let [r, g, b] = vecmath::abs3(vecmath::up(&surface.transform));
        Rgba::new(r, g, b, self.alpha)
    }

    fn width_for_surface(&self, _surface: &TrackedSurface) -> Length {
        self.stroke_width
    }
}

/// Style assembled from two callbacks.
pub struct StyleFn<C, W> {
    color: C,
    width: W,
}

impl<C, W> StyleFn<C, W>
where
    C: Fn(&TrackedSurface) -> Rgba,
    W: Fn(&TrackedSurface) -> Length,
{
    pub fn new(color: C, width: W) -> Self {
        Self { color, width }
    }
}

impl<C, W> OutlineStyle for StyleFn<C, W>
where
    C: Fn(&TrackedSurface) -> Rgba,
    W: Fn(&TrackedSurface) -> Length,
{
    fn color_for_surface(&self, surface: &TrackedSurface) -> Rgba {
        (self.color)(surface)
    }

    fn width_for_surface(&self, surface: &TrackedSurface) -> Length {
        (self.width)(surface)
    }
}
