//! Geometric value types

use crate::error::{EntdefError, Result};
use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// A 2D vector used for positions, sizes and pivots
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };
    pub const ONE: Self = Self { x: 1.0, y: 1.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, scalar: f32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }
}

/// Normalized texture sub-region.
///
/// Stored exactly as given: construction never clamps or reorders, so a
/// rectangle with `u_min > u_max` (a mirrored sample) survives a round-trip
/// unchanged. Use [`UvRect::is_normalized`] to check whether the region lies
/// inside the unit square with ordered edges.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct UvRect {
    pub u_min: f32,
    pub v_min: f32,
    pub u_max: f32,
    pub v_max: f32,
}

impl Default for UvRect {
    fn default() -> Self {
        Self::FULL
    }
}

impl UvRect {
    /// The whole texture
    pub const FULL: Self = Self {
        u_min: 0.0,
        v_min: 0.0,
        u_max: 1.0,
        v_max: 1.0,
    };

    pub const fn new(u_min: f32, v_min: f32, u_max: f32, v_max: f32) -> Self {
        Self {
            u_min,
            v_min,
            u_max,
            v_max,
        }
    }

    /// Build from an origin plus extent, the layout older files used
    pub fn from_origin_size(u: f32, v: f32, width: f32, height: f32) -> Self {
        Self::new(u, v, u + width, v + height)
    }

    pub fn width(&self) -> f32 {
        self.u_max - self.u_min
    }

    pub fn height(&self) -> f32 {
        self.v_max - self.v_min
    }

    pub fn is_finite(&self) -> bool {
        self.u_min.is_finite()
            && self.v_min.is_finite()
            && self.u_max.is_finite()
            && self.v_max.is_finite()
    }

    /// Edges ordered and every component inside [0, 1]
    pub fn is_normalized(&self) -> bool {
        let unit = |c: f32| (0.0..=1.0).contains(&c);
        self.u_min <= self.u_max
            && self.v_min <= self.v_max
            && unit(self.u_min)
            && unit(self.v_min)
            && unit(self.u_max)
            && unit(self.v_max)
    }

    /// Convert to pixel coordinates `(x, y, width, height)` for a texture of the given size
    pub fn to_pixels(&self, texture_width: u32, texture_height: u32) -> (i32, i32, i32, i32) {
        let tw = texture_width as f32;
        let th = texture_height as f32;
        (
            (self.u_min * tw) as i32,
            (self.v_min * th) as i32,
            (self.width() * tw) as i32,
            (self.height() * th) as i32,
        )
    }
}

/// Integer-precision rectangle used for hitbox bounds.
///
/// Width and height are always strictly positive, and the far edges always
/// fit in an `i32`, when built through [`PixelRect::new`] or
/// [`PixelRect::from_f32`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl PixelRect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Result<Self> {
        let rect = Self {
            x,
            y,
            width,
            height,
        };
        rect.validate()?;
        Ok(rect)
    }

    /// Build from editor coordinates, rejecting anything that is not a whole pixel
    pub fn from_f32(x: f32, y: f32, width: f32, height: f32) -> Result<Self> {
        let x = whole_pixel("x", x)?;
        let y = whole_pixel("y", y)?;
        let width = whole_pixel("width", width)?;
        let height = whole_pixel("height", height)?;
        Self::new(x, y, width, height)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width <= 0 || self.height <= 0 {
            return Err(EntdefError::InvalidBounds(format!(
                "size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.x.checked_add(self.width).is_none() || self.y.checked_add(self.height).is_none() {
            return Err(EntdefError::InvalidBounds(format!(
                "rectangle at ({}, {}) size {}x{} extends past the pixel range",
                self.x, self.y, self.width, self.height
            )));
        }
        Ok(())
    }

    /// Move without resizing, rejecting a position whose far edge would overflow
    pub fn moved_to(&self, x: i32, y: i32) -> Result<Self> {
        Self::new(x, y, self.width, self.height)
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }
}

fn whole_pixel(field: &str, value: f32) -> Result<i32> {
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(EntdefError::InvalidBounds(format!(
            "{} must be a whole pixel, got {}",
            field, value
        )));
    }
    // i32::MAX rounds up to 2^31 as f32, so the upper bound is exclusive
    if value < i32::MIN as f32 || value >= i32::MAX as f32 {
        return Err(EntdefError::InvalidBounds(format!(
            "{} out of range: {}",
            field, value
        )));
    }
    Ok(value as i32)
}
