use crate::foundation::error::{TraitforgeError, TraitforgeResult};

pub use kurbo::{BezPath, Point, Rect, Vec2};

/// Square drawing canvas shared by every layer artifact and the composite.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Edge length in user units (width == height).
    pub size: u32,
}

impl Canvas {
    /// Default edge length used by the built-in trait outlines.
    pub const DEFAULT_SIZE: u32 = 420;

    /// Build a canvas with a non-zero edge length.
    pub fn new(size: u32) -> TraitforgeResult<Self> {
        if size == 0 {
            return Err(TraitforgeError::validation("canvas size must be > 0"));
        }
        Ok(Self { size })
    }

    /// Canvas bounds as a rectangle anchored at the origin.
    pub fn rect(self) -> Rect {
        let s = f64::from(self.size);
        Rect::new(0.0, 0.0, s, s)
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            size: Self::DEFAULT_SIZE,
        }
    }
}

/// Fill rule declared by an outline; decides interior membership from a winding number.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum FillRule {
    /// Interior wherever the winding number is non-zero.
    #[default]
    NonZero,
    /// Interior wherever the winding number is odd.
    EvenOdd,
}

impl FillRule {
    /// Apply the rule to a winding number.
    pub fn is_inside(self, winding: i32) -> bool {
        match self {
            FillRule::NonZero => winding != 0,
            FillRule::EvenOdd => winding % 2 != 0,
        }
    }

    /// SVG `fill-rule` attribute value.
    pub fn svg_name(self) -> &'static str {
        match self {
            FillRule::NonZero => "nonzero",
            FillRule::EvenOdd => "evenodd",
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
