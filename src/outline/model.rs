use std::{collections::BTreeMap, sync::Arc};

use kurbo::{PathEl, Shape as _};

use crate::foundation::{
    core::{BezPath, FillRule, Point, Rect},
    error::{TraitforgeError, TraitforgeResult},
};

/// Explicit bounding viewport carried by a descriptor (origin plus size).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width, must be > 0.
    pub width: f64,
    /// Height, must be > 0.
    pub height: f64,
}

impl Viewport {
    /// Viewport as a rectangle.
    pub fn to_rect(self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    fn validate(&self) -> TraitforgeResult<()> {
        let finite = [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite());
        if !finite || self.width <= 0.0 || self.height <= 0.0 {
            return Err(TraitforgeError::outline(
                "viewport must be finite with width/height > 0",
            ));
        }
        Ok(())
    }
}

/// Stored outline record: path data plus optional viewport and named variants.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OutlineDescriptor {
    /// SVG path data of the main outline.
    pub d: String,
    /// Explicit bounding viewport; the path bounds are used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Viewport>,
    /// Declared fill rule.
    #[serde(default)]
    pub fill_rule: FillRule,
    /// Named variant paths (`shadow`, `highlight`, ...) sharing the viewport and fill rule.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sub_paths: BTreeMap<String, String>,
}

impl OutlineDescriptor {
    /// Descriptor with just path data.
    pub fn new(d: impl Into<String>) -> Self {
        Self {
            d: d.into(),
            viewport: None,
            fill_rule: FillRule::default(),
            sub_paths: BTreeMap::new(),
        }
    }

    /// Set the explicit viewport.
    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = Some(viewport);
        self
    }

    /// Set the fill rule.
    pub fn with_fill_rule(mut self, fill_rule: FillRule) -> Self {
        self.fill_rule = fill_rule;
        self
    }

    /// Add a named variant path.
    pub fn with_sub_path(mut self, name: impl Into<String>, d: impl Into<String>) -> Self {
        self.sub_paths.insert(name.into(), d.into());
        self
    }

    /// Build the main outline.
    pub fn outline(&self) -> TraitforgeResult<Outline> {
        self.build(&self.d, "main")
    }

    /// Build a named variant outline, if present.
    pub fn sub_outline(&self, name: &str) -> TraitforgeResult<Option<Outline>> {
        self.sub_paths
            .get(name)
            .map(|d| self.build(d, name))
            .transpose()
    }

    fn build(&self, d: &str, label: &str) -> TraitforgeResult<Outline> {
        if d.trim().is_empty() {
            return Err(TraitforgeError::outline(format!(
                "path '{label}' has empty path data"
            )));
        }
        let path = BezPath::from_svg(d).map_err(|e| {
            TraitforgeError::outline(format!("path '{label}' failed to parse: {e}"))
        })?;
        let bounds = match self.viewport {
            Some(vp) => {
                vp.validate()?;
                Some(vp.to_rect())
            }
            None => None,
        };
        Outline::new(path, self.fill_rule, bounds)
    }
}

/// Immutable closed region: path, fill rule, and bounding rectangle.
///
/// Every subpath is closed on construction. The geometry is shared behind an `Arc`, so clones
/// are cheap and always describe the same region.
#[derive(Clone, Debug)]
pub struct Outline {
    path: Arc<BezPath>,
    fill_rule: FillRule,
    bounds: Rect,
}

impl Outline {
    /// Build an outline; `bounds` defaults to the path's bounding box.
    pub fn new(path: BezPath, fill_rule: FillRule, bounds: Option<Rect>) -> TraitforgeResult<Self> {
        let path = close_subpaths(&path);
        if path.segments().next().is_none() {
            return Err(TraitforgeError::outline("outline path has no segments"));
        }
        let bounds = bounds.unwrap_or_else(|| path.bounding_box());
        let finite = [bounds.x0, bounds.y0, bounds.x1, bounds.y1]
            .iter()
            .all(|v| v.is_finite());
        if !finite || bounds.width() <= 0.0 || bounds.height() <= 0.0 {
            return Err(TraitforgeError::outline(
                "outline bounds must be finite with positive area",
            ));
        }
        Ok(Self {
            path: Arc::new(path),
            fill_rule,
            bounds,
        })
    }

    /// Parse SVG path data into an outline bounded by its own bounding box.
    pub fn from_svg_path(d: &str, fill_rule: FillRule) -> TraitforgeResult<Self> {
        OutlineDescriptor::new(d).with_fill_rule(fill_rule).outline()
    }

    /// Axis-aligned rectangle outline.
    pub fn rect(rect: Rect) -> TraitforgeResult<Self> {
        Self::new(rect.to_path(0.1), FillRule::NonZero, Some(rect))
    }

    /// Circle outline bounded by its enclosing square.
    pub fn circle(center: Point, radius: f64) -> TraitforgeResult<Self> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(TraitforgeError::outline("circle radius must be > 0"));
        }
        let circle = kurbo::Circle::new(center, radius);
        Self::new(
            circle.to_path(1e-3),
            FillRule::NonZero,
            Some(circle.bounding_box()),
        )
    }

    /// Closed outline path.
    pub fn path(&self) -> &BezPath {
        &self.path
    }

    /// Declared fill rule.
    pub fn fill_rule(&self) -> FillRule {
        self.fill_rule
    }

    /// Bounding rectangle.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Center of the bounding rectangle.
    pub fn center(&self) -> Point {
        self.bounds.center()
    }

    /// Whether `other` shares this outline's geometry allocation.
    pub fn same_geometry(&self, other: &Outline) -> bool {
        Arc::ptr_eq(&self.path, &other.path)
    }

    /// SVG path data for the closed outline.
    pub fn to_svg_path_d(&self) -> String {
        self.path.to_svg()
    }
}

fn close_subpaths(path: &BezPath) -> BezPath {
    let mut out = BezPath::new();
    let mut open = false;
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                if open {
                    out.close_path();
                }
                out.move_to(p);
                open = false;
            }
            PathEl::ClosePath => {
                out.close_path();
                open = false;
            }
            other => {
                out.push(other);
                open = true;
            }
        }
    }
    if open {
        out.close_path();
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/outline/model.rs"]
mod tests;
