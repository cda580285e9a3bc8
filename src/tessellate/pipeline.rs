use rand::Rng;

use crate::{
    foundation::{
        core::Point,
        error::{TraitforgeError, TraitforgeResult},
    },
    outline::{model::Outline, oracle::BoundaryOracle, polygon::OutlinePolygon},
    tessellate::{
        intersect::{ClippedCell, IntersectMode, OutlineRegion, intersect_cell},
        sites::{SiteOptions, sample_sites},
        voronoi::{Cell, voronoi_cells},
    },
};

/// Knobs for [`tessellate`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TessellateOptions {
    /// Site placement.
    pub sites: SiteOptions,
    /// Maximum edge length of the outline polygon.
    pub polygon_spacing: f64,
    /// Curve flattening tolerance; keep it below the clip tolerance.
    pub flatten_tolerance: f64,
    /// Exact pieces or masked whole cells.
    pub mode: IntersectMode,
}

impl Default for TessellateOptions {
    fn default() -> Self {
        Self {
            sites: SiteOptions::default(),
            polygon_spacing: 2.0,
            flatten_tolerance: 0.05,
            mode: IntersectMode::Exact,
        }
    }
}

/// Result of one tessellation: sites, raw cells and the pieces inside the outline.
#[derive(Clone, Debug)]
pub struct Tessellation {
    /// Placed sites.
    pub sites: Vec<Point>,
    /// One cell per site, bounded by the outline's bounding rectangle.
    pub cells: Vec<Cell>,
    /// Pieces inside the outline, in site order.
    pub clipped: Vec<ClippedCell>,
    /// Mode the pieces were produced with.
    pub mode: IntersectMode,
    /// Area of the outline polygon the cells were cut against.
    pub outline_area: f64,
}

impl Tessellation {
    /// Sum of piece areas.
    pub fn covered_area(&self) -> f64 {
        self.clipped.iter().map(ClippedCell::area).sum()
    }
}

#[tracing::instrument(skip(oracle, outline, opts, rng))]
/// Tessellate the interior of `outline` into about `site_count` cells.
///
/// Cells with no interior piece are skipped. Fails only when no site could be placed or every
/// cell came back empty.
pub fn tessellate<R: Rng>(
    oracle: &dyn BoundaryOracle,
    outline: &Outline,
    site_count: usize,
    opts: &TessellateOptions,
    rng: &mut R,
) -> TraitforgeResult<Tessellation> {
    if site_count == 0 {
        return Err(TraitforgeError::validation("site_count must be > 0"));
    }
    if !(opts.polygon_spacing.is_finite() && opts.polygon_spacing > 0.0) {
        return Err(TraitforgeError::validation("polygon_spacing must be > 0"));
    }

    let polygon = OutlinePolygon::from_outline(outline, opts.polygon_spacing, opts.flatten_tolerance);
    if polygon.rings().is_empty() {
        return Err(TraitforgeError::geometry("outline polygon has no rings"));
    }
    let sites = sample_sites(oracle, outline, &polygon, site_count, &opts.sites, rng);
    if sites.is_empty() {
        return Err(TraitforgeError::geometry("no interior site could be placed"));
    }

    let bounds = outline.bounds();
    let cells = voronoi_cells(&sites, bounds);
    let eps = bounds.width().max(bounds.height()) * 1e-7;

    let clipped: Vec<ClippedCell> = match opts.mode {
        IntersectMode::Exact => {
            let region = OutlineRegion::new(&polygon);
            cells
                .iter()
                .flat_map(|cell| intersect_cell(cell, &region, eps))
                .collect()
        }
        IntersectMode::MaskedApproximate => cells
            .iter()
            .filter(|cell| !cell.is_empty())
            .map(|cell| ClippedCell {
                site: cell.site,
                exterior: cell.polygon.clone(),
                holes: Vec::new(),
                approximate: true,
            })
            .collect(),
    };
    if clipped.is_empty() {
        return Err(TraitforgeError::geometry("every cell failed to intersect the outline"));
    }
    tracing::debug!(
        sites = sites.len(),
        pieces = clipped.len(),
        "tessellation complete"
    );

    Ok(Tessellation {
        sites,
        cells,
        clipped,
        mode: opts.mode,
        outline_area: polygon.area(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/tessellate/pipeline.rs"]
mod tests;
