//! Traitforge generates layered vector-art traits and stacks them into one composite.
//!
//! Each named layer is produced by a [`TraitGenerator`] into a standalone SVG
//! [`LayerArtifact`]. Generators draw spirals clipped to an [`Outline`] or cut it into a Voronoi
//! mosaic. The [`Orchestrator`] runs the requested layers (optionally in parallel), isolates
//! failures, and orders the survivors by a fixed [`CanonicalOrder`].
//!
//! - Describe a run with a [`Recipe`]
//! - Resolve outlines through an [`OutlineSource`]
//! - Call [`Orchestrator::compose`] and write [`Composite::to_svg`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub(crate) mod compose;
pub(crate) mod curve;
pub(crate) mod foundation;
pub(crate) mod optimize;
pub(crate) mod outline;
pub(crate) mod recipe;
pub(crate) mod source;
pub(crate) mod tessellate;
pub(crate) mod traits;

pub use crate::foundation::color::Rgb8;
pub use crate::foundation::core::{BezPath, Canvas, FillRule, Point, Rect, Vec2};
pub use crate::foundation::error::{TraitforgeError, TraitforgeResult};
pub use crate::foundation::math::derive_seed;

pub use crate::outline::model::{Outline, OutlineDescriptor, Viewport};
pub use crate::outline::oracle::{
    BoundaryOracle, OracleKind, RasterOracle, WindingOracle, find_interior_point,
};
pub use crate::outline::polygon::{BoundarySample, OutlinePolygon};

pub use crate::curve::clip::{ClipOptions, Segment, clip};
pub use crate::curve::generator::{Curve, CurveKind, CurvePoint, generate as generate_curve};

pub use crate::tessellate::intersect::{ClippedCell, IntersectMode};
pub use crate::tessellate::pipeline::{TessellateOptions, Tessellation, tessellate};
pub use crate::tessellate::sites::{SiteOptions, sample_sites};
pub use crate::tessellate::voronoi::{Cell, voronoi_cells};

pub use crate::compose::artifact::{Composite, LayerArtifact, SvgDocument, svg_data_uri};
pub use crate::compose::orchestrator::{
    CancelToken, ComposeOpts, ComposeOutcome, ComposeReport, ComposeState, LayerReport,
    LayerStatus, Orchestrator,
};
pub use crate::compose::order::CanonicalOrder;

pub use crate::traits::mosaic::MosaicTrait;
pub use crate::traits::registry::{LayerContext, TraitGenerator, TraitRegistry};
pub use crate::traits::solid::{Shading, SolidTrait};
pub use crate::traits::spiral::SpiralTrait;

pub use crate::optimize::{
    Minifier, OptimizeSettings, OptimizeStatus, Optimized, OptimizerHandle, UsvgMinifier,
};
pub use crate::recipe::{LayerSpec, Recipe, RecipeBuilder};
pub use crate::source::{DirSource, InMemorySource, OutlineSource};
