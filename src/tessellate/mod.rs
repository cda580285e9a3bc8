pub(crate) mod intersect;
pub(crate) mod pipeline;
pub(crate) mod sites;
pub(crate) mod voronoi;
