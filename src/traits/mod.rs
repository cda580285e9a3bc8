pub(crate) mod mosaic;
pub(crate) mod registry;
pub(crate) mod solid;
pub(crate) mod spiral;
