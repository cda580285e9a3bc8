pub(crate) mod model;
pub(crate) mod oracle;
pub(crate) mod polygon;
