pub(crate) mod artifact;
pub(crate) mod orchestrator;
pub(crate) mod order;
