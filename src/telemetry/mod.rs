pub(crate) mod engine;
pub(crate) mod power;
pub(crate) mod snapshot;
