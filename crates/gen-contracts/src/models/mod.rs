mod registry;

pub use registry::{Mode, ModelRegistry, ModelSpec, SizeParam};
