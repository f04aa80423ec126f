//! Building strategies, regions and animals from `{"type", "data"}` specs

pub mod builders;
pub mod registry;

pub use builders::Factories;
pub use registry::{BuildContext, Builder, BuilderInfo, EntitySpec, Factory};
