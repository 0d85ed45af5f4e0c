mod model;
mod store;

pub use model::{slugify, Instance, LoaderType};
pub use store::InstanceStore;
