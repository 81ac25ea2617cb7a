// Factor wrappers: domain randomization layered over simulated environments.
//
// Provided factors:
// - ObjectSize: scales the geoms of the task object
// - TableTexture: swaps the texture of the table material

pub mod constants;
pub mod factor;
pub mod object_size;
pub mod table_texture;

pub use factor::{Factor, FactorValue, FactorWrapper};
pub use object_size::{ObjectSize, ObjectSizeConfig, ObjectSizeWrapper};
pub use table_texture::{TableTexture, TableTextureConfig, TableTextureWrapper};
