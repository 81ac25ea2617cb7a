/// Body randomized by `ObjectSize` when the task does not name its object.
pub const OBJECT_BODY_NAME: &str = "obj";

/// Material whose texture `TableTexture` swaps.
pub const TABLE_MATERIAL_NAME: &str = "table_wood";

pub const OBJECT_SIZE_FACTOR: &str = "object_size";
pub const TABLE_TEXTURE_FACTOR: &str = "table_texture";

pub const DEFAULT_SCALE_RANGE: (f64, f64) = (0.4, 1.4);
