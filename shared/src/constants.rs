// Wire format size limits

/// Size in bytes of the fixed framing header (`type: u32` + `data: u32`).
pub const HEADER_LEN: usize = 8;

/// Size in bytes of a property record header (`entity_id` + `kind` + `len`).
pub const PROPERTY_HEADER_LEN: usize = 12;

/// Size in bytes of an entity record (`id` + `parent` + `type_tag`).
pub const ENTITY_RECORD_LEN: usize = 12;

/// Size in bytes of a matrix announcement body (`size_x` + `size_y`).
pub const MATRIX_INFO_LEN: usize = 8;

/// Size in bytes of a background announcement body
/// (`size_x` + `size_y` + `scale: f64`).
pub const BACKGROUND_INFO_LEN: usize = 16;

/// Hard cap on a single serialized property value. A property header arriving
/// from a peer must declare a length in `[1, MAX_PROPERTY_DATA_LEN)`; anything
/// outside that range is a protocol violation and the connection is dropped.
pub const MAX_PROPERTY_DATA_LEN: usize = 1024;

/// Hard cap on the pixel count of a background image announcement. The pixel
/// buffer is allocated up front from the declared dimensions, so an
/// unchecked header could demand an arbitrary allocation. 64 Mpx covers any
/// plausible world bitmap.
pub const MAX_BACKGROUND_PIXELS: u64 = 1 << 26;

/// Default TCP port a server listens on for pose connections.
pub const DEFAULT_PORT: u16 = 6601;
