use crate::constants::{BACKGROUND_INFO_LEN, MATRIX_INFO_LEN, MAX_BACKGROUND_PIXELS};

use super::error::WireError;

/// Body of a `MatrixPacket`: the occupancy matrix dimensions. The matrix
/// contents are rebuilt locally; only the dimensions travel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatrixInfo {
    pub size_x: u32,
    pub size_y: u32,
}

impl MatrixInfo {
    pub fn new(size_x: u32, size_y: u32) -> Self {
        Self { size_x, size_y }
    }

    pub fn encode(&self) -> [u8; MATRIX_INFO_LEN] {
        let mut bytes = [0; MATRIX_INFO_LEN];
        bytes[0..4].copy_from_slice(&self.size_x.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.size_y.to_le_bytes());
        bytes
    }

    pub fn decode(bytes: &[u8; MATRIX_INFO_LEN]) -> Self {
        Self {
            size_x: u32::from_le_bytes(bytes[0..4].try_into().unwrap()),
            size_y: u32::from_le_bytes(bytes[4..8].try_into().unwrap()),
        }
    }
}

/// Body of a `BackgroundPacket`: image dimensions and scale. A raw pixel
/// blob of `size_x * size_y` bytes follows on the stream.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackgroundInfo {
    pub size_x: u32,
    pub size_y: u32,
    /// Meters per pixel.
    pub scale: f64,
}

impl BackgroundInfo {
    pub fn new(size_x: u32, size_y: u32, scale: f64) -> Self {
        Self { size_x, size_y, scale }
    }

    pub fn pixel_count(&self) -> u64 {
        u64::from(self.size_x) * u64::from(self.size_y)
    }

    pub fn encode(&self) -> [u8; BACKGROUND_INFO_LEN] {
        let mut bytes = [0; BACKGROUND_INFO_LEN];
        bytes[0..4].copy_from_slice(&self.size_x.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.size_y.to_le_bytes());
        bytes[8..16].copy_from_slice(&self.scale.to_le_bytes());
        bytes
    }

    /// Decodes and validates a background announcement. The declared pixel
    /// count bounds the allocation the receiver makes next, so it is checked
    /// here at the trust boundary.
    pub fn decode(bytes: &[u8; BACKGROUND_INFO_LEN]) -> Result<Self, WireError> {
        let info = Self {
            size_x: u32::from_le_bytes(bytes[0..4].try_into().unwrap()),
            size_y: u32::from_le_bytes(bytes[4..8].try_into().unwrap()),
            scale: f64::from_le_bytes(bytes[8..16].try_into().unwrap()),
        };
        if info.pixel_count() > MAX_BACKGROUND_PIXELS {
            return Err(WireError::BackgroundTooLarge {
                size_x: info.size_x,
                size_y: info.size_y,
                max: MAX_BACKGROUND_PIXELS,
            });
        }
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_info_round_trip() {
        let info = MatrixInfo::new(600, 400);
        assert_eq!(MatrixInfo::decode(&info.encode()), info);
    }

    #[test]
    fn background_info_round_trip() {
        let info = BackgroundInfo::new(320, 240, 0.025);
        let decoded = BackgroundInfo::decode(&info.encode()).unwrap();
        assert_eq!(decoded, info);
        assert_eq!(decoded.pixel_count(), 320 * 240);
    }

    #[test]
    fn oversized_background_is_rejected() {
        let info = BackgroundInfo::new(u32::MAX, u32::MAX, 1.0);
        assert!(matches!(
            BackgroundInfo::decode(&info.encode()),
            Err(WireError::BackgroundTooLarge { .. })
        ));
    }
}
