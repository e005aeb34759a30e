use super::WorldError;

/// The environment bitmap stretched over the world: dimensions, scale
/// (meters per pixel), and an uninterpreted pixel blob.
#[derive(Clone, Debug, PartialEq)]
pub struct Background {
    width: u32,
    height: u32,
    scale: f64,
    pixels: Vec<u8>,
}

impl Background {
    pub fn new(width: u32, height: u32, scale: f64, pixels: Vec<u8>) -> Result<Self, WorldError> {
        if pixels.len() as u64 != u64::from(width) * u64::from(height) {
            return Err(WorldError::BackgroundSizeMismatch {
                len: pixels.len(),
                width,
                height,
            });
        }
        Ok(Self {
            width,
            height,
            scale,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_buffer_must_match_dimensions() {
        assert!(Background::new(4, 4, 0.1, vec![0; 16]).is_ok());
        assert_eq!(
            Background::new(4, 4, 0.1, vec![0; 15]),
            Err(WorldError::BackgroundSizeMismatch {
                len: 15,
                width: 4,
                height: 4,
            })
        );
    }
}
