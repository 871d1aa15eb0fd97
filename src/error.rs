use image::ImageError;

/// Error type for shadow generation, file I/O, and settings.
/// The per-pixel kernels themselves never fail.
#[derive(Debug)]
pub enum ShadowError {
    Io(std::io::Error),
    Image(ImageError),
    Settings(String),
    Gpu(String),
    InvalidInput(String),
}

impl std::fmt::Display for ShadowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShadowError::Io(e) => write!(f, "I/O error: {}", e),
            ShadowError::Image(e) => write!(f, "image error: {}", e),
            ShadowError::Settings(e) => write!(f, "settings error: {}", e),
            ShadowError::Gpu(e) => write!(f, "GPU error: {}", e),
            ShadowError::InvalidInput(e) => write!(f, "invalid input: {}", e),
        }
    }
}

impl std::error::Error for ShadowError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ShadowError::Io(e) => Some(e),
            ShadowError::Image(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ShadowError {
    fn from(e: std::io::Error) -> Self {
        ShadowError::Io(e)
    }
}

impl From<ImageError> for ShadowError {
    fn from(e: ImageError) -> Self {
        ShadowError::Image(e)
    }
}
