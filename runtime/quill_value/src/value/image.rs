//! Descriptions of images for the host to render.

/// An image an expression produced, described rather than rendered.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum GeneratedImage {
    /// Nothing to draw.
    #[default]
    Blank,
    /// An image file shipped in a package, by path.
    Packaged(String),
}

impl GeneratedImage {
    /// Image for a name; the empty name is the blank image.
    pub fn from_name(name: &str) -> Self {
        if name.is_empty() {
            GeneratedImage::Blank
        } else {
            GeneratedImage::Packaged(name.to_string())
        }
    }

    #[inline]
    pub fn is_blank(&self) -> bool {
        matches!(self, GeneratedImage::Blank)
    }

    pub fn to_code(&self) -> String {
        match self {
            GeneratedImage::Blank => "blank_image".to_string(),
            GeneratedImage::Packaged(name) => format!("image({name:?})"),
        }
    }
}
