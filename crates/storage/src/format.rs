use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::Path;

/// Image formats recognised from file extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Avif,
    Bmp,
    Gif,
    Heic,
    Jpeg,
    Png,
    Svg,
    Tiff,
    Webp,
}
impl ImageFormat {
    /// Detect the format from a path's extension (case-insensitive).
    ///
    /// ```
    /// use orderly_storage::ImageFormat;
    ///
    /// assert_eq!(ImageFormat::from_path("shots/IMG_0001.JPG"), Some(ImageFormat::Jpeg));
    /// assert_eq!(ImageFormat::from_path("notes.txt"), None);
    /// ```
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        Some(match ext.as_str() {
            "avif" => Self::Avif,
            "bmp" => Self::Bmp,
            "gif" => Self::Gif,
            "heic" | "heif" => Self::Heic,
            "jpg" | "jpeg" | "jfif" => Self::Jpeg,
            "png" => Self::Png,
            "svg" => Self::Svg,
            "tif" | "tiff" => Self::Tiff,
            "webp" => Self::Webp,
            _ => return None,
        })
    }

    /// Detect the format from a MIME type such as `image/png`.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
        Some(match essence.as_str() {
            "image/avif" => Self::Avif,
            "image/bmp" => Self::Bmp,
            "image/gif" => Self::Gif,
            "image/heic" | "image/heif" => Self::Heic,
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Self::Jpeg,
            "image/png" => Self::Png,
            "image/svg+xml" => Self::Svg,
            "image/tiff" => Self::Tiff,
            "image/webp" => Self::Webp,
            _ => return None,
        })
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Avif => "image/avif",
            Self::Bmp => "image/bmp",
            Self::Gif => "image/gif",
            Self::Heic => "image/heic",
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Svg => "image/svg+xml",
            Self::Tiff => "image/tiff",
            Self::Webp => "image/webp",
        }
    }

    /// Canonical extension, without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Avif => "avif",
            Self::Bmp => "bmp",
            Self::Gif => "gif",
            Self::Heic => "heic",
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Svg => "svg",
            Self::Tiff => "tiff",
            Self::Webp => "webp",
        }
    }
}
impl Display for ImageFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.mime_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("a.png", Some(ImageFormat::Png))]
    #[case("a.PNG", Some(ImageFormat::Png))]
    #[case("dir/b.jpeg", Some(ImageFormat::Jpeg))]
    #[case("c.tif", Some(ImageFormat::Tiff))]
    #[case("d.webp", Some(ImageFormat::Webp))]
    #[case("e.txt", None)]
    #[case("noext", None)]
    #[case(".png", None)]
    fn test_from_path(#[case] path: &str, #[case] expected: Option<ImageFormat>) {
        assert_eq!(ImageFormat::from_path(path), expected);
    }

    #[rstest]
    #[case("image/png", Some(ImageFormat::Png))]
    #[case("IMAGE/JPEG", Some(ImageFormat::Jpeg))]
    #[case("image/svg+xml; charset=utf-8", Some(ImageFormat::Svg))]
    #[case("application/octet-stream", None)]
    #[case("", None)]
    fn test_from_mime(#[case] mime: &str, #[case] expected: Option<ImageFormat>) {
        assert_eq!(ImageFormat::from_mime(mime), expected);
    }

    #[test]
    fn test_mime_type() {
        assert_eq!(ImageFormat::Svg.mime_type(), "image/svg+xml");
        assert_eq!(ImageFormat::Jpeg.to_string(), "image/jpeg");
    }
}
