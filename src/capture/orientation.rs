use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// EXIF の Orientation（1-8）を読む
pub fn extract_orientation(path: &Path) -> Result<u32, Box<dyn std::error::Error>> {
    let file = File::open(path)?;
    let mut bufreader = BufReader::new(file);
    let exif_reader = exif::Reader::new();
    let exif = exif_reader.read_from_container(&mut bufreader)?;

    if let Some(field) = exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY) {
        if let Some(value) = field.value.get_uint(0) {
            return Ok(value);
        }
    }

    Err("No orientation found in EXIF".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use tempfile::tempdir;

    #[test]
    fn test_missing_file() {
        assert!(extract_orientation(Path::new("/nonexistent/photo.jpg")).is_err());
    }

    #[test]
    fn test_image_without_exif() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plain.png");
        RgbImage::from_pixel(2, 2, Rgb([0, 0, 0])).save(&path).unwrap();
        assert!(extract_orientation(&path).is_err());
    }
}
