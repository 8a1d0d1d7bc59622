//! Image scanning and worklist construction

use errmap_domain::model::Worklist;
use errmap_domain::repository::WorklistProvider;
use errmap_types::{Error, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Supported image extensions
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

/// Check if a path is a supported image file
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Validate an image file exists and is readable; returns its dimensions
pub fn validate_image(path: &Path) -> Result<(u32, u32)> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.display().to_string()));
    }

    if !path.is_file() || !is_supported_image(path) {
        return Err(Error::FileNotFound(format!(
            "{} is not a supported image file",
            path.display()
        )));
    }

    Ok(image::image_dimensions(path)?)
}

/// List the images directly inside a folder, sorted by file name
pub fn scan_directory(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::FileNotFound(dir.display().to_string()));
    }

    let mut images = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.is_file() && is_supported_image(path) {
            images.push(path.to_path_buf());
        }
    }

    // Sort by filename for consistent ordering
    images.sort_by(|a, b| {
        a.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .cmp(b.file_name().and_then(|n| n.to_str()).unwrap_or(""))
    });

    Ok(images)
}

/// Worklist provider over a folder on disk
#[derive(Debug, Clone, Copy, Default)]
pub struct FolderScanner;

impl WorklistProvider for FolderScanner {
    fn worklist(&self, folder: &Path, calibration_image: &Path) -> Result<Worklist> {
        if !calibration_image.is_file() {
            return Err(Error::FileNotFound(calibration_image.display().to_string()));
        }
        let images = scan_directory(folder)?;
        Ok(Worklist::new(calibration_image.to_path_buf(), images))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_is_supported_image() {
        assert!(is_supported_image(Path::new("test.jpg")));
        assert!(is_supported_image(Path::new("test.JPEG")));
        assert!(is_supported_image(Path::new("test.png")));
        assert!(is_supported_image(Path::new("test.bmp")));
        assert!(!is_supported_image(Path::new("test.txt")));
        assert!(!is_supported_image(Path::new("test")));
    }

    #[test]
    fn test_scan_is_flat_and_sorted() {
        let dir = tempdir().unwrap();
        for name in ["c.png", "a.jpg", "b.bmp", "notes.txt"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("Results")).unwrap();
        fs::write(dir.path().join("Results").join("nested.png"), b"x").unwrap();

        let images = scan_directory(dir.path()).unwrap();
        let names: Vec<_> = images
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.bmp", "c.png"]);
    }

    #[test]
    fn test_worklist_pins_calibration_image() {
        let dir = tempdir().unwrap();
        for name in ["1.png", "2.png", "3.png"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        let calibration = dir.path().join("2.png");
        let list = FolderScanner.worklist(dir.path(), &calibration).unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list.calibration_image(), calibration.as_path());
        assert_eq!(list.get(1), Some(dir.path().join("1.png").as_path()));
        assert_eq!(list.get(2), Some(dir.path().join("3.png").as_path()));
    }

    #[test]
    fn test_missing_inputs() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            scan_directory(&dir.path().join("missing")),
            Err(Error::FileNotFound(_))
        ));
        assert!(matches!(
            FolderScanner.worklist(dir.path(), &dir.path().join("cal.png")),
            Err(Error::FileNotFound(_))
        ));
        assert!(matches!(
            validate_image(&dir.path().join("cal.png")),
            Err(Error::FileNotFound(_))
        ));
    }

    #[test]
    fn test_validate_image_reads_dimensions() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tiny.png");
        image::RgbImage::new(4, 3).save(&path).unwrap();
        assert_eq!(validate_image(&path).unwrap(), (4, 3));

        let broken = dir.path().join("broken.png");
        fs::write(&broken, b"not an image").unwrap();
        assert!(matches!(validate_image(&broken), Err(Error::Image(_))));
    }
}
