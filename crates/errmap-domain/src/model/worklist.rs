//! Ordered list of images processed in one session

use std::path::{Path, PathBuf};

/// Image worklist with the calibration image pinned at position 0.
///
/// Position `n` of the list is the image measured as trial `n`, so trial 1 is
/// the first image after the calibration image.
#[derive(Debug, Clone, PartialEq)]
pub struct Worklist {
    images: Vec<PathBuf>,
}

impl Worklist {
    /// Build a worklist from the calibration image and the folder listing.
    ///
    /// The calibration image is removed from `others` wherever it appears and
    /// reinserted in front, regardless of enumeration order.
    pub fn new(calibration_image: PathBuf, others: impl IntoIterator<Item = PathBuf>) -> Self {
        let rest: Vec<PathBuf> = others
            .into_iter()
            .filter(|p| !same_path(p, &calibration_image))
            .collect();
        let mut images = Vec::with_capacity(rest.len() + 1);
        images.push(calibration_image);
        images.extend(rest);
        Self { images }
    }

    pub fn calibration_image(&self) -> &Path {
        &self.images[0]
    }

    pub fn get(&self, index: usize) -> Option<&Path> {
        self.images.get(index).map(PathBuf::as_path)
    }

    /// Number of images including the calibration image
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Number of trial images (everything but the calibration image)
    pub fn trial_count(&self) -> usize {
        self.images.len() - 1
    }

    pub fn images(&self) -> &[PathBuf] {
        &self.images
    }
}

fn same_path(a: &Path, b: &Path) -> bool {
    a.components().eq(b.components())
}
