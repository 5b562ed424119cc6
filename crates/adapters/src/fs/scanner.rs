use std::path::{Path, PathBuf};

use retouch_application::ApplicationError;
use retouch_domain::{media_type_for_path, MediaType};
use walkdir::WalkDir;

/// A file the editor could be asked to open. Non-image files are kept so that
/// choosing one reports the usual notice instead of silently vanishing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub path: PathBuf,
    pub media_type: MediaType,
}

impl CandidateFile {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let media_type = media_type_for_path(&path);
        Self { path, media_type }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WalkdirImageScanner {
    max_depth: usize,
}

impl Default for WalkdirImageScanner {
    fn default() -> Self {
        Self {
            max_depth: usize::MAX,
        }
    }
}

impl WalkdirImageScanner {
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth: max_depth.max(1),
        }
    }

    /// Lists regular files under `folder`, images first, each group sorted
    /// by path.
    pub fn scan(&self, folder: &Path) -> Result<Vec<CandidateFile>, ApplicationError> {
        if !folder.is_dir() {
            return Err(ApplicationError::InvalidInput(format!(
                "folder does not exist or is not a directory: {}",
                folder.display()
            )));
        }

        let mut files: Vec<CandidateFile> = WalkDir::new(folder)
            .max_depth(self.max_depth)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| CandidateFile::from_path(entry.into_path()))
            .collect();

        files.sort_by(|left, right| {
            right
                .media_type
                .is_image()
                .cmp(&left.media_type.is_image())
                .then_with(|| left.path.cmp(&right.path))
        });
        Ok(files)
    }
}
