use log::warn;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use walkdir::WalkDir;

use crate::errors::AppError;

// @module: File and directory utilities

const SRT_EXTENSION: &str = "srt";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<(), AppError> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path).map_err(|e| AppError::fatal_io(path, e))?;
        }
        Ok(())
    }

    // @checks: Regular file with a .srt extension, any case
    pub fn is_srt_file<P: AsRef<Path>>(path: P) -> bool {
        let path = path.as_ref();
        path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(SRT_EXTENSION))
    }

    /// Collect subtitle files from a mix of file and directory arguments
    ///
    /// Directories are walked recursively. Files given explicitly must carry
    /// the .srt extension too. The result is deduplicated, and each directory
    /// contributes its files in sorted order.
    pub fn find_srt_files<P: AsRef<Path>>(inputs: &[P]) -> Vec<PathBuf> {
        let mut result: Vec<PathBuf> = Vec::new();

        for input in inputs {
            let input = input.as_ref();
            if input.is_dir() {
                let mut found: Vec<PathBuf> = WalkDir::new(input)
                    .follow_links(true)
                    .into_iter()
                    .filter_map(|entry| match entry {
                        Ok(entry) => Some(entry),
                        Err(e) => {
                            warn!("Skipping unreadable entry under {:?}: {}", input, e);
                            None
                        }
                    })
                    .map(|entry| entry.into_path())
                    .filter(|path| Self::is_srt_file(path))
                    .collect();
                found.sort();
                result.extend(found);
            } else if Self::is_srt_file(input) {
                result.push(input.to_path_buf());
            } else if input.exists() {
                warn!("Not an .srt file, skipping: {:?}", input);
            } else {
                warn!("Input path does not exist: {:?}", input);
            }
        }

        let mut seen = std::collections::HashSet::new();
        result.retain(|path| seen.insert(path.clone()));
        result
    }

    // @generates: Output path for a translated subtitle
    // @params: input_file, output_dir (None = next to the input), target_language
    pub fn generate_output_path<P: AsRef<Path>>(
        input_file: P,
        output_dir: Option<&Path>,
        target_language: &str,
    ) -> PathBuf {
        let input_file = input_file.as_ref();
        let stem = input_file.file_stem().unwrap_or_default().to_string_lossy();
        let extension = input_file
            .extension()
            .map(|ext| ext.to_string_lossy().to_string())
            .unwrap_or_else(|| SRT_EXTENSION.to_string());
        let file_name = format!("{}_{}.{}", stem, target_language, extension);

        match output_dir {
            Some(dir) => dir.join(file_name),
            None => input_file.with_file_name(file_name),
        }
    }

    /// Write bytes so that readers never observe a partial file
    ///
    /// The content goes to a temporary file in the destination directory,
    /// which is then renamed over the target.
    pub fn write_atomic<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<(), AppError> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self::ensure_dir(&dir)?;

        let mut temp = NamedTempFile::new_in(&dir).map_err(|e| AppError::fatal_io(&dir, e))?;
        temp.write_all(content).map_err(|e| AppError::fatal_io(path, e))?;
        temp.flush().map_err(|e| AppError::fatal_io(path, e))?;
        temp.persist(path).map_err(|e| AppError::fatal_io(path, e.error))?;
        Ok(())
    }
}
