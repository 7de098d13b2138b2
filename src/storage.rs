//! The configured complex-observation directory.
//!
//! Handlers never build paths themselves: filename allocation, pointer
//! resolution and file removal all go through [`FileStore`] so every handler
//! shares one naming scheme on one directory.

use crate::config::StorageConfig;
use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Extension assumed for payload titles that carry none.
pub const DEFAULT_EXTENSION: &str = "dat";

#[derive(Debug, Error)]
pub enum StorageError {
	#[error("complex observation directory {} is not usable: {source}", dir.display())]
	Directory {
		dir: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("failed to allocate {} in the complex observation directory: {source}", path.display())]
	Allocate {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
}

/// Handle to the directory holding complex observation payload files.
#[derive(Debug, Clone)]
pub struct FileStore {
	dir: PathBuf,
}

impl FileStore {
	/// Opens the directory named by the configuration, creating it if absent.
	pub fn from_config(config: &StorageConfig) -> Result<Self, StorageError> {
		Self::open(config.complex_obs_dir.clone())
	}

	/// Opens `dir` as the storage directory, creating it if absent.
	pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
		let dir = dir.into();
		fs::create_dir_all(&dir).map_err(|source| StorageError::Directory {
			dir: dir.clone(),
			source,
		})?;
		Ok(Self { dir })
	}

	pub fn dir(&self) -> &Path {
		&self.dir
	}

	/// Path of a stored payload file. Filenames come from pointers this crate
	/// wrote and are joined as-is.
	pub fn data_file(&self, filename: &str) -> PathBuf {
		self.dir.join(filename)
	}

	/// Allocates a collision-free output file for `stem`, probing
	/// `{stem}.{extension}`, `{stem}_1.{extension}`, `{stem}_2.{extension}`, …
	///
	/// Each candidate is opened create-exclusive, so a name observed free here
	/// cannot also be claimed by a concurrent save; the loser sees
	/// `AlreadyExists` and moves on to the next suffix. The returned handle is
	/// the reserved file itself and must be written through.
	pub fn reserve_output_file(
		&self,
		stem: &str,
		extension: &str,
	) -> Result<OutputFile, StorageError> {
		let mut attempt: u32 = 0;
		loop {
			let name = if attempt == 0 {
				format!("{stem}.{extension}")
			} else {
				format!("{stem}_{attempt}.{extension}")
			};
			let path = self.dir.join(&name);
			match OpenOptions::new().write(true).create_new(true).open(&path) {
				Ok(file) => return Ok(OutputFile { name, path, file }),
				Err(source) if source.kind() == ErrorKind::AlreadyExists => attempt += 1,
				Err(source) => return Err(StorageError::Allocate { path, source }),
			}
		}
	}

	/// Removes the stored file for `filename`, reporting whether a file was
	/// actually deleted. Failures other than the file being absent are logged.
	pub fn remove_data_file(&self, filename: &str) -> Removal {
		let path = self.data_file(filename);
		match fs::remove_file(&path) {
			Ok(()) => Removal::Removed,
			Err(err) if err.kind() == ErrorKind::NotFound => Removal::NotFound,
			Err(err) => {
				warn!(path = %path.display(), "Failed to remove complex obs file: {err}");
				Removal::Failed
			}
		}
	}
}

/// Outcome of [`FileStore::remove_data_file`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
	/// A stored file existed and was deleted.
	Removed,
	/// No file of that name exists on storage.
	NotFound,
	/// Deletion failed; the cause has been logged.
	Failed,
}

/// A freshly reserved, exclusively created output file.
#[derive(Debug)]
pub struct OutputFile {
	/// Final filename, including any numeric disambiguator.
	pub name: String,
	pub path: PathBuf,
	pub file: File,
}

/// Extension taken from a payload title: the text after the final `.`,
/// trimmed and lowercased. Titles without one fall back to
/// [`DEFAULT_EXTENSION`].
pub fn extension_from_title(title: &str) -> String {
	title
		.rsplit_once('.')
		.map(|(_, extension)| extension.trim())
		.filter(|extension| !extension.is_empty())
		.map_or_else(|| DEFAULT_EXTENSION.to_owned(), str::to_lowercase)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn extension_is_lowercased_and_trimmed() {
		assert_eq!(extension_from_title("photo.png"), "png");
		assert_eq!(extension_from_title("photo.PNG "), "png");
		assert_eq!(extension_from_title("archive.tar.gz"), "gz");
		assert_eq!(extension_from_title(".png"), "png");
	}

	#[test]
	fn titles_without_extension_fall_back() {
		assert_eq!(extension_from_title("photo"), DEFAULT_EXTENSION);
		assert_eq!(extension_from_title("photo."), DEFAULT_EXTENSION);
		assert_eq!(extension_from_title(""), DEFAULT_EXTENSION);
	}

	#[test]
	fn open_creates_missing_directories() {
		let dir = tempfile::tempdir().expect("tempdir");
		let nested = dir.path().join("obs").join("complex");
		let store = FileStore::open(&nested).expect("storage dir");
		assert!(nested.is_dir());
		assert_eq!(store.dir(), nested);
	}

	#[test]
	fn probing_skips_taken_names() {
		let dir = tempfile::tempdir().expect("tempdir");
		let store = FileStore::open(dir.path()).expect("storage dir");

		let first = store.reserve_output_file("42", "png").expect("first");
		assert_eq!(first.name, "42.png");

		let second = store.reserve_output_file("42", "png").expect("second");
		assert_eq!(second.name, "42_1.png");

		let third = store.reserve_output_file("42", "png").expect("third");
		assert_eq!(third.name, "42_2.png");

		assert!(first.path.exists());
		assert!(second.path.exists());
		assert!(third.path.exists());
	}

	#[test]
	fn reserved_handle_writes_to_the_reserved_path() {
		let dir = tempfile::tempdir().expect("tempdir");
		let store = FileStore::open(dir.path()).expect("storage dir");

		let mut output = store.reserve_output_file("7", "bin").expect("reserve");
		output.file.write_all(b"payload").expect("write");
		drop(output.file);

		assert_eq!(fs::read(store.data_file("7.bin")).expect("read"), b"payload");
	}

	#[test]
	fn removal_distinguishes_deleted_from_absent() {
		let dir = tempfile::tempdir().expect("tempdir");
		let store = FileStore::open(dir.path()).expect("storage dir");

		assert_eq!(store.remove_data_file("never-written.png"), Removal::NotFound);

		let output = store.reserve_output_file("9", "png").expect("reserve");
		drop(output.file);
		assert_eq!(store.remove_data_file("9.png"), Removal::Removed);
		assert!(!store.data_file("9.png").exists());
	}
}
