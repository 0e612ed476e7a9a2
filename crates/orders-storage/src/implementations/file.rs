//! File-based storage backend implementation.
//!
//! This module provides a filesystem implementation of the StorageInterface
//! trait, storing each document as a JSON file under a configured base
//! directory. Writes go through a temp-file-then-rename so a document is
//! always observed fully written.

use crate::{StorageError, StorageInterface};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;

const EXTENSION: &str = "json";

/// File-based storage implementation.
pub struct FileStorage {
	/// Base directory path for storing files.
	base_path: PathBuf,
}

impl FileStorage {
	/// Creates a new FileStorage instance with the specified base path.
	pub fn new(base_path: PathBuf) -> Self {
		Self { base_path }
	}

	/// Converts a storage key to a filesystem-safe file path.
	///
	/// Sanitizes the key by replacing problematic characters and appending
	/// the document extension.
	fn file_path(&self, key: &str) -> PathBuf {
		self.base_path.join(format!("{}.{}", sanitize(key), EXTENSION))
	}
}

/// Replaces characters that are unsafe in file names.
fn sanitize(key: &str) -> String {
	key.replace(['/', ':'], "_")
}

#[async_trait]
impl StorageInterface for FileStorage {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		let path = self.file_path(key);

		match fs::read(&path).await {
			Ok(data) => Ok(data),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound),
			Err(e) => Err(StorageError::Backend(e.to_string())),
		}
	}

	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
		let path = self.file_path(key);

		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent)
				.await
				.map_err(|e| StorageError::Backend(e.to_string()))?;
		}

		// Write atomically by writing to a temp file then renaming
		let temp_path = path.with_extension("tmp");
		fs::write(&temp_path, value)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;

		fs::rename(&temp_path, &path)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;

		Ok(())
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		let path = self.file_path(key);

		match fs::remove_file(&path).await {
			Ok(_) => Ok(()),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
			Err(e) => Err(StorageError::Backend(e.to_string())),
		}
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		Ok(self.file_path(key).exists())
	}

	async fn list_bytes(&self, prefix: &str) -> Result<Vec<Vec<u8>>, StorageError> {
		let mut values = Vec::new();
		let safe_prefix = sanitize(prefix);

		let mut entries = match fs::read_dir(&self.base_path).await {
			Ok(entries) => entries,
			// A base directory that was never written to holds nothing.
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(values),
			Err(e) => return Err(StorageError::Backend(e.to_string())),
		};

		while let Some(entry) = entries
			.next_entry()
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?
		{
			let path = entry.path();
			if path.extension() != Some(std::ffi::OsStr::new(EXTENSION)) {
				continue;
			}
			let matches = path
				.file_name()
				.and_then(|name| name.to_str())
				.is_some_and(|name| name.starts_with(&safe_prefix));
			if !matches {
				continue;
			}
			match fs::read(&path).await {
				Ok(data) => values.push(data),
				Err(e) => {
					tracing::warn!("Skipping file {:?}: could not be read: {}", path, e);
				}
			}
		}

		Ok(values)
	}
}

/// Factory function to create a file storage backend from configuration.
///
/// Configuration parameters:
/// - `storage_path`: Base directory for file storage (default: "./data/storage")
pub fn create_storage(config: &toml::Value) -> Result<Box<dyn StorageInterface>, StorageError> {
	let storage_path = config
		.get("storage_path")
		.and_then(|v| v.as_str())
		.unwrap_or("./data/storage")
		.to_string();

	Ok(Box::new(FileStorage::new(PathBuf::from(storage_path))))
}
