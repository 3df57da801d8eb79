use std::path::{Path, PathBuf};
use std::{env, fs, io};

use crate::TextId;

/// Extension of the text files picked up from a directory.
pub(crate) const TEXT_EXTENSION: &str = "txt";

/// Parses the text id from a file name.
///
/// Examples:
/// - `"./data/46.txt"` → `Some(46)`
/// - `"notes.txt"` → `None`
pub(crate) fn text_id_from_path<P: AsRef<Path>>(input_path: P) -> Option<TextId> {
	input_path.as_ref().file_stem()?.to_str()?.parse().ok()
}

/// Normalize a folder path.
///
/// - `"."` or `"./"` resolves to the current working directory
/// - Other paths are returned as-is (not canonicalized)
pub(crate) fn normalize_folder(input: &Path) -> PathBuf {
	if input == Path::new(".") || input == Path::new("./") {
		env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
	} else {
		input.to_path_buf()
	}
}

/// Lists the text files of a directory named after their text id.
///
/// Only files directly contained in the directory are listed, sorted by id.
/// Files with another extension or a non-numeric name are ignored.
pub(crate) fn list_text_files<P: AsRef<Path>>(dir: P) -> io::Result<Vec<(TextId, PathBuf)>> {
	let folder = normalize_folder(dir.as_ref());
	let mut files = Vec::new();

	for entry in fs::read_dir(folder)? {
		let path = entry?.path();
		if !path.is_file() || path.extension() != Some(std::ffi::OsStr::new(TEXT_EXTENSION)) {
			continue;
		}
		if let Some(id) = text_id_from_path(&path) {
			files.push((id, path));
		}
	}

	files.sort_by_key(|(id, _)| *id);
	Ok(files)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn text_ids_come_from_numeric_stems() {
		assert_eq!(text_id_from_path("./data/46.txt"), Some(46));
		assert_eq!(text_id_from_path("1342"), Some(1342));
		assert_eq!(text_id_from_path("notes.txt"), None);
	}

	#[test]
	fn list_text_files_filters_and_sorts() {
		let dir = tempfile::tempdir().unwrap();
		for name in ["46.txt", "11.txt", "notes.txt", "12.md"] {
			fs::write(dir.path().join(name), "text").unwrap();
		}
		fs::create_dir(dir.path().join("7.txt")).unwrap();

		let ids: Vec<TextId> = list_text_files(dir.path()).unwrap().into_iter().map(|(id, _)| id).collect();
		assert_eq!(ids, vec![11, 46]);
	}
}
