use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;
use std::{fs, io, thread};

use reqwest::blocking::Client;
use thiserror::Error;

use crate::TextId;

/// Default Project Gutenberg plain-text mirror.
pub const GUTENBERG_MIRROR: &str = "https://www.gutenberg.org/cache/epub";

/// Download timeout for a single book.
const HTTP_TIMEOUT: Duration = Duration::new(30, 0);

/// Start markers are only searched for in the first lines of a book.
const HEADER_LINES: usize = 600;

/// End markers are only searched for after the first lines of a book.
const FOOTER_SKIP_LINES: usize = 100;

/// Lines after which the book content starts. The last one found wins.
const START_MARKERS: [&str; 14] = [
	"*** START OF THE PROJECT GUTENBERG",
	"*** START OF THIS PROJECT GUTENBERG",
	"***START OF THE PROJECT GUTENBERG",
	" *** START OF THIS PROJECT GUTENBERG",
	"*END*THE SMALL PRINT",
	"*SMALL PRINT!",
	"****     SMALL PRINT!",
	"[\"Small Print\" V.",
	"This etext was prepared by",
	"E-text prepared by",
	"Produced by",
	"Distributed Proofreading Team",
	"*****These eBooks Were Prepared By Thousands of Volunteers!*****",
	"tells you about restrictions in how the file may be used.",
];

/// Lines before which the book content ends. The first one found wins.
const END_MARKERS: [&str; 14] = [
	"*** END OF THE PROJECT GUTENBERG",
	"*** END OF THIS PROJECT GUTENBERG",
	"***END OF THE PROJECT GUTENBERG",
	" *** END OF THIS PROJECT GUTENBERG",
	"*** END OF THE COPYRIGHTED",
	"End of the Project Gutenberg",
	"End of The Project Gutenberg",
	" End of the Project Gutenberg",
	"End of Project Gutenberg",
	"End of this Project Gutenberg",
	"END OF PROJECT GUTENBERG",
	"Ende dieses Project Gutenberg",
	"Ende dieses Projekt Gutenberg",
	"** This is a COPYRIGHTED Project Gutenberg Etext, Details Above **",
];

/// Boilerplate sections sometimes embedded in the middle of old books.
const LEGALESE_START: &str = "<<THIS ELECTRONIC VERSION OF";
const LEGALESE_END: &str = "SERVICE THAT CHARGES FOR DOWNLOAD";

/// Failures while acquiring a source text.
#[derive(Debug, Error)]
pub enum SourceError {
	#[error("failed to build the HTTP client: {0}")]
	Client(#[source] reqwest::Error),

	#[error("failed to download text {id}: {source}")]
	Http { id: TextId, source: reqwest::Error },

	#[error("failed to read text {id} from {}: {source}", .path.display())]
	Io { id: TextId, path: PathBuf, source: io::Error },

	#[error("no text registered under id {0}")]
	Unknown(TextId),

	#[error("text {0} has no content")]
	Empty(TextId),
}

/// Supplies the full plain-text body of a text from its identifier.
///
/// Implementations must be shareable across threads, see [`fetch_all`].
pub trait TextSource: Sync {
	fn fetch(&self, id: TextId) -> Result<String, SourceError>;
}

/// Project Gutenberg books, downloaded by book id.
///
/// Licensing headers and footers are removed with [`strip_headers`].
#[derive(Debug, Clone)]
pub struct GutenbergSource {
	client: Client,
	mirror: String,
}

impl GutenbergSource {
	/// Creates a source downloading from [`GUTENBERG_MIRROR`].
	pub fn new() -> Result<Self, SourceError> {
		Self::with_mirror(GUTENBERG_MIRROR)
	}

	/// Creates a source downloading from another mirror with the same layout
	/// (`<mirror>/<id>/pg<id>.txt`).
	pub fn with_mirror(mirror: &str) -> Result<Self, SourceError> {
		let client = Client::builder().timeout(HTTP_TIMEOUT).build().map_err(SourceError::Client)?;
		Ok(Self {
			client,
			mirror: mirror.trim_end_matches('/').to_owned(),
		})
	}

	/// Returns the download URL of a book.
	pub fn url(&self, id: TextId) -> String {
		format!("{}/{id}/pg{id}.txt", self.mirror)
	}
}

impl TextSource for GutenbergSource {
	fn fetch(&self, id: TextId) -> Result<String, SourceError> {
		let body = self
			.client
			.get(self.url(id))
			.send()
			.and_then(|response| response.error_for_status())
			.and_then(|response| response.text())
			.map_err(|source| SourceError::Http { id, source })?;

		let text = strip_headers(&body);
		if text.is_empty() {
			return Err(SourceError::Empty(id));
		}
		Ok(text)
	}
}

/// Local text files registered under an id.
#[derive(Debug, Clone, Default)]
pub struct FileSource {
	files: HashMap<TextId, PathBuf>,
}

impl FileSource {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers every `<id>.txt` file of a directory.
	///
	/// Returns the source and the registered ids in ascending order.
	pub fn from_dir<P: AsRef<Path>>(dir: P) -> io::Result<(Self, Vec<TextId>)> {
		let mut source = Self::new();
		let mut ids = Vec::new();
		for (id, path) in crate::io::list_text_files(dir)? {
			source.register(id, path);
			ids.push(id);
		}
		Ok((source, ids))
	}

	/// Registers `path` under `id`, replacing any previous path.
	pub fn register<P: AsRef<Path>>(&mut self, id: TextId, path: P) {
		self.files.insert(id, path.as_ref().to_path_buf());
	}
}

impl TextSource for FileSource {
	fn fetch(&self, id: TextId) -> Result<String, SourceError> {
		let path = self.files.get(&id).ok_or(SourceError::Unknown(id))?;
		fs::read_to_string(path).map_err(|source| SourceError::Io { id, path: path.clone(), source })
	}
}

/// Removes the Project Gutenberg licensing header and footer of a book.
///
/// - Content starts after the last start marker found in the first
///   600 lines
/// - Content ends before the first end marker found after line 100
/// - Embedded legalese sections are dropped
///
/// Texts without markers are kept whole. The result is trimmed.
pub fn strip_headers(text: &str) -> String {
	let mut out: Vec<&str> = Vec::new();
	let mut in_legalese = false;

	for (i, line) in text.lines().enumerate() {
		let starts_with_any = |markers: &[&str]| markers.iter().any(|marker| line.starts_with(marker));

		if i <= HEADER_LINES && starts_with_any(&START_MARKERS) {
			out.clear();
			continue;
		}
		if i >= FOOTER_SKIP_LINES && starts_with_any(&END_MARKERS) {
			break;
		}
		if line.starts_with(LEGALESE_START) {
			in_legalese = true;
			continue;
		}
		if line.starts_with(LEGALESE_END) {
			in_legalese = false;
			continue;
		}
		if !in_legalese {
			out.push(line);
		}
	}

	out.join("\n").trim().to_owned()
}

/// Fetches several texts in parallel.
///
/// Ids are split into one chunk per CPU core, each chunk fetched by its own
/// thread. Results are returned in the order of `ids`.
pub fn fetch_all<S: TextSource + ?Sized>(source: &S, ids: &[TextId]) -> Vec<Result<String, SourceError>> {
	if ids.is_empty() {
		return Vec::new();
	}
	let workers = num_cpus::get().clamp(1, ids.len());
	let chunk_size = ids.len().div_ceil(workers);

	let (tx, rx) = mpsc::channel();
	thread::scope(|scope| {
		for (chunk_number, chunk) in ids.chunks(chunk_size).enumerate() {
			let tx = tx.clone();
			scope.spawn(move || {
				for (offset, id) in chunk.iter().enumerate() {
					// The receiver outlives the scope, sending cannot fail
					let _ = tx.send((chunk_number * chunk_size + offset, source.fetch(*id)));
				}
			});
		}
	});
	drop(tx);

	let mut results: Vec<Option<Result<String, SourceError>>> = ids.iter().map(|_| None).collect();
	for (position, result) in rx {
		results[position] = Some(result);
	}
	results.into_iter().flatten().collect()
}
