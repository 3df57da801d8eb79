use std::collections::HashSet;
use std::io;
use std::path::PathBuf;
use std::sync::RwLock;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{App, HttpResponse, HttpServer, Responder, get, put, web};
use clap::Parser;
use log::{info, warn};
use serde::Deserialize;

use whats_next_core::source::{FileSource, GUTENBERG_MIRROR, GutenbergSource, TextSource, fetch_all};
use whats_next_core::{IndexError, RuleTokenizer, TextId, TextIndex, TextIndexer};

/// Server configuration, from the command line or the environment.
#[derive(Parser, Debug, Clone)]
#[command(name = "whats-next-server", version, about = "Next-word suggestion HTTP service")]
struct Config {
	/// Address to bind
	#[arg(long, env = "WHATS_NEXT_HOST", default_value = "127.0.0.1")]
	host: String,

	/// Port to bind
	#[arg(long, env = "WHATS_NEXT_PORT", default_value_t = 5000)]
	port: u16,

	/// Number of words of every query (1 to 5)
	#[arg(long, env = "WHATS_NEXT_QUERY_COUNT", default_value_t = 2)]
	query_count: usize,

	/// Index each blank-line separated paragraph on its own
	#[arg(long, env = "WHATS_NEXT_SPLIT_PARAGRAPHS")]
	split_paragraphs: bool,

	/// Directory of `<id>.txt` files indexed at startup
	#[arg(long, env = "WHATS_NEXT_DATA_DIR")]
	data_dir: Option<PathBuf>,

	/// Project Gutenberg mirror used by `/v1/books`
	#[arg(long, env = "WHATS_NEXT_MIRROR", default_value = GUTENBERG_MIRROR)]
	mirror: String,

	/// Largest accepted text body, in bytes
	#[arg(long, env = "WHATS_NEXT_MAX_TEXT_BYTES", default_value_t = 16 * 1024 * 1024)]
	max_text_bytes: usize,
}

/// Query parameters of the `/v1/suggest` endpoint
#[derive(Deserialize)]
struct SuggestQuery {
	/// Whitespace separated query words
	query: Option<String>,
}

/// Query parameters of the `/v1/books` endpoint
#[derive(Deserialize)]
struct BooksQuery {
	/// Comma separated Project Gutenberg book ids
	ids: Option<String>,
}

/// State shared by every worker.
///
/// Suggestions only take the read lock. Adding a text tokenizes with no
/// lock held and takes the write lock just to register the result.
struct SharedData {
	indexer: RwLock<TextIndexer>,
	query_count: usize,
	split_paragraphs: bool,
	mirror: String,
}

impl SharedData {
	fn new(indexer: TextIndexer, mirror: &str) -> Self {
		Self {
			query_count: indexer.query_count(),
			split_paragraphs: indexer.split_paragraphs(),
			indexer: RwLock::new(indexer),
			mirror: mirror.to_owned(),
		}
	}

	fn contains(&self, text_id: TextId) -> Result<bool, String> {
		let indexer = self.indexer.read().map_err(|_| "Index lock failed".to_owned())?;
		Ok(indexer.contains(text_id))
	}

	/// Builds the sub-index of a text without touching the shared indexer.
	fn prepare(&self, text: &str) -> Result<TextIndex, String> {
		TextIndex::build(self.query_count, self.split_paragraphs, &RuleTokenizer, text).map_err(|e| e.to_string())
	}

	/// Indexes a text unless its id is already present.
	///
	/// Returns `true` if the text was added. Blocking: call it off the async workers.
	fn add_text(&self, text_id: TextId, text: &str) -> Result<bool, String> {
		if self.contains(text_id)? {
			return Ok(false);
		}
		let index = self.prepare(text)?;

		let mut indexer = self.indexer.write().map_err(|_| "Index lock failed".to_owned())?;
		indexer.insert_index(text_id, index).map_err(|e| e.to_string())
	}

	/// Fetches texts and indexes them in the requested order.
	///
	/// Returns the number of texts actually added.
	fn load<S: TextSource>(&self, source: &S, ids: &[TextId]) -> Result<usize, String> {
		let mut added = 0;
		for (id, text) in ids.iter().zip(fetch_all(source, ids)) {
			let text = text.map_err(|e| e.to_string())?;
			if self.add_text(*id, &text)? {
				info!("Indexed text {id} ({} bytes)", text.len());
				added += 1;
			}
		}
		Ok(added)
	}
}

/// Parses `"46, 11,46"` into `[46, 11]`.
fn parse_ids(ids: &str) -> Result<Vec<TextId>, String> {
	let mut seen = HashSet::new();
	let mut parsed = Vec::new();
	for id in ids.split(',').map(str::trim).filter(|s| !s.is_empty()) {
		let id: TextId = id.parse().map_err(|_| format!("Invalid book id: {id}"))?;
		if seen.insert(id) {
			parsed.push(id);
		}
	}
	if parsed.is_empty() {
		return Err("Missing or empty book ids".into());
	}
	Ok(parsed)
}

/// HTTP PUT endpoint `/v1/texts/{id}`
///
/// Indexes the request body under `id`. Adding an existing id is a no-op.
#[put("/v1/texts/{id}")]
async fn put_text(data: web::Data<SharedData>, path: web::Path<TextId>, body: String) -> impl Responder {
	let text_id = path.into_inner();
	match web::block(move || data.add_text(text_id, &body)).await {
		Ok(Ok(true)) => HttpResponse::Ok().body(format!("Text {text_id} indexed")),
		Ok(Ok(false)) => HttpResponse::Ok().body(format!("Text {text_id} already indexed")),
		Ok(Err(e)) => HttpResponse::InternalServerError().body(e),
		Err(_) => HttpResponse::InternalServerError().body("Indexing failed"),
	}
}

/// HTTP PUT endpoint `/v1/books?ids=46,11`
///
/// Downloads Project Gutenberg books and indexes them.
#[put("/v1/books")]
async fn put_books(data: web::Data<SharedData>, query: web::Query<BooksQuery>) -> impl Responder {
	let ids = match query.ids.as_deref().map(parse_ids) {
		Some(Ok(ids)) => ids,
		Some(Err(e)) => return HttpResponse::BadRequest().body(e),
		None => return HttpResponse::BadRequest().body("Missing or empty book ids"),
	};

	let loaded = web::block(move || {
		let source = GutenbergSource::with_mirror(&data.mirror).map_err(|e| e.to_string())?;
		data.load(&source, &ids)
	})
	.await;

	match loaded {
		Ok(Ok(added)) => HttpResponse::Ok().body(format!("{added} book(s) indexed")),
		Ok(Err(e)) => {
			warn!("Failed to load books: {e}");
			HttpResponse::BadGateway().body(e)
		}
		Err(_) => HttpResponse::InternalServerError().body("Indexing failed"),
	}
}

/// HTTP GET endpoint `/v1/texts`
///
/// Lists the indexed text ids, in insertion order.
#[get("/v1/texts")]
async fn get_texts(data: web::Data<SharedData>) -> impl Responder {
	match data.indexer.read() {
		Ok(indexer) => HttpResponse::Ok().json(indexer.text_ids()),
		Err(_) => HttpResponse::InternalServerError().body("Index lock failed"),
	}
}

/// HTTP GET endpoint `/v1/suggest?query=god+bless`
///
/// Returns the most frequent next words as a JSON list. Query words are
/// lowercased to match the index.
#[get("/v1/suggest")]
async fn get_suggest(data: web::Data<SharedData>, query: web::Query<SuggestQuery>) -> impl Responder {
	let words: Vec<String> = query
		.query
		.as_deref()
		.unwrap_or_default()
		.split_whitespace()
		.map(str::to_lowercase)
		.collect();

	let indexer = match data.indexer.read() {
		Ok(indexer) => indexer,
		Err(_) => return HttpResponse::InternalServerError().body("Index lock failed"),
	};

	match indexer.suggest(&words) {
		Ok(suggestions) => HttpResponse::Ok().json(suggestions),
		Err(e @ IndexError::ArityMismatch { .. }) => HttpResponse::BadRequest().body(e.to_string()),
		Err(e @ IndexError::NoSuggestion) => HttpResponse::NotFound().body(e.to_string()),
		Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
	}
}

/// Registers every endpoint.
fn configure(cfg: &mut web::ServiceConfig) {
	cfg.service(put_text).service(put_books).service(get_texts).service(get_suggest);
}

/// Main entry point for the server.
///
/// Builds the indexer, optionally preloads a data directory, wraps the
/// indexer in a `RwLock` and starts an Actix-web HTTP server.
#[actix_web::main]
async fn main() -> io::Result<()> {
	env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
	let config = Config::parse();

	let indexer = TextIndexer::new(config.query_count, config.split_paragraphs).map_err(io::Error::other)?;
	let shared_data = web::Data::new(SharedData::new(indexer, &config.mirror));

	if let Some(dir) = config.data_dir.clone() {
		let data = shared_data.clone();
		let added = web::block(move || {
			let (source, ids) = FileSource::from_dir(&dir).map_err(|e| e.to_string())?;
			data.load(&source, &ids)
		})
		.await
		.map_err(io::Error::other)?
		.map_err(io::Error::other)?;
		info!("Preloaded {added} text(s)");
	}

	info!("Listening on {}:{} (query count {})", config.host, config.port, config.query_count);
	let max_text_bytes = config.max_text_bytes;
	HttpServer::new(move || {
		App::new()
			.wrap(Logger::default())
			.wrap(Cors::permissive())
			.app_data(shared_data.clone())
			.app_data(web::PayloadConfig::new(max_text_bytes))
			.configure(configure)
	})
	.bind((config.host.as_str(), config.port))?
	.run()
	.await
}
