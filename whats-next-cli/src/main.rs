use std::collections::HashSet;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{info, warn};

use whats_next_core::source::{FileSource, GUTENBERG_MIRROR, GutenbergSource, TextSource, fetch_all};
use whats_next_core::{MAX_QUERY_COUNT, MIN_QUERY_COUNT, TextId, TextIndexer};

/// Word suggestion based on Project Gutenberg books.
///
/// Example: `whats-next --book-id 46 --query god bless`
#[derive(Parser, Debug)]
#[command(name = "whats-next", version)]
struct Args {
    /// The book id of the Project Gutenberg
    #[arg(long = "book-id", num_args = 1.., required_unless_present = "files")]
    book_ids: Vec<TextId>,

    /// Local text files to index along with the books
    #[arg(long = "file", num_args = 1..)]
    files: Vec<PathBuf>,

    /// Suggest the next word for this list of words
    #[arg(long, num_args = 1.., required = true)]
    query: Vec<String>,

    /// Index each blank-line separated paragraph on its own
    #[arg(long)]
    split_paragraphs: bool,

    /// Project Gutenberg mirror to download the books from
    #[arg(long, default_value = GUTENBERG_MIRROR)]
    mirror: String,
}

/// Checks the number of query words, the same way the index does.
fn check_query_length(query: &[String]) -> Result<(), String> {
    if (MIN_QUERY_COUNT..=MAX_QUERY_COUNT).contains(&query.len()) {
        Ok(())
    } else {
        Err(format!(
            "argument \"query\" requires between {MIN_QUERY_COUNT} and {MAX_QUERY_COUNT} arguments, passed {}",
            query.len()
        ))
    }
}

/// Removes duplicated ids, keeping the first occurrence of each.
fn dedup_ids(ids: &[TextId]) -> Vec<TextId> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

/// Registers local files under ids that cannot clash with the book ids.
///
/// Fails if the ids would go past `TextId::MAX`.
fn file_source(files: &[PathBuf], book_ids: &[TextId]) -> Result<(FileSource, Vec<TextId>), String> {
    if files.is_empty() {
        return Ok((FileSource::new(), Vec::new()));
    }
    let out_of_ids = || format!("no text id left for {} local file(s) after the book ids", files.len());
    let first_id = match book_ids.iter().max() {
        Some(max) => max.checked_add(1).ok_or_else(out_of_ids)?,
        None => 0,
    };
    let mut source = FileSource::new();
    let mut ids = Vec::with_capacity(files.len());
    for (offset, path) in files.iter().enumerate() {
        let id = TextId::try_from(offset)
            .ok()
            .and_then(|offset| first_id.checked_add(offset))
            .ok_or_else(out_of_ids)?;
        source.register(id, path);
        ids.push(id);
    }
    Ok((source, ids))
}

/// Fetches every text of `ids` from `source` and adds it to the indexer, in order.
fn index_from<S: TextSource>(indexer: &mut TextIndexer, source: &S, ids: &[TextId]) -> Result<(), Box<dyn Error>> {
    for (id, text) in ids.iter().zip(fetch_all(source, ids)) {
        let text = text?;
        info!("Indexing text {id} ({} bytes)", text.len());
        indexer.add_text(*id, &text);
    }
    Ok(())
}

fn run(args: Args) -> Result<Vec<String>, Box<dyn Error>> {
    check_query_length(&args.query)?;

    let mut indexer = TextIndexer::new(args.query.len(), args.split_paragraphs)?;

    let book_ids = dedup_ids(&args.book_ids);
    if book_ids.len() != args.book_ids.len() {
        warn!("Ignoring {} duplicated book id(s)", args.book_ids.len() - book_ids.len());
    }
    if !book_ids.is_empty() {
        info!("Downloading {} book(s) from {}", book_ids.len(), args.mirror);
        let books = GutenbergSource::with_mirror(&args.mirror)?;
        index_from(&mut indexer, &books, &book_ids)?;
    }

    let (files, file_ids) = file_source(&args.files, &book_ids)?;
    index_from(&mut indexer, &files, &file_ids)?;

    // The index only holds lowercase words
    let query: Vec<String> = args.query.iter().map(|word| word.to_lowercase()).collect();
    Ok(indexer.suggest(&query)?)
}

fn main() -> ExitCode {
    env_logger::init();

    match run(Args::parse()) {
        Ok(suggestions) => {
            println!("{suggestions:?}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
