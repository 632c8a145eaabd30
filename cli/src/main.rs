mod load;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use search_core::duplicates::remove_duplicates;
use search_core::process_queries::{process_queries, process_queries_joined};
use search_core::{DocId, Document, DocumentStatus, MatchResult, SearchServer};
use tracing_subscriber::{fmt, EnvFilter};

use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "search-cli")]
#[command(about = "Load documents into an in-memory TF-IDF index and query it", long_about = None)]
struct Cli {
    /// Documents: a .json/.jsonl file or a directory of them
    #[arg(long)]
    docs: PathBuf,
    /// Space separated stop words
    #[arg(long, default_value = "")]
    stop_words: String,
    /// Print results as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank documents for one or more queries
    Search {
        #[arg(long = "query", required = true)]
        queries: Vec<String>,
        /// Only return documents with this status
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
        #[arg(long, default_value_t = false)]
        parallel: bool,
    },
    /// Match one query against every document
    Match {
        #[arg(long)]
        query: String,
        #[arg(long, default_value_t = false)]
        parallel: bool,
    },
    /// Run a file of queries, one per line
    Batch {
        #[arg(long)]
        queries: PathBuf,
        /// Print one flat list instead of one list per query
        #[arg(long, default_value_t = false)]
        joined: bool,
    },
    /// Remove documents whose vocabulary duplicates an earlier one
    Dedup,
    /// Show the word frequencies of a document
    Freqs {
        #[arg(long)]
        id: DocId,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    Active,
    Irrelevant,
    Banned,
    Removed,
}

impl From<StatusArg> for DocumentStatus {
    fn from(s: StatusArg) -> Self {
        match s {
            StatusArg::Active => DocumentStatus::Active,
            StatusArg::Irrelevant => DocumentStatus::Irrelevant,
            StatusArg::Banned => DocumentStatus::Banned,
            StatusArg::Removed => DocumentStatus::Removed,
        }
    }
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    let docs = load::read_documents(&cli.docs)?;
    let mut server = SearchServer::from_stop_words_text(&cli.stop_words);
    let added = load::add_documents(&mut server, &docs);
    tracing::info!(added, rejected = docs.len() - added, stop_words = server.stop_words().len(), "documents loaded");

    match cli.command {
        Commands::Search { queries, status, parallel } => {
            for query in &queries {
                search(&server, query, status.map(Into::into), parallel, cli.json);
            }
        }
        Commands::Match { query, parallel } => match_all(&server, &query, parallel, cli.json),
        Commands::Batch { queries, joined } => {
            let queries = load::read_queries(&queries)?;
            batch(&server, &queries, joined, cli.json);
        }
        Commands::Dedup => {
            let start = Instant::now();
            let removed = remove_duplicates(&mut server);
            tracing::info!(elapsed_ms = start.elapsed().as_millis() as u64, removed = removed.len(), "dedup finished");
            let remaining: Vec<DocId> = server.iter().collect();
            if cli.json {
                println!("{}", serde_json::json!({ "removed": removed, "remaining": remaining }));
            } else {
                for id in &removed {
                    println!("Found duplicate document id {id}");
                }
                println!("Remaining documents: {remaining:?}");
            }
        }
        Commands::Freqs { id } => {
            let freqs = server.get_word_frequencies(id);
            if cli.json {
                println!("{}", serde_json::to_string(&freqs)?);
            } else {
                for (word, tf) in freqs {
                    println!("{word} {tf:.6}");
                }
            }
        }
    }
    Ok(())
}

fn search(server: &SearchServer, query: &str, status: Option<DocumentStatus>, parallel: bool, json: bool) {
    let start = Instant::now();
    let found = match (status, parallel) {
        (Some(s), false) => server.find_top_documents_by_status(query, s),
        (Some(s), true) => server.par_find_top_documents_by_status(query, s),
        (None, false) => server.find_top_documents(query),
        (None, true) => server.par_find_top_documents(query),
    };
    tracing::info!(query, elapsed_ms = start.elapsed().as_millis() as u64, "search finished");
    match found {
        Ok(documents) => print_documents(query, &documents, json),
        Err(e) => {
            tracing::warn!(query, error = %e, "search failed");
            println!("search error: {e}");
        }
    }
}

fn print_documents(query: &str, documents: &[Document], json: bool) {
    if json {
        println!("{}", serde_json::json!({ "query": query, "results": documents }));
    } else {
        println!("Results for query: {query}");
        for document in documents {
            println!("{document}");
        }
    }
}

fn match_all(server: &SearchServer, query: &str, parallel: bool, json: bool) {
    let start = Instant::now();
    if !json {
        println!("Matching documents for query: {query}");
    }
    for id in server {
        let matched = if parallel { server.par_match_document(query, id) } else { server.match_document(query, id) };
        match matched {
            Ok(m) => print_match(id, &m, json),
            Err(e) => {
                tracing::warn!(query, error = %e, "match failed");
                println!("error matching documents for query {query}: {e}");
                break;
            }
        }
    }
    tracing::info!(query, elapsed_ms = start.elapsed().as_millis() as u64, "match finished");
}

fn print_match(id: DocId, m: &MatchResult<'_>, json: bool) {
    if json {
        println!("{}", serde_json::json!({ "document_id": id, "status": m.status, "words": m.words }));
    } else {
        println!("{{ document_id = {}, status = {}, words = {} }}", id, m.status, m.words.join(" "));
    }
}

fn batch(server: &SearchServer, queries: &[String], joined: bool, json: bool) {
    let start = Instant::now();
    let outcome = if joined {
        process_queries_joined(server, queries).map(|documents| vec![documents])
    } else {
        process_queries(server, queries)
    };
    tracing::info!(queries = queries.len(), elapsed_ms = start.elapsed().as_millis() as u64, "batch finished");
    match outcome {
        Ok(lists) if joined => print_documents("<joined>", &lists.concat(), json),
        Ok(lists) => {
            for (query, documents) in queries.iter().zip(&lists) {
                print_documents(query, documents, json);
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "batch failed");
            println!("batch error: {e}");
        }
    }
}
