use anyhow::{Context, Result};
use search_core::{DocId, DocumentStatus, SearchServer};
use serde::Deserialize;
use walkdir::WalkDir;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct InputDoc {
    pub id: DocId,
    pub text: String,
    #[serde(default)]
    pub status: DocumentStatus,
    #[serde(default)]
    pub ratings: Vec<i32>,
}

/// Read documents from a `.json`/`.jsonl` file or every such file under a directory.
pub fn read_documents(input: &Path) -> Result<Vec<InputDoc>> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && matches!(p.extension().and_then(|s| s.to_str()), Some("json" | "jsonl")) {
                files.push(p.to_path_buf());
            }
        }
    } else {
        files.push(input.to_path_buf());
    }

    let mut docs = Vec::new();
    for file in files {
        if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            read_jsonl(&file, &mut docs)?;
        } else {
            read_json(&file, &mut docs)?;
        }
    }
    Ok(docs)
}

fn read_jsonl(file: &Path, docs: &mut Vec<InputDoc>) -> Result<()> {
    let f = File::open(file).with_context(|| format!("opening {}", file.display()))?;
    for (line_no, line) in BufReader::new(f).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let doc: InputDoc = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}", file.display(), line_no + 1))?;
        docs.push(doc);
    }
    Ok(())
}

fn read_json(file: &Path, docs: &mut Vec<InputDoc>) -> Result<()> {
    let f = File::open(file).with_context(|| format!("opening {}", file.display()))?;
    let json: serde_json::Value = serde_json::from_reader(BufReader::new(f))?;
    match json {
        serde_json::Value::Array(arr) => {
            for v in arr {
                docs.push(serde_json::from_value(v)?);
            }
        }
        serde_json::Value::Object(_) => docs.push(serde_json::from_value(json)?),
        _ => anyhow::bail!("{}: expected a document object or an array of documents", file.display()),
    }
    Ok(())
}

/// Add every document, reporting rejected ones instead of failing. Returns how many were added.
pub fn add_documents(server: &mut SearchServer, docs: &[InputDoc]) -> usize {
    let mut added = 0;
    for doc in docs {
        match server.add_document(doc.id, &doc.text, doc.status, &doc.ratings) {
            Ok(()) => added += 1,
            Err(e) => {
                tracing::warn!(id = doc.id, error = %e, "document rejected");
                println!("error adding document {}: {}", doc.id, e);
            }
        }
    }
    added
}

/// Read one query per non-empty line.
pub fn read_queries(file: &Path) -> Result<Vec<String>> {
    let f = File::open(file).with_context(|| format!("opening {}", file.display()))?;
    let mut queries = Vec::new();
    for line in BufReader::new(f).lines() {
        let line = line?;
        if !line.trim().is_empty() {
            queries.push(line);
        }
    }
    Ok(queries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn reads_jsonl_with_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("docs.jsonl");
        fs::write(
            &path,
            "{\"id\": 0, \"text\": \"white cat\", \"status\": \"banned\", \"ratings\": [1, 2]}\n\n{\"id\": 1, \"text\": \"fluffy cat\"}\n",
        )
        .unwrap();
        let docs = read_documents(&path).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].status, DocumentStatus::Banned);
        assert_eq!(docs[1].status, DocumentStatus::Active);
        assert!(docs[1].ratings.is_empty());
    }

    #[test]
    fn reads_directory_of_json() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.json"), r#"[{"id": 3, "text": "dog"}, {"id": 4, "text": "rat"}]"#).unwrap();
        fs::write(dir.path().join("b.json"), r#"{"id": 5, "text": "owl"}"#).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        let docs = read_documents(dir.path()).unwrap();
        assert_eq!(docs.iter().map(|d| d.id).collect::<Vec<_>>(), vec![3, 4, 5]);
    }

    #[test]
    fn bad_documents_are_skipped() {
        let docs = vec![
            InputDoc { id: 0, text: "cat".into(), status: DocumentStatus::Active, ratings: vec![] },
            InputDoc { id: -1, text: "dog".into(), status: DocumentStatus::Active, ratings: vec![] },
            InputDoc { id: 0, text: "owl".into(), status: DocumentStatus::Active, ratings: vec![] },
            InputDoc { id: 2, text: "b\u{2}d".into(), status: DocumentStatus::Active, ratings: vec![] },
        ];
        let mut server = SearchServer::from_stop_words_text("");
        assert_eq!(add_documents(&mut server, &docs), 1);
        assert_eq!(server.document_count(), 1);
    }

    #[test]
    fn queries_skip_blank_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("queries.txt");
        fs::write(&path, "cat\n\n  \nfluffy -dog\n").unwrap();
        assert_eq!(read_queries(&path).unwrap(), vec!["cat", "fluffy -dog"]);
    }
}
