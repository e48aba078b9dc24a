use anyhow::{Context, Result};
use devicelog_indexer::InputDocument;
use serde_json::Value;
use std::io::Read;
use std::path::PathBuf;

pub struct Source {
    pub name: String,
    pub text: String,
}

/// Read every input file, or stdin when none are given.
pub fn read_sources(files: &[PathBuf]) -> Result<Vec<Source>> {
    if files.is_empty() {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read stdin")?;
        return Ok(vec![Source {
            name: "<stdin>".to_string(),
            text,
        }]);
    }

    files
        .iter()
        .map(|path| {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Ok(Source {
                name: path.display().to_string(),
                text,
            })
        })
        .collect()
}

/// Split a source into documents. Accepts a single document, a JSON array of
/// documents, or whitespace separated documents (NDJSON).
///
/// A syntax error ends the source, since the stream cannot resynchronize.
pub fn decode_documents(text: &str) -> Vec<devicelog_indexer::Result<InputDocument>> {
    let mut out = Vec::new();
    for value in serde_json::Deserializer::from_str(text).into_iter::<Value>() {
        match value {
            Ok(Value::Array(items)) => out.extend(items.into_iter().map(InputDocument::from_value)),
            Ok(other) => out.push(InputDocument::from_value(other)),
            Err(err) => {
                out.push(Err(err.into()));
                break;
            }
        }
    }
    out
}
