use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{LcError, Result};
use crate::tokenize::count_tokens;

/// One loaded document: extracted text plus its token count.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub name: String,
    pub text: String,
    pub tokens: usize,
}

/// All loaded documents concatenated into a single model context.
///
/// The combined text joins documents in load order, each prefixed with a
/// boundary header so the model sees provenance. Rebuilt wholesale on
/// reload; never partially mutated.
#[derive(Debug, Clone, Serialize)]
pub struct Corpus {
    pub documents: Vec<Document>,
    pub combined_text: String,
    pub total_tokens: usize,
}

impl Corpus {
    /// Assemble a corpus from already-extracted documents.
    ///
    /// Deterministic: the same documents in the same order always produce
    /// the same combined text and token totals.
    pub fn from_documents(documents: Vec<Document>) -> Self {
        let mut combined = String::new();
        for doc in &documents {
            combined.push_str(&format!("\n\n=== Document: {} ===\n\n", doc.name));
            combined.push_str(&doc.text);
        }
        let total_tokens = count_tokens(&combined);
        Self {
            documents,
            combined_text: combined,
            total_tokens,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Extract plain text from one PDF.
fn extract_document(path: &Path) -> Result<Document> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let text = pdf_extract::extract_text(path).map_err(|e| LcError::Extraction {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    if text.trim().is_empty() {
        return Err(LcError::Extraction {
            path: path.to_path_buf(),
            reason: "no extractable text (scanned or image-only PDF?)".into(),
        });
    }

    let tokens = count_tokens(&text);
    tracing::debug!(name = %name, chars = text.len(), tokens, "extracted document");
    Ok(Document { name, text, tokens })
}

/// Load documents from explicit paths, in the order given.
///
/// Idempotent: calling again with the same paths reproduces the same
/// corpus. Any unreadable or text-free file aborts the whole load.
pub fn load(paths: &[PathBuf]) -> Result<Corpus> {
    let documents = paths
        .iter()
        .map(|p| extract_document(p))
        .collect::<Result<Vec<_>>>()?;
    Ok(Corpus::from_documents(documents))
}

/// Load every `*.pdf` in a directory, sorted by file name.
pub fn load_dir(dir: &Path) -> Result<Corpus> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| LcError::Io(format!("{}: {e}", dir.display())))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
        })
        .collect();
    paths.sort();

    if paths.is_empty() {
        return Err(LcError::Io(format!(
            "no PDF documents found in {}",
            dir.display()
        )));
    }
    load(&paths)
}
