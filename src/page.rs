//! Loading pages, selections and stored fingerprints from disk

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use dom_snapshot::{Document, NodeId};
use tokio::fs;
use tracing::debug;

/// Read and parse an HTML snapshot.
pub async fn load_document(path: &Path) -> Result<Document> {
    let html = fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let doc = Document::parse_html(&html)
        .with_context(|| format!("parsing HTML in {}", path.display()))?;
    debug!(path = %path.display(), nodes = doc.len(), "Loaded document");
    Ok(doc)
}

/// The `index`-th (0-based) element matching `selector`.
pub fn select_element(doc: &Document, selector: &str, index: usize) -> Result<NodeId> {
    let matches = doc
        .query_selector_all(selector)
        .with_context(|| format!("invalid selector '{selector}'"))?;
    match matches.get(index) {
        Some(node) => Ok(*node),
        None if matches.is_empty() => bail!("selector '{selector}' matched no element"),
        None => bail!(
            "selector '{selector}' matched {} element(s); index {index} is out of range",
            matches.len()
        ),
    }
}

/// Serialized fingerprint from an inline argument or a file.
pub async fn read_fingerprint(inline: Option<String>, file: Option<&PathBuf>) -> Result<String> {
    match (inline, file) {
        (Some(raw), None) => Ok(raw),
        (None, Some(path)) => fs::read_to_string(path)
            .await
            .map(|raw| raw.trim().to_string())
            .with_context(|| format!("reading {}", path.display())),
        (Some(_), Some(_)) => bail!("pass either --fingerprint or --fingerprint-file, not both"),
        (None, None) => bail!("a fingerprint is required (--fingerprint or --fingerprint-file)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_element_errors() {
        let doc = Document::parse_html("<body><p>a</p><p>b</p></body>").unwrap();
        assert!(select_element(&doc, "p", 1).is_ok());
        let err = select_element(&doc, "p", 5).unwrap_err().to_string();
        assert!(err.contains("out of range"));
        let err = select_element(&doc, "table", 0).unwrap_err().to_string();
        assert!(err.contains("matched no element"));
        assert!(select_element(&doc, "p[", 0).is_err());
    }

    #[tokio::test]
    async fn test_read_fingerprint_sources() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fp.json");
        tokio::fs::write(&path, "{\"tagName\":\"p\"}\n").await.unwrap();

        let from_file = read_fingerprint(None, Some(&path)).await.unwrap();
        assert_eq!(from_file, "{\"tagName\":\"p\"}");
        assert_eq!(read_fingerprint(Some("x".into()), None).await.unwrap(), "x");
        assert!(read_fingerprint(None, None).await.is_err());
        assert!(read_fingerprint(Some("x".into()), Some(&path)).await.is_err());
    }
}
