//! Subcommand implementations.
//!
//! Every command rebuilds the index from the corpus directory before
//! doing its work. A corpus directory holds either a `pages.jsonl` file
//! (one [`PageText`] record per line) or plain-text page files named
//! `<document>.p<N>.txt`, where `<document>` is the source file name the
//! partition map knows (`IBM PurchaseTerms.pdf.p3.txt` is page 3 of
//! `IBM PurchaseTerms.pdf`).

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use docket_core::corpus::{prepare_chunks, PageText};
use docket_core::embedding::HashedEmbedding;
use docket_core::search::HybridIndex;
use tracing::{info, warn};

use crate::output;

/// Loads page records from a corpus directory.
///
/// Pages are sorted by document and page number so ingest order, and
/// with it tie-break order, does not depend on directory iteration.
pub fn load_pages(dir: &Path) -> Result<Vec<PageText>> {
    if !dir.is_dir() {
        bail!("Corpus path {} is not a directory", dir.display());
    }

    let jsonl = dir.join("pages.jsonl");
    let mut pages = if jsonl.is_file() {
        read_jsonl(&jsonl)?
    } else {
        read_page_files(dir)?
    };
    if pages.is_empty() {
        bail!(
            "No pages found in {} (expected pages.jsonl or <document>.p<N>.txt files)",
            dir.display()
        );
    }
    pages.sort_by(|a, b| {
        (a.document_name.as_str(), a.page_no).cmp(&(b.document_name.as_str(), b.page_no))
    });
    Ok(pages)
}

fn read_jsonl(path: &Path) -> Result<Vec<PageText>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let mut pages = Vec::new();
    for (line_no, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let page: PageText = serde_json::from_str(line).with_context(|| {
            format!("Malformed page record at {}:{}", path.display(), line_no + 1)
        })?;
        pages.push(page);
    }
    Ok(pages)
}

fn read_page_files(dir: &Path) -> Result<Vec<PageText>> {
    let mut pages = Vec::new();
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        let Some(stem) = name.strip_suffix(".txt") else {
            continue;
        };
        let Some((document_name, page_no)) = parse_page_name(stem) else {
            warn!(file = %path.display(), "Skipping file without a .p<N>.txt suffix");
            continue;
        };
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        pages.push(PageText {
            document_name,
            page_no,
            text,
        });
    }
    Ok(pages)
}

/// Splits `IBM PurchaseTerms.pdf.p3` into the document name and page
/// number.
fn parse_page_name(stem: &str) -> Option<(String, u32)> {
    let (document, page) = stem.rsplit_once(".p")?;
    let page_no: u32 = page.parse().ok()?;
    if document.is_empty() || page_no == 0 {
        return None;
    }
    Some((document.to_string(), page_no))
}

/// Builds a fresh in-memory index from a corpus directory.
pub async fn build_index(dir: &Path) -> Result<HybridIndex> {
    let pages = load_pages(dir)?;
    let chunks = prepare_chunks(pages);
    info!(chunks = chunks.len(), "Prepared corpus");

    let index = HybridIndex::new(Arc::new(HashedEmbedding::default()));
    index
        .ingest(chunks, None)
        .await
        .context("Failed to ingest corpus")?;
    Ok(index)
}

pub async fn run_ingest(dir: &Path) -> Result<()> {
    let index = build_index(dir).await?;

    println!("Indexed partitions:");
    for partition in index.partitions()? {
        println!("  {}: {} chunks", partition, index.partition_len(&partition)?);
    }
    println!("Total: {} chunks", index.len()?);
    Ok(())
}

pub async fn run_search(
    query: &str,
    corpus: &Path,
    partition: &str,
    limit: usize,
    alpha: f32,
    json: bool,
) -> Result<()> {
    let index = build_index(corpus).await?;
    let results = index
        .search(query, partition, limit, alpha, None)
        .await
        .context("Search failed")?;

    let rendered = if json {
        output::format_json(query, partition, &results)
    } else {
        output::format_human(query, partition, &results)
    };
    println!("{rendered}");
    Ok(())
}

pub async fn run_partitions(corpus: &Path) -> Result<()> {
    let index = build_index(corpus).await?;
    for partition in index.partitions()? {
        println!("{}\t{}", partition, index.partition_len(&partition)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_page_name_splits_document_and_page() {
        assert_eq!(
            parse_page_name("IBM PurchaseTerms.pdf.p3"),
            Some(("IBM PurchaseTerms.pdf".to_string(), 3))
        );
    }

    #[test]
    fn parse_page_name_rejects_bad_suffixes() {
        assert_eq!(parse_page_name("notes"), None);
        assert_eq!(parse_page_name("notes.pdf.pX"), None);
        assert_eq!(parse_page_name("notes.pdf.p0"), None);
        assert_eq!(parse_page_name(".p1"), None);
    }

    #[test]
    fn load_pages_reads_txt_files_in_document_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.pdf.p2.txt"), "second page").unwrap();
        std::fs::write(dir.path().join("b.pdf.p1.txt"), "first page").unwrap();
        std::fs::write(dir.path().join("a.pdf.p1.txt"), "other document").unwrap();
        std::fs::write(dir.path().join("README.md"), "ignored").unwrap();

        let pages = load_pages(dir.path()).unwrap();

        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].document_name, "a.pdf");
        assert_eq!(pages[1].page_no, 1);
        assert_eq!(pages[2].page_no, 2);
        assert_eq!(pages[2].text, "second page");
    }

    #[test]
    fn load_pages_prefers_jsonl_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let records = concat!(
            r#"{"document_name":"d.pdf","page_no":2,"text":"page two"}"#,
            "\n",
            r#"{"document_name":"d.pdf","page_no":1,"text":"page one"}"#,
            "\n",
        );
        std::fs::write(dir.path().join("pages.jsonl"), records).unwrap();
        std::fs::write(dir.path().join("ignored.pdf.p1.txt"), "not read").unwrap();

        let pages = load_pages(dir.path()).unwrap();

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].page_no, 1);
        assert_eq!(pages[0].text, "page one");
    }

    #[test]
    fn load_pages_rejects_malformed_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("pages.jsonl"), "not json\n").unwrap();

        assert!(load_pages(dir.path()).is_err());
    }

    #[test]
    fn empty_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();

        assert!(load_pages(dir.path()).is_err());
    }

    #[tokio::test]
    async fn build_index_partitions_by_document_name() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("IBM PurchaseTerms.pdf.p1.txt"),
            "Limited warranty terms.",
        )
        .unwrap();
        std::fs::write(dir.path().join("Handbook.pdf.p1.txt"), "General notes.").unwrap();

        let index = build_index(dir.path()).await.unwrap();

        assert_eq!(
            index.partitions().unwrap(),
            vec!["IBM_PurchaseTerms".to_string(), "general".to_string()]
        );
        assert_eq!(index.partition_len("IBM_PurchaseTerms").unwrap(), 1);
    }
}
