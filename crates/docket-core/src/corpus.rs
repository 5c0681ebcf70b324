//! Chunk preparation for extracted agreement pages.
//!
//! PDF text extraction happens outside this crate and hands over one
//! [`PageText`] per page. This module maps documents onto their retrieval
//! partitions and turns pages into stably-identified [`Chunk`]s ready for
//! ingest.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::DEFAULT_PARTITION;
use crate::search::Chunk;

/// One page of extracted document text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageText {
    /// Source document file name
    pub document_name: String,
    /// 1-based page number
    pub page_no: u32,
    /// Raw extracted text
    pub text: String,
}

/// Document file names mapped to their retrieval partitions.
///
/// Documents absent from this table land in the default partition.
pub const PARTITION_MAP: [(&str, &str); 4] = [
    (
        "International Program License Agreement.pdf",
        "International_Program_License_Agreement",
    ),
    (
        "IBM Standard Terms and Conditions.pdf",
        "IBM_Standard_Terms_and_Conditions",
    ),
    (
        "International Agreement for Acquisition of Software Maintenance.pdf",
        "International_Agreement_for_Acquisition_of_Software_Maintenance",
    ),
    ("IBM PurchaseTerms.pdf", "IBM_PurchaseTerms"),
];

/// Partition for a document file name, falling back to the default.
pub fn partition_for(document_name: &str) -> &'static str {
    PARTITION_MAP
        .iter()
        .find(|(name, _)| *name == document_name)
        .map_or(DEFAULT_PARTITION, |(_, partition)| partition)
}

/// Builds ingest-ready chunks from extracted pages.
///
/// Blank pages are skipped and text is trimmed. Ids follow
/// `partition:document:page`, so preparing the same corpus twice yields
/// the same ids and re-ingesting it overwrites chunks in place instead of
/// duplicating them.
pub fn prepare_chunks(pages: Vec<PageText>) -> Vec<Chunk> {
    let mut chunks = Vec::with_capacity(pages.len());
    for page in pages {
        let text = page.text.trim();
        if text.is_empty() {
            debug!(
                document = %page.document_name,
                page = page.page_no,
                "Skipping blank page"
            );
            continue;
        }
        let partition = partition_for(&page.document_name);
        chunks.push(Chunk {
            id: format!("{}:{}:{}", partition, page.document_name, page.page_no),
            text: text.to_string(),
            document_name: page.document_name,
            page_no: page.page_no,
            partition: partition.to_string(),
        });
    }
    chunks
}
