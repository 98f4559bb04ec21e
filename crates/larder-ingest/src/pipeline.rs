//! The receipt-ingestion pipeline: image → names → classified drafts.
//!
//! Persisting the drafts is the reconciler's job
//! (`larder_core::db::items::upsert_batch`); this module only carries data
//! between the collaborators.

use crate::classify::Classifier;
use crate::extract::ReceiptOcr;
use anyhow::Result;
use larder_core::model::ItemDraft;
use tracing::info;

/// Run OCR and classification over a receipt image, yielding reconciler
/// input.
///
/// # Errors
///
/// Propagates extraction and classification failures.
pub fn ingest_receipt(
    image: &[u8],
    ocr: &dyn ReceiptOcr,
    classifier: &dyn Classifier,
) -> Result<Vec<ItemDraft>> {
    let names = ocr.extract(image)?;
    if names.is_empty() {
        info!("receipt produced no ingredient names");
        return Ok(Vec::new());
    }

    let classified = classifier.classify(&names)?;
    info!(
        extracted = names.len(),
        classified = classified.len(),
        "ingested receipt"
    );
    Ok(classified.into_iter().map(ItemDraft::from).collect())
}
