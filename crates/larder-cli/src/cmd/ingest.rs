//! `ldr ingest` — receipt image → OCR → classification → reconciler.

use super::{CmdContext, resolve_account};
use crate::output::render;
use anyhow::{Context as _, Result};
use clap::Args;
use larder_core::db::items;
use larder_ingest::classify::OpenAiClassifier;
use larder_ingest::extract::OpenAiVision;
use larder_ingest::pipeline::ingest_receipt;
use std::io::Write as _;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Acting account (defaults to $LARDER_USER).
    #[arg(long)]
    pub user: Option<String>,

    /// Path to the receipt image.
    #[arg(short, long)]
    pub image: PathBuf,

    /// Print the classified drafts without saving anything.
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run_ingest(args: &IngestArgs, ctx: &CmdContext) -> Result<()> {
    let mut conn = ctx.open_existing_store()?;
    let account = resolve_account(&conn, args.user.as_deref())?;

    let image = std::fs::read(&args.image)
        .with_context(|| format!("read receipt image {}", args.image.display()))?;

    let ocr = OpenAiVision::from_config(&ctx.config.openai)?;
    let classifier = OpenAiClassifier::from_config(&ctx.config.openai)?;
    let drafts = ingest_receipt(&image, &ocr, &classifier)?;

    if args.dry_run {
        return render(ctx.output, &DraftView::from_drafts(&drafts), |view, w| {
            writeln!(w, "Would reconcile {} item(s):", view.len())?;
            for draft in view {
                writeln!(
                    w,
                    "  {} [{} > {}] shelf life: {}",
                    draft.item_name, draft.major_name, draft.sub_name, draft.expiry_text
                )?;
            }
            Ok(())
        });
    }

    let saved = items::upsert_batch(&mut conn, account.user_id, &drafts, &ctx.parser())?;
    render(ctx.output, &saved, |saved, w| {
        writeln!(w, "Reconciled {} item(s):", saved.len())?;
        for item in saved {
            let expiry = item
                .expiry_date
                .map_or_else(|| "indefinite".to_string(), |date| date.to_string());
            writeln!(
                w,
                "  #{} {} [{}] expires: {expiry}",
                item.item_id,
                item.item_name,
                item.category.path()
            )?;
        }
        Ok(())
    })
}

/// Serializable projection of drafts for `--dry-run` output.
#[derive(Debug, serde::Serialize)]
struct DraftView {
    item_name: String,
    major_name: String,
    sub_name: String,
    expiry_text: String,
}

impl DraftView {
    fn from_drafts(drafts: &[larder_core::model::ItemDraft]) -> Vec<Self> {
        drafts
            .iter()
            .map(|draft| Self {
                item_name: draft.item_name.clone(),
                major_name: draft.major_name.clone(),
                sub_name: draft.sub_name.clone(),
                expiry_text: draft.expiry_text.clone(),
            })
            .collect()
    }
}
