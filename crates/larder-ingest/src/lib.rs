//! larder-ingest library.
//!
//! The external-collaborator boundary: receipt OCR, item classification,
//! and recipe suggestions. Each collaborator is a trait so the pipeline and
//! the CLI stay testable offline; the provided implementations speak the
//! OpenAI-compatible chat-completions protocol over blocking HTTP.

pub mod classify;
pub mod extract;
pub mod fence;
pub mod openai;
pub mod pipeline;
pub mod recipes;
