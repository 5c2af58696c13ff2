//! Pipeline stages for PDF-to-text transcription.
//!
//! Each submodule implements exactly one step, so each can be tested without
//! a real PDF.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ normalize ──▶ assemble ──▶ write
//! (path)    (pdfium)    (cleanup)     (join)       (atomic)
//! ```
//!
//! 1. [`input`]    : validate the user-supplied path before pdfium sees it
//! 2. [`extract`]  : pull raw text per selected page, flag pages without text
//! 3. [`normalize`]: repair wrapped lines while keeping paragraph breaks
//! 4. [`assemble`] : join kept pages with the page separator
//! 5. [`write`]    : replace the output file in one rename

pub mod assemble;
pub mod extract;
pub mod input;
pub mod normalize;
pub mod write;
