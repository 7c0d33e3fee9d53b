//! Contact extraction and validation.
//!
//! [`extract`] pulls loose contact candidates out of search snippets;
//! [`ContactValidator`] narrows them to entries that pass the stricter
//! formats. Both are pure; the validator is async only so the pipeline can
//! await every stage the same way.

pub mod extractor;
pub mod validator;

pub use extractor::{extract, guess_name};
pub use validator::ContactValidator;
