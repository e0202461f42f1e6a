//! Markdown document handling
//!
//! - `tokenizer`: line and heading tokenizer, fence aware
//! - `merge`: splices a rendered entry block into an existing document

mod merge;
mod tokenizer;

pub use merge::merge;
pub use tokenizer::{parse_heading, tokenize, Heading, Line};
