pub mod text;

pub use text::{excerpt_words, like_pattern, normalize_search, strip_tags};
