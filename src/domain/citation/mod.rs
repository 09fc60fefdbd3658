//! Citation linking

pub mod linker;

pub use linker::{Citation, CitationLinker};
