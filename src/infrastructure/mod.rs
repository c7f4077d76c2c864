pub mod document_source;
pub mod html_document;
pub mod shift_backend;

pub use document_source::DocumentReader;
pub use html_document::HtmlDocument;
pub use shift_backend::{JsonFileBackend, MemoryBackend, ShiftBackend};
