pub mod book;
pub mod page;

pub use book::{BookDocument, DocumentLocator, SlotError};
pub use page::{ExtractedPage, FetchOutcome, PageRequest};
