pub mod book_writer;
pub mod extractor;
pub mod page_fetcher;
pub mod pagination;
pub mod retry;

pub use book_writer::BookWriter;
pub use extractor::{ContentExtractor, PAGE_SEPARATOR, PARAGRAPH_SEPARATOR};
pub use page_fetcher::{Admission, PageFetcher};
pub use pagination::PaginationResolver;
pub use retry::RetryPolicy;
