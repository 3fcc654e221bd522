//! Helper functions shared by content rendering and page views

mod date;
mod html;
mod pagination;
mod url;

pub use date::*;
pub use html::*;
pub use pagination::Pagination;
pub use url::*;
