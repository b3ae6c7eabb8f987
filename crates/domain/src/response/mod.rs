//! Response-side domain types

mod page;

pub use page::{Cursors, Page, Paging};
