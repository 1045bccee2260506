//! Page structure extraction
//!
//! This module isolates the pieces of a scraped page the crawler cares
//! about:
//! - The main content subtree (container selectors with a body fallback)
//! - The calendar date the reading belongs to
//! - The link to the next page in the book

mod content;
mod date;
mod next_link;

pub use content::{element_text, escape_text, extract_content, ContentRegion};
pub use date::{extract_date, extract_date_in_year};
pub use next_link::resolve_next;
