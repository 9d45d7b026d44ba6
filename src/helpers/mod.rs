//! Helper functions for loosely-typed export values
//!
//! Ghost exports are not consistent about how they encode flags, ids and
//! timestamps across versions, so the coercions live here and are shared by
//! the content and command layers.

mod coerce;
mod date;
mod url;

pub use coerce::*;
pub use date::*;
pub use url::*;
