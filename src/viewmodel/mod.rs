//! Presentation state over the portal: list views and CRUD dialogs.
//!
//! Both are generic over the entity kind, so one implementation serves every
//! record type. The HTTP layer drives a fresh list view per request.

mod dialog;
mod list;

pub use dialog::*;
pub use list::*;
