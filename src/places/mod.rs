//! Place catalog service layer.
//!
//! # Components
//!
//! - [`PlaceService`]: Entry point for listing and recommendation requests
//! - [`Paginator`]: Page validation and metadata
//! - [`Place`]: Catalog record returned to clients
//! - [`PagedResult`]: One listing page plus metadata

mod model;
mod paginator;
mod service;

pub use model::{PagedResult, Place};
pub use paginator::{last_page, Paginator, DEFAULT_MAX_RESULT_WINDOW, DEFAULT_PAGE_SIZE};
pub use service::PlaceService;
