//! Search domain module.
//!
//! # Module Structure
//!
//! - `filter`: search criteria and partial updates
//! - `pagination`: page cursor and page-cache key
//! - `favorites`: single-member favorite set

mod favorites;
mod filter;
mod pagination;

pub use favorites::FavoriteSet;
pub use filter::{
    DEFAULT_AGE_MAX, DEFAULT_AGE_MIN, DEFAULT_PAGE_SIZE, Filter, FilterUpdate, SortDirection,
    SortField, SortOrder,
};
pub use pagination::{PageCursor, PageKey, total_pages};
