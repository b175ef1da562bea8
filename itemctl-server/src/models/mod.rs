//! Domain models with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod validation;
pub mod item;
pub mod search;
pub mod stats;
pub mod pagination;

pub use validation::ValidationError;
pub use item::{InvalidId, Item, ItemId, ItemName, ItemPayload, NewItem, MAX_NAME_LEN};
pub use search::{SearchParams, SearchQuery};
pub use stats::{Diagnostics, ItemStats, PoolStats};
pub use pagination::{coerce_positive, PageMeta, Paginated, Pagination, PaginationParams};
