//! Value objects - Immutable objects defined by their attributes

mod ids;
mod pagination;

pub use ids::{CharacterId, HouseId};
pub use pagination::{Pagination, DEFAULT_LIMIT, MAX_LIMIT};
