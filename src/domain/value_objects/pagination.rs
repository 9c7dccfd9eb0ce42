//! Limit/offset pagination for list queries

/// Page size used when the caller does not ask for one (or asks for zero)
pub const DEFAULT_LIMIT: u32 = 10;

/// Largest page a caller may request; bigger limits are clamped
pub const MAX_LIMIT: u32 = 50;

/// A normalised page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: u32,
    pub offset: u32,
}

impl Pagination {
    pub fn new(limit: Option<u32>, offset: Option<u32>) -> Self {
        let limit = match limit {
            None | Some(0) => DEFAULT_LIMIT,
            Some(limit) => limit.min(MAX_LIMIT),
        };
        Self {
            limit,
            offset: offset.unwrap_or(0),
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None)
    }
}
