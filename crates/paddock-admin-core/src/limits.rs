//! Resource limits for admin list operations.
//!
//! List screens page through whole collections held in memory, so page
//! sizes are bounded here rather than left to the caller.

/// Maximum page size for list views
///
/// Requests above this are clamped, not rejected.
/// Default: 500 records per page
pub const MAX_PAGE_SIZE: u64 = 500;

/// Default page size when not specified
pub const DEFAULT_PAGE_SIZE: u64 = 25;
