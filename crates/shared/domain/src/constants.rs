//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// User Roles
// =============================================================================

/// Default role assigned to new users
pub const ROLE_USER: &str = "user";

/// Administrator role, granted only through the email allow-list
pub const ROLE_ADMIN: &str = "admin";

// =============================================================================
// Order Status
// =============================================================================

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_PREPARING: &str = "preparing";
pub const STATUS_COMPLETED: &str = "completed";
pub const STATUS_REJECTED: &str = "rejected";
pub const STATUS_CANCELLED: &str = "cancelled";

/// `cancelledBy` value for a cancellation made by the order owner
pub const CANCELLED_BY_GUEST: &str = "guest";

/// `cancelledBy` value for a cancellation recorded by staff
pub const CANCELLED_BY_ADMIN: &str = "admin";

// =============================================================================
// Tracking
// =============================================================================

/// Seconds per minute (preparation countdown seeding)
pub const SECONDS_PER_MINUTE: u64 = 60;
