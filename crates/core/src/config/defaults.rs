//! Default values and functions for configuration

// Default constants
pub(crate) const DEFAULT_SERVER_SELECTION_TIMEOUT_MS: u64 = 5_000;
pub(crate) const DEFAULT_OPERATION_TIMEOUT_SECS: u64 = 60;

/// Collections owned by the storefront application
pub(crate) const DEFAULT_COLLECTIONS: &[&str] = &[
    "users",
    "products",
    "categories",
    "carts",
    "orders",
    "reviews",
    "wishlists",
    "coupons",
];

pub(crate) fn default_server_selection_timeout_ms() -> u64 {
    DEFAULT_SERVER_SELECTION_TIMEOUT_MS
}

pub(crate) fn default_operation_timeout_secs() -> u64 {
    DEFAULT_OPERATION_TIMEOUT_SECS
}

pub(crate) fn default_collections() -> Vec<String> {
    DEFAULT_COLLECTIONS.iter().map(|c| c.to_string()).collect()
}
