pub mod config;

// Test helpers module - available for both development and test builds
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

#[cfg(any(test, feature = "test-helpers"))]
pub use test_helpers::{
    generate_unique_id, generate_unique_test_id, get_test_database_url,
    get_test_in_memory_database_url,
};
