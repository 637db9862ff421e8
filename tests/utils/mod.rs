pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use setup::{
    form_request, json_request, profile_with_header, profile_without_token, TestApp, TEST_SECRET,
};
