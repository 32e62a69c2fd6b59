// Common test utilities and fixtures

pub mod fixtures;
pub mod helpers;

// Re-export commonly used items
// Note: These may appear unused in some test binaries but are used in others
#[allow(unused_imports)]
pub use fixtures::{message, MailCorpus, BAD_DATES, VALID_DATE};
#[allow(unused_imports)]
pub use helpers::{bulk_sizes, load_into, test_config, write_config};
