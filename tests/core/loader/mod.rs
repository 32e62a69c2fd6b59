//! Loader tests
//!
//! Complete loads against the in-memory cluster.

mod test_end_to_end;
