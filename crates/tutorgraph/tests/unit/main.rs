//! Unit-level tests against the public API.

mod relationship_store_test;
