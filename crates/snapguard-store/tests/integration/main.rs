//! Integration tests for snapguard-store
//!
//! Uses wiremock to simulate the vault's object API and verifies
//! end-to-end behavior of the HttpBlobStore adapter.

mod common;

mod test_objects;
