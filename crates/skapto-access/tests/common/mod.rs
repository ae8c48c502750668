//! Common test utilities for skapto-access integration tests

pub mod fixtures;
pub mod mock_provider;

#[allow(unused_imports)]
pub use fixtures::*;
#[allow(unused_imports)]
pub use mock_provider::MockCommerceProvider;
