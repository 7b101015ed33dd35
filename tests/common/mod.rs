#![allow(dead_code)]

pub mod builders;

pub use builders::provider::{ProviderHandle, Step, TestProvider, TestProviderBuilder};
pub use builders::settings::TestSettingsBuilder;
