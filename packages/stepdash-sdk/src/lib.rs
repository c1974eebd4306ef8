pub mod client;
pub mod error;

pub use client::ReportClient;
pub use error::{SdkError, SdkResult};
pub use stepdash_core::*;
