//! Request planning, fal.ai transport and result persistence for `gen`.

pub mod builder;
pub mod client;
pub mod credentials;
pub mod error;
pub mod output;

#[cfg(test)]
mod test_support;

pub use builder::{plan_request, GenerateOptions, RequestPlan, SizeResolution};
pub use client::FalClient;
pub use error::{GenError, Result};
