//! IPC client for the header generation service.

pub mod client;
pub mod types;

pub use client::IpcClient;
pub use types::{GenerateDocHeaderRequest, GenerateDocHeaderResponse};
