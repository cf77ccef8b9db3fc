pub mod client;
pub mod types;

pub use client::{CLOUDFLARE_API_BASE, CloudflareClient};
