pub mod client;
pub mod graphql;
pub mod headers;
pub mod session;

pub use client::{ScraperApi, StashClient};
pub use graphql::ScrapedObject;
