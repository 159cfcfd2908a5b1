//! Core types, rotation rules and the recommendation engine for furrow.
//!
//! This crate is deliberately free of HTTP and database dependencies. Storage
//! backends implement [`store::HistoryStore`] and [`store::FeedbackStore`];
//! weather sources implement [`weather::WeatherProvider`].

// Store impls write `async fn`; the trait signatures spell out the `Send` bound.
#![allow(async_fn_in_trait)]

pub mod climate;
pub mod crop;
pub mod engine;
pub mod error;
pub mod memory;
pub mod rules;
pub mod store;
pub mod weather;

pub use error::{Error, Result};

#[cfg(test)]
mod tests;
