//! Trend sources.
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | trends24.in | [`trends24`] | HTML scraping | First card on the page is the latest hour |
//!
//! A scraper module exports:
//! - `parse_trends(html, limit)`: pure extraction, used by tests with fixtures
//! - `fetch_trends(client, url, limit)`: GET the page and parse it
//!
//! Failures are returned as [`crate::error::FetchError`]; nothing is retried.

pub mod trends24;
