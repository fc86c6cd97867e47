//! Landed-cost estimation for steel shipments.
//!
//! The interesting part is tariff-rate resolution: an HTS code and a country
//! of origin become an applicable rate via a live lookup against the UK Trade
//! Tariff API, with a local reference table and a zero default behind it.
//! Everything around that — reading the uploaded CSV, the cost arithmetic,
//! sourcing suggestions, writing the computed table — hangs off `app::run`.

pub mod app;
pub mod domain;
pub mod infra;
pub mod logging;
