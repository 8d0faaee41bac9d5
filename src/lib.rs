//! kiosk_pipeline - validates museum kiosk interactions and stores them in batches
//!
//! Messages arrive from a broker topic, are decoded and validated, and
//! accepted ones accumulate until a batch is full. A full batch is split
//! into visitor ratings and assistance requests and written to one table
//! each.

pub mod batch;
pub mod broker;
pub mod cli;
pub mod config;
pub mod ingest;
pub mod message;
pub mod observability;
pub mod routing;
pub mod store;
pub mod validation;
