//! Wallet ledger: available/held balances per customer wallet, mutated only
//! through a pure engine and persisted through a narrow document-store port.

pub mod aggregator;
pub mod api;
pub mod config;
pub mod dlq;
pub mod domain;
pub mod engine;
pub mod history;
pub mod ingestion;
pub mod locks;
pub mod processor;
pub mod service;
pub mod store;
