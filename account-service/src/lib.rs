//! Account Service - account ledger with balances, transfers and PIN checks.

pub mod config;
pub mod models;
pub mod services;
pub mod startup;
