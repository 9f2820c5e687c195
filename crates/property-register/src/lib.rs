//! Property register: owners, their real estate, annual property tax, and debtor
//! notification.

pub mod config;
pub mod error;
pub mod register;
pub mod telemetry;
