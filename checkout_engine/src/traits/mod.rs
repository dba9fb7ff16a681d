//! #  Storage and gateway contracts.
//!
//! This module defines the interfaces that back the checkout engine.
//!
//! * [`InventoryManagement`] is the inventory ledger: products and their stock/reserved counters, mutated only
//!   through atomic reserve, release and commit operations.
//! * [`CheckoutDatabase`] persists transactions and owns the finalization protocol, the single chokepoint through
//!   which every status change and every post-checkout stock effect passes.
//! * [`PaymentGateway`] is the port to the external payment processor.
mod checkout_database;
mod inventory_management;
mod payment_gateway;

mod data_objects;

pub use checkout_database::{CheckoutDatabase, CheckoutDatabaseError};
pub use data_objects::{FinalizeResult, StockEffect, SweepResult};
pub use inventory_management::{InventoryError, InventoryManagement};
pub use payment_gateway::{GatewayError, PaymentGateway};
