//! # Checkout server
//! This crate hosts the HTTP front end of the checkout engine, and the background workers that keep it honest. It is
//! responsible for:
//! * Serving the product catalog and accepting checkouts.
//! * Receiving payment status webhooks from the payment gateway.
//! * Polling the gateway for payments that have not settled yet ([`poll_worker`]).
//! * Voiding reservations that were never paid for ([`expiry_worker`]).
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `GET /api/products`, `GET /api/products/{id}`: The catalog, with the units still available for each product.
//! * `POST /api/checkout`: Reserves stock and starts a card payment.
//! * `GET /api/transactions/{id}`: The current status of a purchase.
//! * `POST /api/webhooks/gateway`: The webhook route for payment status events from the gateway.

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod expiry_worker;
pub mod integrations;
pub mod poll_worker;
pub mod routes;
pub mod server;
