//! # Order reconciliation server
//! This module hosts the HTTP front for the order reconciliation engine. It is responsible for:
//! Accepting order submissions from the storefront checkout.
//! Listening for incoming payment-confirmation webhook requests from the payment processor.
//! Exposing the admin surface: order listing, lifecycle transitions, statistics, the
//! reconciliation audit, and delete/restore.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/api/orders`: Order creation (POST) and listing (GET), plus `{id}`, `{id}/status`,
//!   `{id}/restore`, `stats` and `audit` sub-routes.
//! * `/webhook/payment_confirmed`: The webhook route for payment confirmations.

pub mod config;
pub mod data_objects;
pub mod errors;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
