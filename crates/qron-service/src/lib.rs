//! QRON HTTP API Service.
//!
//! This crate provides the HTTP API for the QRON storefront, including:
//!
//! - QRON generation (entitlement gate + render/style pipeline)
//! - Mode / preset / plan catalog
//! - Hosted checkout and payment webhooks
//! - QRON organization (folders, tags, schedules, redirect rules)
//! - Public scan tracking and redirects
//!
//! # Authentication
//!
//! End-user requests carry RS256 JWTs from the identity provider, validated
//! against its JWKS endpoint. The checkout route also accepts unauthenticated
//! guest purchases; webhooks authenticate by signature instead.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Handlers need async for routing consistency

pub mod auth;
pub mod config;
pub mod email;
pub mod error;
pub mod fal;
pub mod gate;
pub mod handlers;
pub mod qr;
pub mod routes;
pub mod state;
pub mod stripe;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
pub use stripe::{StripeClient, StripeError};
