//! Payment gateway integration (Stripe-compatible API).

mod client;
mod signature;
mod types;

pub use client::{LineItem, StripeClient, StripeError};
pub use signature::sign_header;
pub use types::{CheckoutSession, StripeErrorDetail, StripeErrorResponse, WebhookEvent, WebhookEventData};
