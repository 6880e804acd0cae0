//! Shared domain types for the beanhouse cafe backend.
//!
//! Everything in this crate is pure data: no I/O, no clocks, no database
//! handles. Time-dependent logic ([`DeliveryStatus::at`],
//! [`OrderWindow::containing`]) takes the reference instant as a parameter
//! so callers decide what "now" means.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::email::{Email, EmailError};
pub use types::key::ApiKey;
pub use types::postal::{PostalCode, PostalCodeError};
pub use types::status::{DISPATCH_CUTOFF, DeliveryStatus};
pub use types::window::OrderWindow;

pub use types::id::{MemberId, OrderId, ProductId};
