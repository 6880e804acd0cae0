//! Domain type definitions.

pub mod email;
pub mod id;
pub mod key;
pub mod postal;
pub mod status;
pub mod window;
