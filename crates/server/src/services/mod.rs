//! Business services sitting between the HTTP handlers and the
//! repositories.

pub mod members;
pub mod orders;
pub mod products;

pub use members::{MemberError, MemberService};
pub use orders::{OrderError, OrderRequest, OrderService, RequestedItem};
pub use products::{ProductError, ProductService};
