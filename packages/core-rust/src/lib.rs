//! `ichor` core: the error taxonomy and request primitives shared by every
//! domain, plus the delegate event bus.
//!
//! Nothing in this crate performs IO. The server crate builds the business,
//! storage, and HTTP layers on top of these primitives.

pub mod context;
pub mod delegate;
pub mod errs;
pub mod filter;
pub mod order;
pub mod page;
pub mod query;
pub mod serde_ext;

pub use context::RequestContext;
pub use delegate::{Action, Delegate, DelegateError, EventData, EventHandler};
pub use errs::{Error, ErrorKind, FieldError, FieldErrors};
pub use filter::FilterParser;
pub use order::{Direction, OrderBy};
pub use page::Page;
pub use query::QueryResult;

