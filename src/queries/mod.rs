//! Query modules for the stock-mentions SDK.
//!
//! Each module provides a query struct that borrows from a
//! [`Connection`](crate::connection::Connection) and exposes methods
//! returning `Result<T>` with typed model payloads.

pub mod mentions;
pub mod prices;

pub use mentions::MentionQuery;
pub use prices::PriceQuery;
