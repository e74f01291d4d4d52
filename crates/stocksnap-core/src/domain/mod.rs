//! # Domain Models
//!
//! Canonical stock reference types.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`StockRecord`] | One company's latest price, change and size figures |
//! | [`Snapshot`] | Non-empty, immutable record list with its capture time |
//! | [`Symbol`] | Validated ticker symbol |
//! | [`UtcDateTime`] | UTC timestamp |

mod record;
mod symbol;
mod timestamp;

pub use record::{Snapshot, StockRecord};
pub use symbol::Symbol;
pub use timestamp::UtcDateTime;
