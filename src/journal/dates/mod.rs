//! Clock abstraction and date selection.

pub mod clock;
pub mod resolver;

pub use clock::{Clock, FixedClock, SystemClock};
pub use resolver::{DateResolver, DateSelector, parse_date};
