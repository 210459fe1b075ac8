mod money;

pub mod op;

mod helpers;

pub use helpers::trimmed_non_empty;
pub use money::{Money, MoneyConversionError};
