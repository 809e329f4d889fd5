pub mod amount;
pub mod index_range;
pub mod percentage;
pub mod price;

pub use amount::Amount;
pub use index_range::Range;
pub use percentage::Percentage;
pub use price::Price;
