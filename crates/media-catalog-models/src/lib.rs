pub mod format;
pub mod record;

pub use format::Format;
pub use record::{parse_currency_amount, split_list, MediaRecord};
