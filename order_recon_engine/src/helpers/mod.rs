mod order_number;

pub use order_number::{new_order_number, DEFAULT_ORDER_PREFIX};

mod email;

pub use email::is_valid_email;
