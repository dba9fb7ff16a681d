mod cents;
mod helpers;
mod secret;

pub mod op;

pub use cents::{Cents, CentsConversionError, CHECKOUT_CURRENCY_CODE};
pub use helpers::parse_boolean_flag;
pub use secret::Secret;
