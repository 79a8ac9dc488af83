mod birr;
mod helpers;

pub mod op;
mod secret;

pub use birr::{Birr, BirrConversionError, ETB_CURRENCY_CODE, ETB_CURRENCY_CODE_LOWER};
pub use helpers::parse_boolean_flag;
pub use secret::Secret;
