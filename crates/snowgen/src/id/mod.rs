mod error;
mod layout;
mod snowflake;

pub use error::*;
pub use snowflake::*;
