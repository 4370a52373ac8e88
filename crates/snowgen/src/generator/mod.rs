mod builder;
mod mutex;
mod policy;
mod state;
#[cfg(test)]
mod tests;
mod worker;

pub use builder::*;
pub(crate) use mutex::*;
pub use policy::*;
pub use worker::*;
