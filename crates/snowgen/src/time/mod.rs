mod interface;
mod spin;
mod system_clock;

pub use interface::*;
pub use spin::*;
pub use system_clock::*;
