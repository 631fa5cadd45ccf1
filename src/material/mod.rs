mod filter_mode;
mod flags;
#[allow(clippy::module_inception)]
mod material;

pub use filter_mode::*;
pub use flags::*;
pub use material::*;
