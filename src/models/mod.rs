pub mod time;
pub mod week;

pub use time::*;
pub use week::*;
