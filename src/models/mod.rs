pub mod forecast;
pub mod preferences;
pub mod weather;

pub use forecast::*;
pub use preferences::*;
pub use weather::*;
