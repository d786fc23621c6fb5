pub mod session;

pub use session::{ForecastSession, Providers, SessionOptions, SessionSnapshot};
