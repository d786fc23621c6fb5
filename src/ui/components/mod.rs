pub mod gauge;
pub mod message;
pub mod search_bar;

pub use gauge::{precipitation_gauge, temperature_gauge, wind_gauge};
pub use message::StateMessage;
pub use search_bar::{SearchBar, SuggestionList};
