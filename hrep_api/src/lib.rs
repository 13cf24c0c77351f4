mod client;
mod errors;
mod listing;
mod rows;
pub mod types;
mod user_agent;
pub use self::client::Client;
pub use self::errors::Error;
pub use self::listing::extract_row_ids;
pub use self::rows::{extract_rows, RowUnit};
pub use self::user_agent::get_user_agent;
