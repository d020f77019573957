mod startup;
mod state;

pub use startup::{start, start_with_listener};
pub use state::AppState;
