//! Web layer for the departure board.
//!
//! Exposes the board, the station catalog and the user actions as a JSON
//! API.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
