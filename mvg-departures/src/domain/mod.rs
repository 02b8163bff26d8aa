//! Domain types for the departure board.
//!
//! These types represent validated transit data. Identifiers enforce their
//! invariants at construction time; records are immutable once built.

mod departure;
mod station;
mod transport;

pub use departure::{Departure, DepartureSnapshot, Occupancy};
pub use station::{GlobalId, InvalidGlobalId, LocationType, PinnedStation, Station};
pub use transport::TransportType;
