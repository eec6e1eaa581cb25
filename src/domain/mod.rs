// Domain layer: roster, coordinates, and saved locations.

pub mod errors;
pub mod locations;
pub mod ports;
pub mod position;
pub mod roster;

pub use errors::LocationError;
pub use locations::SavedLocation;
pub use position::Position;
pub use roster::{EntityState, Projection, Roster};
