pub mod node_cache;
pub mod singleflight;

pub use node_cache::NodeCache;
pub use singleflight::{FlightKey, LoadFlights};
