//! ad-core: stable foundation for the digester simulator.
//!
//! Contains:
//! - error (shared error types)
//! - numeric (Real + tolerances + float helpers)
//! - units (uom time/volume constructors)
//! - layout (ADM1 compartment indexing)
//! - state (fixed-dimension reactor state vector)
//! - time (validated simulation time grid)
//! - chemistry (acid-base and gas-phase equilibria)
//! - reactor (vessel geometry and liquid-gas exchange)

pub mod chemistry;
pub mod error;
pub mod layout;
pub mod numeric;
pub mod reactor;
pub mod state;
pub mod time;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use chemistry::{AcidBaseTotals, Chemistry, Speciation};
pub use error::{AdError, AdResult};
pub use layout::{Compartment, INFLUENT_DIM, LIQUID_DIM, Q_INDEX, STATE_DIM};
pub use numeric::*;
pub use reactor::{GasExchange, ReactorParams};
pub use state::ReactorState;
pub use time::TimeGrid;
