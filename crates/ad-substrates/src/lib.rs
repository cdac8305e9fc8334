//! ad-substrates: substrate definition documents and the parameter database.
//!
//! A substrate carries up to three parameter groups (composition,
//! physical/chemical, kinetic). Documents are YAML or JSON; the database is
//! validated once on load and read-only afterwards.

pub mod database;
pub mod error;
pub mod schema;
pub mod symbols;

pub use database::{Cost, Parameter, ParameterSet, Substrate, SubstrateDatabase};
pub use error::{SubstrateError, SubstrateResult};
pub use schema::{CostDef, ParameterDef, SubstrateDef, SubstrateDocument};
pub use symbols::{ParamGroup, Symbol};
