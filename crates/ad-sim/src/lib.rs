//! Time-stepped simulation driver for the digester.
//!
//! Provides:
//! - `TransientModel` / `Integrator` seams with fixed-step RK4 and forward
//!   Euler, sub-dividing each grid interval
//! - `Kinetics` seam and a reduced ADM1 reference implementation
//! - `Simulator`: marches the time grid with piecewise-constant influent
//! - trace sinks, including a capacity-bounded buffered sink

pub mod adm1;
pub mod error;
pub mod integrator;
pub mod kinetics;
pub mod model;
pub mod sim;
pub mod trace;

pub use adm1::Adm1Kinetics;
pub use error::{Divergence, SimError, SimResult};
pub use integrator::{ForwardEuler, Integrator, IntegratorType, RK4, SubstepIntegrator};
pub use kinetics::{FedReactor, Kinetics};
pub use model::TransientModel;
pub use sim::{RunPhase, SimOptions, SimProgress, Simulator};
pub use trace::{BufferedTrace, SimulationTrace, TraceSink};
