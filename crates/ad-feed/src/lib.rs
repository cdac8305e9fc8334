//! ad-feed: feed plans, the feeding-window schedule and influent building.
//!
//! Feed composition may only change at multiples of the feeding interval.
//! Within a window the influent is held constant (zero-order hold), so the
//! influent for a step is a pure function of the window it falls in.

pub mod conversion;
pub mod error;
pub mod influent;
pub mod plan;
pub mod schedule;

pub use conversion::{SubstrateStream, substrate_stream};
pub use error::{FeedError, FeedResult};
pub use influent::{Influent, InfluentBuilder, KineticParams};
pub use plan::{FeedPlan, FeedSlot};
pub use schedule::{FeedSchedule, FeedingInterval};
