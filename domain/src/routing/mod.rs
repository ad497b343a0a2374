//! Routing table provider
//!
//! A [`RoutingTable`] maps each role to its ordered destinations. The
//! [`RoutingProvider`] resolves the preset for a [`Mode`](crate::Mode) and
//! layers learned overrides, task-force dead-end patches and dynamic
//! re-routes on top.

pub mod overlay;
pub mod presets;
pub mod sampler;
pub mod table;

pub use overlay::{LearnedOverride, ResolvedRouting, Reroute, RerouteLedger, RoutingProvider};
pub use sampler::{BROADCAST_FANOUT, BroadcastSampler};
pub use table::RoutingTable;
