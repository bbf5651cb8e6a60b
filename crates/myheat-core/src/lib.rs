//! Polling and projection layer between `myheat-api` and its consumers.
//!
//! - **[`Coordinator`]** owns the single device [`Snapshot`] and drives its
//!   refresh: one `getDeviceInfo` call per interval, at most one in flight,
//!   with concurrent refresh requests coalesced into the running one.
//!
//! - **[`SnapshotStore`]** publishes snapshots atomically (`arc-swap`) and
//!   broadcasts every refresh outcome through a `watch` channel, vended to
//!   consumers as a [`SnapshotStream`].
//!
//! - **Entity views** ([`entity`]) are projections over the current snapshot
//!   (sensors, binary sensors, a security switch, water heaters, climates);
//!   writable views call the RPC client and then request a forced refresh.
//!
//! - **[`Entry`]** is one configured device: it validates an
//!   [`EntryConfig`], owns exactly one coordinator, discovers its entities
//!   and routes host [`Command`]s.

pub mod command;
pub mod config;
pub mod coordinator;
pub mod entity;
pub mod entry;
pub mod error;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{Command, CommandResult};
pub use config::EntryConfig;
pub use coordinator::{Coordinator, CoordinatorState};
pub use entity::{EntityDescription, EntitySet, EntityView, Platform, StateValue};
pub use entry::Entry;
pub use error::CoreError;
pub use store::{RefreshOutcome, Snapshot, SnapshotStore, SnapshotStream, UpdateStatus};

// Wire types consumers routinely need.
pub use myheat_api::{DeviceInfo, DeviceSummary, Eng, Env, EnvType, Heater};
