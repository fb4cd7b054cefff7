//! Chat-ops responder for the Akkeris platform.
//!
//! Operators type `/aka <command>` in a channel; the command is
//! acknowledged at once and then answered asynchronously through the
//! command's reply URL:
//!
//! - `apps` / `all apps` / `list`: every app, posted inline or uploaded as a file
//! - `[apps|apps:info] <app-space>`: formation, dyno health, repo, last release
//! - `logs ...`: placeholder
//!
//! The receiver binary acknowledges and queues commands; the processor
//! binary drains the queue through [`CommandRouter::dispatch`].

pub mod akkeris;
pub mod apps;
pub mod blocks;
pub mod config;
pub mod delivery;
pub mod dyno;
pub mod error;
pub mod grammar;
pub mod logs;
pub mod membership;
pub mod router;
pub mod suggest;
pub mod types;

#[cfg(test)]
mod testing;

pub use akkeris::{AkkerisClient, PlatformApi};
pub use config::ChatOpsConfig;
pub use delivery::{ResponseDelivery, SlackDelivery};
pub use error::{ChatOpsError, ChatOpsResult};
pub use membership::{InMemoryMembershipStore, MembershipGate, MembershipLookup};
pub use router::{acknowledgment, handle, Acknowledgment, CommandQueue, CommandRouter};
pub use types::{CommandMeta, InboundCommand, MembershipRecord, QueuedCommand};
