//! Process-wide registry of live Gridlock boards.
//!
//! The engine crate (`gridlock-core`) is pure and single-threaded; this
//! crate is what a session layer actually talks to. It owns:
//! - [`code::GameCode`]: short random base62 identifiers with bounded
//!   collision retry at registration time
//! - [`registry::Registry`]: the concurrent code→board map and the
//!   session-facing operation surface (create/join/leave/start/move/vote/
//!   kick/snapshot/listing)
//! - [`registry::BoardHandle`]: the lock-guarded handle that makes it
//!   impossible to reach a board without holding its exclusion lock

pub mod code;
pub mod registry;

pub use code::{GameCode, ParseCodeError};
pub use registry::{BoardHandle, GameInfo, Registry, RegistryError};
