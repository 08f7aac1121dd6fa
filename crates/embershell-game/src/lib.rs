//! Client-side game/session synchronization.
//!
//! The facade in this crate sits between the presentation layer and two
//! sources of truth: the local simulation ([`embershell_engine`]) and,
//! when attached, the remote authority ([`embershell_net`]).
//!
//! ```text
//!  command loop ──► Game (facade) ──► module (local state)
//!                     │    ▲
//!            forward  │    │ reconcile (ordered)
//!                     ▼    │
//!                  Session ◄── response queue ◄── read loop
//! ```
//!
//! The model is optimistic local-first: player mutations apply to the
//! local module immediately and are forwarded to the server best
//! effort; authoritative snapshots overwrite local state as they
//! arrive.

mod error;
mod game;
mod player;
mod response;
mod tick;

pub use error::GameError;
pub use game::{Game, LoginStatus};
pub use player::{Player, PlayerHandle};
pub use tick::{TickConfig, TickInfo, TickScheduler};
