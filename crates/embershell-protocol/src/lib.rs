//! Wire protocol for the Embershell client.
//!
//! This crate defines the language spoken with a remote game server:
//!
//! - **Types** ([`Request`], [`Response`] and the per-action records) —
//!   batch envelopes where any subset of action lists may be populated.
//! - **Codec** ([`LineCodec`] trait, [`JsonLineCodec`]) — one envelope to
//!   exactly one line of text and back.
//! - **Errors** ([`ProtocolError`]) — what can go wrong while encoding
//!   or decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between the transport (delimited lines over
//! TCP) and the session (typed per-action methods). It knows nothing
//! about connections or game state — it only converts between envelopes
//! and text.
//!
//! ```text
//! Connection (lines) → Protocol (envelopes) → Session / Reconciler
//! ```

mod codec;
mod error;
mod types;

pub use codec::{JsonLineCodec, LineCodec};
pub use error::ProtocolError;
pub use types::{
    Chat, DialogAction, DialogAnswerAction, Equip, EquipSlot, Load, Login,
    Move, Request, Response, Target, Trade, TransferItems, Unequip, Update,
    Use,
};
