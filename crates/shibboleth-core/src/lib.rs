//! Shared primitives for the Shibboleth game engine.
//!
//! This crate has no opinion about game rules. It defines the identity
//! newtypes that every other layer keys on, and the word-list resource
//! that a round's word pool is sampled from.
//!
//! # Key types
//!
//! - [`PlayerId`], [`ChannelId`] — opaque comparable identities
//! - [`WordList`] — the candidate corpus for a round's word pool

mod types;
mod wordlist;

pub use types::{ChannelId, PlayerId};
pub use wordlist::WordList;
