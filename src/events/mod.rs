//! Message types exchanged across systems and with the host.
//!
//! Messages are buffered per tick and updated at the start of the next one, so
//! the host can drain whatever a tick produced after it returns.
//!
//! Submodules:
//! - [`audio`] – sound requests forwarded to the audio bridge
//! - [`damage`] – accepted hits with the amount dealt
//! - [`lifecycle`] – spawn and despawn notifications
pub mod audio;
pub mod damage;
pub mod lifecycle;
