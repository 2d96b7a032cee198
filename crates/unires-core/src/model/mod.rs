// ── Domain model ──
//
// Canonical types shared by the reader, resolver and applier.

pub mod client;
pub mod mac;
pub mod network;
pub mod reservation;

pub use client::ClientRecord;
pub use mac::MacAddress;
pub use network::{NetworkRef, VlanMap};
pub use reservation::Reservation;
