//! Reservation import pipeline between `unires-api` and the CLI.
//!
//! - **[`Session`]** owns the authenticated controller connection:
//!   [`open()`](Session::open) logs in, [`close()`](Session::close) logs out.
//!   Client lookups and upserts go through it.
//!
//! - **[`reader`]** parses the `VLAN, MAC, Client Name, IP` CSV into
//!   [`Reservation`]s, rejecting malformed rows individually.
//!
//! - **[`resolver`]** turns the controller's network list into a
//!   [`VlanMap`] (VLAN id -> network object id).
//!
//! - **[`Applier`]** walks the rows in order and creates, updates, or
//!   leaves alone each client record, collecting an [`ImportReport`].

pub mod applier;
pub mod config;
pub mod error;
pub mod model;
pub mod reader;
pub mod report;
pub mod resolver;
pub mod session;

// ── Primary re-exports ──────────────────────────────────────────────
pub use applier::{Applier, ApplyOptions, import};
pub use config::{ControllerSettings, PlatformHint, TlsVerification};
pub use error::{CoreError, FormatError, ResolutionError, RowError};
pub use model::{ClientRecord, MacAddress, NetworkRef, Reservation, VlanMap};
pub use reader::{ParsedRow, RejectedRow, read_rows, read_rows_from};
pub use report::{ImportReport, Outcome, RowReport, Summary};
pub use resolver::{build_vlan_map, list_networks};
pub use session::Session;
