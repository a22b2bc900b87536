//! Async HTTP clients for the two upstream services holewatch polls.
//!
//! - **[`KillboardClient`]** — latest-kill lookups per solar system, with a
//!   widening `limit` window and transparent gzip decoding.
//! - **[`ScoutClient`]** — the public signature feed listing systems that
//!   currently hold a connection to a hub system.
//!
//! Both clients return `Result<_, Error>`; classification into "no data"
//! happens one layer up in `holewatch-core`.

pub mod error;
pub mod killboard;
pub mod models;
pub mod scout;
pub mod transport;

pub use error::Error;
pub use killboard::KillboardClient;
pub use models::{KillSummary, Signature};
pub use scout::ScoutClient;
pub use transport::TransportConfig;
