//! notify-push-setup - verifies a notify_push server installation.
//!
//! The push server relays file change notifications from Nextcloud to
//! clients. It only works when it shares three things with Nextcloud: the
//! Redis queue, the database, and a network path back to Nextcloud. This
//! crate checks all three from the Nextcloud side and saves the push server
//! URL once they hold.
//!
//! # Architecture
//!
//! - **Setup** - runs the checks in order and stops at the first failure
//! - **Probes** - one check each for the queue, the database and the reverse path
//! - **Collaborators** - [`queue::Queue`], [`app_config::AppConfigStore`],
//!   [`http::HttpGet`] and [`db::MappingSource`], passed in explicitly
//!
//! # Modules
//!
//! - [`setup`] - the check sequence
//! - [`probe`] - individual checks and their results
//! - [`report`] - per-stage outcomes and exit status
//! - [`config`] - configuration loading/saving

pub mod app_config;
pub mod config;
pub mod constants;
pub mod cookie;
pub mod db;
pub mod error;
pub mod http;
pub mod probe;
pub mod queue;
pub mod report;
pub mod setup;

// Re-export commonly used types
pub use config::Config;
pub use cookie::Cookie;
pub use probe::ProbeResult;
pub use report::{Stage, VerificationReport};
pub use setup::Setup;
