/*!
 * Ranger Sync Module
 * Fetch and format conversion against an external Ranger-compatible policy authority
 *
 * The external authority is the source of truth: a background administrative
 * task fetches its policy listing, converts it with
 * [`policies_from_ranger`], and applies the result through
 * [`PolicyStore::set_policies`](crate::PolicyStore::set_policies). The fetch
 * is a bounded blocking call and must never run on the request-serving path.
 */

pub mod client;
pub mod config;
pub mod convert;

// Re-export commonly used items
pub use client::{RangerClient, RangerError};
pub use config::RangerConfig;
pub use convert::{policies_from_ranger, policies_to_ranger};
