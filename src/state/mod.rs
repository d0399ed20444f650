//! Persistent state document
//!
//! One JSON object on disk, merged across runs. Engines compute values and
//! hand them to the store; the store performs a recursive structural merge
//! (child objects merge key-wise, scalars overwrite) and commits the result
//! atomically. Unknown keys written by other tooling survive the merge.

mod document;
mod store;
#[cfg(test)]
mod tests;

pub use document::{ConfigState, default_state};
pub use store::{StateStore, merge};
