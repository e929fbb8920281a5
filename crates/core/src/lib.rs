//! Domain rules for the capstone project portal.
//!
//! Everything in this crate is pure: no database, no HTTP, no clock reads
//! except where a timestamp is passed in. The persistence layer
//! (`capstone_db`) loads snapshots, asks these modules what should happen,
//! and writes the answer inside a transaction.
//!
//! - [`status`] -- the project status lookup and its transition table.
//! - [`lifecycle`] -- approve / reject / council-assignment planners.
//! - [`scoring`] -- score validation and final-score aggregation.
//! - [`council`] -- council member roles and membership rules.
//! - [`project`] -- creation, comment, and professor-assignment rules.
//! - [`progress`] -- progress report validation.
//! - [`message`] -- direct messages between users.
//! - [`notification`] -- notification drafts and their wording.
//! - [`export`] -- CSV rendering of the project register.

pub mod actor;
pub mod audit;
pub mod council;
pub mod error;
pub mod export;
pub mod lifecycle;
pub mod message;
pub mod notification;
pub mod progress;
pub mod project;
pub mod roles;
pub mod scoring;
pub mod status;
pub mod types;
