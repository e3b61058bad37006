//! Repeating stages of the provisioning pipeline
//!
//! Volumes, network interfaces, evars and metadata are ordered lists grown
//! one entry at a time, each bounded by a catalog limit where one exists.

pub mod continuation;
pub mod entries;
pub mod networks;
pub mod volumes;

pub use continuation::{Continuation, decide};
pub use entries::{Entry, EntryKind, collect_entries};
pub use networks::{NetworkInterface, NetworkPlanner, plan_networks};
pub use volumes::{Volume, VolumeAction, VolumePlanner, datastore_options};
