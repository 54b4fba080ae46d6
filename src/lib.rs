//! Batch montage builder for cryo-EM screening images.
//!
//! A directory holds sets of files sharing a name prefix and differing by a
//! role tag (`map`, `square`, `hole`, `i1`, `i2`). [`grouper`] recovers the
//! sets, [`layout`] computes the fixed five-cell geometry, [`compositor`]
//! renders one montage per set and [`batch`] ties the steps together.

pub mod batch;
pub mod compositor;
pub mod config;
pub mod grouper;
pub mod imaging;
pub mod layout;
pub mod role;

pub use batch::{RunError, RunOptions, RunSummary, run};
pub use compositor::{CompositeError, Compositor};
pub use config::{ConfigError, MontageConfig};
pub use grouper::{Grouper, Grouping, ImageSet};
pub use imaging::{DirectorySource, ImageSource, OpenFailure};
pub use layout::{MontageLayout, Placement};
pub use role::{RoleMatch, RoleTag};
