//! CLI command implementations.
//!
//! - **decide**: compare two revisions and print the suggested bump
//! - **analyzers**: list registered surface analyzers
//! - **init**: write a default configuration file

pub mod analyzers;
pub mod decide;
pub mod init;

pub use analyzers::list_analyzers;
pub use decide::{run_decide, DecideConfig};
pub use init::init_config;
