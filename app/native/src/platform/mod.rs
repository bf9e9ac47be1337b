//! Small OS helpers shared by the host adapters and the CLI.

pub mod path;
pub mod thread;
