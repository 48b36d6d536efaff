//! FIRVision Core Engine
//!
//! GUI-independent core for the FIR video evidence application:
//! media acquisition, AI analysis, report drafting and history,
//! PDF export, and the session state machine.

mod error;
mod types;

pub mod analysis;
pub mod media;
pub mod report;
pub mod session;
pub mod settings;

pub use error::*;
pub use types::*;
