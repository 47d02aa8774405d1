//! Kitchen WebSocket protocol types
//!
//! Live order change push from the cloud server to kitchen consoles. The
//! kitchen board is always loaded over REST first; these messages only tell the
//! console to refresh.

pub mod ws;

pub use ws::*;
