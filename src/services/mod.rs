//! Services that sit between the data view and a presenter

pub mod viewer_session;

pub use viewer_session::{SessionPhase, ViewerSession};
