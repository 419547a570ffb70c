//! Session-scoped auto recording.
//!
//! [`SessionConfigStore`] holds the per-session switches and
//! [`AutoRecorder`] applies them before anything reaches storage.

pub mod gate;
pub mod session;

pub use gate::AutoRecorder;
pub use session::{RecordingConfigUpdate, SessionConfigStore, SessionRecordingConfig};
