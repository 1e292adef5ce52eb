//! Interactive editing core: screen ↔ canvas mapping, element picking and the single-writer
//! session that owns the template's working copy.

/// Command reducer, selection and pointer gestures.
pub mod session;
/// Pan and zoom.
pub mod viewport;

pub use hit_test::{HitMode, HitTester};
pub use session::{EditorCommand, EditorSession, Gesture};
pub use viewport::Viewport;
