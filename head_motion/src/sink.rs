//! Receivers of mapped motion state.
//!
//! Displaying text, rotating a 3D model and scrolling a list belong to the
//! host UI.  The screens only see these traits; the console implementations
//! here are what the command-line program plugs in.

use std::io::{self, Write};

use motion_state::{NodeRotation, PageChangeDecision};
use tracing::{debug, warn};

/// Accepts the formatted snapshot for display.
pub trait TextSink {
    fn show_text(&mut self, text: &str);
}

/// Accepts the Euler rotation (radians) for the head model node.
pub trait RotationSink {
    fn apply_rotation(&mut self, rotation: NodeRotation);
}

/// Performs page navigation for the feed.
///
/// `NoChange` must be a no-op.  A target outside `0..item_count()` is
/// ignored.
pub trait NavigationSink {
    fn current_index(&self) -> usize;
    fn item_count(&self) -> usize;
    fn navigate(&mut self, decision: PageChangeDecision);
}

// ════════════════════════════════════════════════════════════════════════════
// ConsoleText
// ════════════════════════════════════════════════════════════════════════════

/// Writes every snapshot to a terminal (or any writer), separated by a rule.
pub struct ConsoleText<W: Write> {
    out: W,
}

impl ConsoleText<io::Stdout> {
    pub fn stdout() -> Self { ConsoleText { out: io::stdout() } }
}

impl<W: Write> ConsoleText<W> {
    pub fn new(out: W) -> Self { ConsoleText { out } }

    pub fn into_inner(self) -> W { self.out }
}

impl<W: Write> TextSink for ConsoleText<W> {
    fn show_text(&mut self, text: &str) {
        let res = writeln!(self.out, "{}\n{}", text, "─".repeat(40))
            .and_then(|_| self.out.flush());
        if let Err(e) = res {
            warn!(error = %e, "failed to write snapshot");
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LoggedRotation
// ════════════════════════════════════════════════════════════════════════════

/// Keeps the latest rotation and logs each one at debug level.
#[derive(Debug, Default)]
pub struct LoggedRotation {
    last: Option<NodeRotation>,
}

impl LoggedRotation {
    pub fn last(&self) -> Option<NodeRotation> { self.last }
}

impl RotationSink for LoggedRotation {
    fn apply_rotation(&mut self, rotation: NodeRotation) {
        debug!(x = rotation.x, y = rotation.y, z = rotation.z, "head model rotation");
        self.last = Some(rotation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn console_text_writes_snapshot_and_rule() {
        let mut sink = ConsoleText::new(Vec::new());
        sink.show_text("Attitude:\n    pitch: 0.0");
        let written = String::from_utf8(sink.into_inner()).unwrap();
        assert!(written.starts_with("Attitude:\n    pitch: 0.0\n"));
        assert!(written.ends_with(&format!("{}\n", "─".repeat(40))));
    }

    #[test]
    fn logged_rotation_keeps_latest() {
        let mut sink = LoggedRotation::default();
        assert_eq!(sink.last(), None);
        sink.apply_rotation(NodeRotation { x: 1.0, y: 2.0, z: 3.0 });
        sink.apply_rotation(NodeRotation { x: -1.0, y: 0.0, z: 0.5 });
        assert_eq!(sink.last(), Some(NodeRotation { x: -1.0, y: 0.0, z: 0.5 }));
    }
}
