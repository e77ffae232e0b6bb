//! Terminal renderer for the tree.
//!
//! Buffers one line per leaf; the caller prints the finished output.
//! Clearing the buffer before each pass keeps re-renders idempotent.

use tree_core::{LeafCanvas, LeafSprite, Note};

#[derive(Debug, Default)]
pub struct TerminalCanvas {
    lines: Vec<String>,
}

impl TerminalCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// The rendered tree, one leaf per line.
    pub fn output(&self) -> String {
        self.lines.join("\n")
    }

    pub fn leaf_count(&self) -> usize {
        self.lines.len()
    }
}

impl LeafCanvas for TerminalCanvas {
    fn clear(&mut self) {
        self.lines.clear();
    }

    fn place(&mut self, note: &Note, sprite: &LeafSprite) {
        self.lines.push(format!(
            "{:>6}ms  {:<6} {:<10} ({:>3},{:>3})  {} -> {}",
            sprite.delay_ms,
            note.leaf_type,
            note.gradient,
            note.position.x,
            note.position.y,
            note.student_name,
            note.teacher_name,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tree_core::{NoteDraft, NoteId, render_all};

    fn note(name: &str) -> Note {
        NoteDraft::styled(name.into(), "Mr. Tran".into(), "Thank you".into())
            .into_note(NoteId::generate_local(), Utc::now())
    }

    #[test]
    fn test_one_line_per_leaf() {
        let notes = vec![note("Lan"), note("Minh")];
        let mut canvas = TerminalCanvas::new();

        render_all(&mut canvas, &notes);

        assert_eq!(canvas.leaf_count(), 2);
        assert!(canvas.output().contains("Lan -> Mr. Tran"));
    }

    #[test]
    fn test_re_render_does_not_stack() {
        let notes = vec![note("Lan")];
        let mut canvas = TerminalCanvas::new();

        render_all(&mut canvas, &notes);
        render_all(&mut canvas, &notes);

        assert_eq!(canvas.leaf_count(), 1);
    }

    #[test]
    fn test_delays_stagger_down_the_list() {
        let notes = vec![note("Lan"), note("Minh"), note("Chi")];
        let mut canvas = TerminalCanvas::new();

        render_all(&mut canvas, &notes);

        let output = canvas.output();
        let lines: Vec<&str> = output.lines().collect();
        assert!(lines[0].trim_start().starts_with("0ms"));
        assert!(lines[1].trim_start().starts_with("100ms"));
        assert!(lines[2].trim_start().starts_with("200ms"));
    }
}
