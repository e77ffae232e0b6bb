//! Render layer contract.
//!
//! The sync core owns the collection; a canvas consumes it read-only and
//! draws one element per note, keyed by id. `render_all` clears the
//! canvas before placing anything, so a re-render is idempotent.
//!
//! Implementations:
//! - `RecordingCanvas` - For testing
//! - `TerminalCanvas` (in tree-client) - Prints leaves to a terminal

use rand::Rng;

use crate::note::Note;
use crate::note_id::NoteId;

/// Milliseconds of extra animation delay per list position.
const STAGGER_STEP_MS: u64 = 100;

/// Per-element presentation computed at render time.
///
/// Purely cosmetic; none of this is persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeafSprite {
    /// Animation delay proportional to list position.
    pub delay_ms: u64,
    /// Random rotation applied to the leaf element.
    pub rotation_deg: f32,
}

impl LeafSprite {
    pub fn at_index(index: usize) -> Self {
        Self {
            delay_ms: index as u64 * STAGGER_STEP_MS,
            rotation_deg: rand::rng().random_range(0.0..360.0),
        }
    }
}

/// A surface that can draw the tree's leaves.
///
/// Never mutates the collection; treats it as read-only per render pass.
pub trait LeafCanvas {
    /// Remove everything drawn by the previous pass.
    fn clear(&mut self);

    /// Draw one leaf.
    fn place(&mut self, note: &Note, sprite: &LeafSprite);
}

/// Draw the whole collection, newest first, with staggered delays.
pub fn render_all(canvas: &mut dyn LeafCanvas, notes: &[Note]) {
    canvas.clear();
    for (index, note) in notes.iter().enumerate() {
        canvas.place(note, &LeafSprite::at_index(index));
    }
}

/// Detail view text for a selected leaf.
pub fn format_detail(note: &Note) -> String {
    format!(
        "\"{}\"\n  from {} to {}\n  on {}",
        note.message,
        note.student_name,
        note.teacher_name,
        note.created_at.format("%Y-%m-%d %H:%M UTC"),
    )
}

/// Canvas that records placements, for testing renderers and callers.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    placed: Vec<(NoteId, LeafSprite)>,
    clears: usize,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn placed(&self) -> &[(NoteId, LeafSprite)] {
        &self.placed
    }

    pub fn clears(&self) -> usize {
        self.clears
    }
}

impl LeafCanvas for RecordingCanvas {
    fn clear(&mut self) {
        self.placed.clear();
        self.clears += 1;
    }

    fn place(&mut self, note: &Note, sprite: &LeafSprite) {
        self.placed.push((note.id, *sprite));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::NoteDraft;
    use chrono::Utc;

    fn note(name: &str) -> Note {
        NoteDraft::styled(name.into(), "Mr. Tran".into(), "Thank you".into())
            .into_note(NoteId::generate_local(), Utc::now())
    }

    #[test]
    fn test_sprites_stagger_by_position() {
        assert_eq!(LeafSprite::at_index(0).delay_ms, 0);
        assert_eq!(LeafSprite::at_index(3).delay_ms, 300);
    }

    #[test]
    fn test_sprite_rotation_in_range() {
        for _ in 0..100 {
            let sprite = LeafSprite::at_index(0);
            assert!((0.0..360.0).contains(&sprite.rotation_deg));
        }
    }

    #[test]
    fn test_render_all_places_one_element_per_note() {
        let notes = vec![note("Lan"), note("Minh")];
        let mut canvas = RecordingCanvas::new();

        render_all(&mut canvas, &notes);

        assert_eq!(canvas.placed().len(), 2);
        assert_eq!(canvas.placed()[0].0, notes[0].id);
        assert_eq!(canvas.placed()[1].0, notes[1].id);
    }

    #[test]
    fn test_render_all_is_idempotent() {
        let notes = vec![note("Lan"), note("Minh")];
        let mut canvas = RecordingCanvas::new();

        render_all(&mut canvas, &notes);
        render_all(&mut canvas, &notes);

        // Second pass replaces the first instead of stacking on top.
        assert_eq!(canvas.placed().len(), 2);
        assert_eq!(canvas.clears(), 2);
    }

    #[test]
    fn test_format_detail_includes_everything() {
        let note = note("Lan");
        let detail = format_detail(&note);
        assert!(detail.contains("Thank you"));
        assert!(detail.contains("Lan"));
        assert!(detail.contains("Mr. Tran"));
        assert!(detail.contains("UTC"));
    }
}
