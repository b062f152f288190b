use crate::canvas::{self, BrushStyle, CanvasError, Point, Surface};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::fmt;

pub const MAX_UNDO: usize = 50;

const DEFAULT_IMAGE_X: f64 = 100.0;
const DEFAULT_IMAGE_Y: f64 = 100.0;
const DEFAULT_IMAGE_WIDTH: f64 = 300.0;
const DEFAULT_IMAGE_HEIGHT: f64 = 200.0;
const MIN_IMAGE_EXTENT: f64 = 100.0;

#[derive(Debug)]
pub enum JournalError {
    NotDrawingMode,
    EmptyImage,
    UnknownImage(usize),
    Canvas(CanvasError),
}

impl fmt::Display for JournalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JournalError::NotDrawingMode => write!(f, "select the pen or eraser before drawing"),
            JournalError::EmptyImage => write!(f, "image data must not be empty"),
            JournalError::UnknownImage(index) => write!(f, "no image at position {index}"),
            JournalError::Canvas(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for JournalError {}

impl From<CanvasError> for JournalError {
    fn from(err: CanvasError) -> Self {
        JournalError::Canvas(err)
    }
}

/// A floating image box layered over the canvas. Insertion order is z-order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImagePlacement {
    pub image_data: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Self-contained capture of the editor's visual state for one date.
/// Restoring a snapshot fully reconstructs the canvas, text, and image
/// layout without reference to any prior state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub canvas_image: String,
    pub rich_text: String,
    pub image_placements: Vec<ImagePlacement>,
}

/// Date-keyed mapping of snapshots for the current session. One entry per
/// calendar date, overwritten on every edit; nothing here survives a
/// restart.
#[derive(Debug, Default)]
pub struct EntryStore {
    entries: BTreeMap<String, Snapshot>,
}

impl EntryStore {
    pub fn save(&mut self, date: &str, snapshot: Snapshot) {
        self.entries.insert(date.to_string(), snapshot);
    }

    pub fn load(&self, date: &str) -> Snapshot {
        self.entries.get(date).cloned().unwrap_or_default()
    }

    pub fn get(&self, date: &str) -> Option<&Snapshot> {
        self.entries.get(date)
    }

    pub fn clear(&mut self, date: &str) {
        self.entries.remove(date);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Bounded history of full snapshots. Capacity-based FIFO eviction: once 50
/// states are held, every push drops the oldest regardless of how recently
/// it was restored.
#[derive(Debug, Default)]
pub struct UndoStack {
    stack: VecDeque<Snapshot>,
}

impl UndoStack {
    pub fn push(&mut self, snapshot: Snapshot) {
        self.stack.push_back(snapshot);
        if self.stack.len() > MAX_UNDO {
            self.stack.pop_front();
        }
    }

    /// Discards the current top and returns the state now on top, or `None`
    /// when there is nothing to undo (fewer than two entries).
    pub fn undo(&mut self) -> Option<Snapshot> {
        if self.stack.len() < 2 {
            return None;
        }
        self.stack.pop_back();
        self.stack.back().cloned()
    }

    pub fn reset(&mut self) {
        self.stack.clear();
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn top(&self) -> Option<&Snapshot> {
        self.stack.back()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorMode {
    /// Typing into the text region; pointer strokes are inert.
    #[default]
    Text,
    Draw,
    Erase,
}

/// Active tool settings, held on the session instead of scattered globals so
/// handlers receive one explicit context.
#[derive(Debug, Clone)]
pub struct EditorTools {
    pub mode: EditorMode,
    pub draw_color: [u8; 3],
    pub brush_size: u32,
    pub highlighter: bool,
}

impl Default for EditorTools {
    fn default() -> Self {
        Self {
            mode: EditorMode::Text,
            draw_color: [0, 0, 0],
            brush_size: 4,
            highlighter: false,
        }
    }
}

/// The journal editor for one UI session: the three interactive surfaces
/// (canvas, text region, image overlays) plus the entry store and undo
/// history that every mutating action feeds.
#[derive(Debug)]
pub struct JournalSession {
    active_date: String,
    surface: Surface,
    rich_text: String,
    placements: Vec<ImagePlacement>,
    entries: EntryStore,
    undo: UndoStack,
    pub tools: EditorTools,
}

impl JournalSession {
    pub fn new(active_date: String) -> Self {
        Self {
            active_date,
            surface: Surface::default(),
            rich_text: String::new(),
            placements: Vec::new(),
            entries: EntryStore::default(),
            undo: UndoStack::default(),
            tools: EditorTools::default(),
        }
    }

    pub fn active_date(&self) -> &str {
        &self.active_date
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn rich_text(&self) -> &str {
        &self.rich_text
    }

    pub fn placements(&self) -> &[ImagePlacement] {
        &self.placements
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Captures the current visual state as a replayable snapshot.
    pub fn snapshot(&self) -> Result<Snapshot, JournalError> {
        Ok(Snapshot {
            canvas_image: self.surface.encode()?,
            rich_text: self.rich_text.clone(),
            image_placements: self.placements.clone(),
        })
    }

    /// Records the current state: pushes a copy onto the undo history and
    /// overwrites the entry store for the active date.
    fn save(&mut self) -> Result<(), JournalError> {
        let snapshot = self.snapshot()?;
        self.undo.push(snapshot.clone());
        self.entries.save(&self.active_date, snapshot);
        Ok(())
    }

    /// Applies one completed pointer stroke with the session's current tool
    /// and saves the result.
    pub fn apply_stroke(&mut self, points: &[Point]) -> Result<(), JournalError> {
        match self.tools.mode {
            EditorMode::Draw => {
                let style = BrushStyle {
                    color: self.tools.draw_color,
                    size: self.tools.brush_size,
                    highlighter: self.tools.highlighter,
                };
                self.surface.draw_stroke(points, &style);
            }
            EditorMode::Erase => self.surface.erase_stroke(points, self.tools.brush_size),
            EditorMode::Text => return Err(JournalError::NotDrawingMode),
        }
        self.save()
    }

    pub fn set_text(&mut self, html: String) -> Result<(), JournalError> {
        self.rich_text = html;
        self.save()
    }

    /// Places a new image at the default position and size, clamped to the
    /// container, topmost in z-order.
    pub fn add_image(&mut self, image_data: String) -> Result<(), JournalError> {
        if image_data.trim().is_empty() {
            return Err(JournalError::EmptyImage);
        }
        let mut placement = ImagePlacement {
            image_data,
            x: DEFAULT_IMAGE_X,
            y: DEFAULT_IMAGE_Y,
            width: DEFAULT_IMAGE_WIDTH,
            height: DEFAULT_IMAGE_HEIGHT,
        };
        let (x, y) = self.clamp_position(placement.x, placement.y, placement.width, placement.height);
        placement.x = x;
        placement.y = y;
        self.placements.push(placement);
        self.save()
    }

    pub fn move_image(&mut self, index: usize, x: f64, y: f64) -> Result<(), JournalError> {
        let (width, height) = {
            let placement = self
                .placements
                .get(index)
                .ok_or(JournalError::UnknownImage(index))?;
            (placement.width, placement.height)
        };
        let (x, y) = self.clamp_position(x, y, width, height);
        let placement = &mut self.placements[index];
        placement.x = x;
        placement.y = y;
        self.save()
    }

    pub fn resize_image(&mut self, index: usize, width: f64, height: f64) -> Result<(), JournalError> {
        let (container_w, container_h) = self.container_extent();
        let placement = self
            .placements
            .get_mut(index)
            .ok_or(JournalError::UnknownImage(index))?;
        placement.width = width.min(container_w - placement.x).max(MIN_IMAGE_EXTENT);
        placement.height = height.min(container_h - placement.y).max(MIN_IMAGE_EXTENT);
        self.save()
    }

    pub fn delete_image(&mut self, index: usize) -> Result<(), JournalError> {
        if index >= self.placements.len() {
            return Err(JournalError::UnknownImage(index));
        }
        self.placements.remove(index);
        self.save()
    }

    /// Single-step undo. Returns the restored snapshot, or `None` when the
    /// history holds fewer than two states ("nothing to undo" is a
    /// notification, never an error).
    pub fn undo(&mut self) -> Result<Option<Snapshot>, JournalError> {
        let Some(previous) = self.undo.undo() else {
            return Ok(None);
        };
        self.restore(&previous)?;
        self.entries.save(&self.active_date, previous.clone());
        Ok(Some(previous))
    }

    /// Switches the active date, loading its stored snapshot or presenting
    /// empty surfaces. Undo history never crosses a date boundary: the stack
    /// restarts, seeded with the loaded snapshot when one exists.
    pub fn switch_date(&mut self, date: String) -> Result<(), JournalError> {
        self.active_date = date;
        self.undo.reset();
        match self.entries.get(&self.active_date).cloned() {
            Some(entry) => {
                self.restore(&entry)?;
                self.undo.push(entry);
            }
            None => self.reset_surfaces(),
        }
        Ok(())
    }

    /// Removes the active date's entry and blanks all three surfaces.
    pub fn clear_active_date(&mut self) {
        self.reset_surfaces();
        self.entries.clear(&self.active_date);
        self.undo.reset();
    }

    fn restore(&mut self, snapshot: &Snapshot) -> Result<(), JournalError> {
        self.surface.restore(&snapshot.canvas_image)?;
        self.rich_text = snapshot.rich_text.clone();
        self.placements = snapshot.image_placements.clone();
        Ok(())
    }

    fn reset_surfaces(&mut self) {
        self.surface.clear();
        self.rich_text.clear();
        self.placements.clear();
    }

    fn container_extent(&self) -> (f64, f64) {
        (f64::from(self.surface.width()), f64::from(self.surface.height()))
    }

    fn clamp_position(&self, x: f64, y: f64, width: f64, height: f64) -> (f64, f64) {
        let (container_w, container_h) = self.container_extent();
        (
            x.min(container_w - width).max(0.0),
            y.min(container_h - height).max(0.0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Point;

    fn session() -> JournalSession {
        let mut session = JournalSession::new("2026-08-01".to_string());
        session.tools.mode = EditorMode::Draw;
        session
    }

    fn snapshot_with_text(text: &str) -> Snapshot {
        Snapshot {
            rich_text: text.to_string(),
            ..Snapshot::default()
        }
    }

    #[test]
    fn undo_stack_length_tracks_pushes_up_to_capacity() {
        let mut stack = UndoStack::default();
        for n in 0..30 {
            stack.push(snapshot_with_text(&n.to_string()));
            assert_eq!(stack.len(), n + 1);
        }
        for n in 30..80 {
            stack.push(snapshot_with_text(&n.to_string()));
        }
        assert_eq!(stack.len(), MAX_UNDO);
        // oldest evicted first: 80 pushes leave states 30..=79
        let restored = stack.undo().expect("undo");
        assert_eq!(restored.rich_text, "78");
    }

    #[test]
    fn undo_on_single_entry_is_a_noop() {
        let mut stack = UndoStack::default();
        stack.push(snapshot_with_text("only"));
        assert!(stack.undo().is_none());
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn undo_restores_previous_state_and_store_entry() {
        let mut session = session();
        session.set_text("first".to_string()).expect("save");
        session.set_text("second".to_string()).expect("save");
        assert_eq!(session.undo_depth(), 2);

        let restored = session.undo().expect("undo").expect("has history");
        assert_eq!(restored.rich_text, "first");
        assert_eq!(session.rich_text(), "first");
        assert_eq!(session.undo_depth(), 1);
        // the store is overwritten with the restored snapshot
        assert_eq!(session.entries.load("2026-08-01").rich_text, "first");
    }

    #[test]
    fn undo_with_no_history_leaves_store_unchanged() {
        let mut session = session();
        session.set_text("kept".to_string()).expect("save");
        assert!(session.undo().expect("undo").is_none());
        assert_eq!(session.entries.load("2026-08-01").rich_text, "kept");
        assert_eq!(session.rich_text(), "kept");
    }

    #[test]
    fn store_top_of_stack_matches_entry_after_every_mutation() {
        let mut session = session();
        session.set_text("one".to_string()).expect("save");
        session.add_image("data:image/png;base64,AAAA".to_string()).expect("save");
        session
            .apply_stroke(&[Point { x: 5.0, y: 5.0 }, Point { x: 40.0, y: 40.0 }])
            .expect("stroke");
        assert_eq!(
            session.undo.top().expect("top"),
            session.entries.get("2026-08-01").expect("entry")
        );
    }

    #[test]
    fn switching_to_unstored_date_yields_empty_surfaces() {
        let mut session = session();
        session.set_text("today".to_string()).expect("save");
        session
            .apply_stroke(&[Point { x: 5.0, y: 5.0 }, Point { x: 40.0, y: 40.0 }])
            .expect("stroke");
        session.add_image("data:image/png;base64,AAAA".to_string()).expect("save");

        session.switch_date("2026-08-02".to_string()).expect("switch");
        assert!(session.surface().is_blank());
        assert_eq!(session.rich_text(), "");
        assert!(session.placements().is_empty());
        assert_eq!(session.undo_depth(), 0);
    }

    #[test]
    fn switching_back_restores_the_stored_snapshot_and_seeds_undo() {
        let mut session = session();
        session.set_text("kept entry".to_string()).expect("save");
        session.switch_date("2026-08-02".to_string()).expect("switch");
        session.switch_date("2026-08-01".to_string()).expect("switch");

        assert_eq!(session.rich_text(), "kept entry");
        assert_eq!(session.undo_depth(), 1);
        // seeded single-element stack: undo across the boundary is refused
        assert!(session.undo().expect("undo").is_none());
    }

    #[test]
    fn clear_removes_the_entry_and_blanks_everything() {
        let mut session = session();
        session.set_text("gone".to_string()).expect("save");
        session.clear_active_date();
        assert_eq!(session.entry_count(), 0);
        assert_eq!(session.rich_text(), "");
        assert_eq!(session.undo_depth(), 0);
    }

    #[test]
    fn stroke_in_text_mode_is_rejected() {
        let mut session = JournalSession::new("2026-08-01".to_string());
        let err = session
            .apply_stroke(&[Point { x: 1.0, y: 1.0 }])
            .expect_err("text mode");
        assert!(matches!(err, JournalError::NotDrawingMode));
        assert_eq!(session.entry_count(), 0);
    }

    #[test]
    fn image_geometry_is_clamped_to_the_container() {
        let mut session = session();
        session.add_image("img".to_string()).expect("add");

        // drag far beyond the container: clamp to extents minus the box size
        session.move_image(0, 5000.0, -50.0).expect("move");
        let placement = &session.placements()[0];
        assert_eq!(placement.x, 800.0 - placement.width);
        assert_eq!(placement.y, 0.0);

        // resize below the minimum and beyond the container
        session.resize_image(0, 10.0, 9000.0).expect("resize");
        let placement = &session.placements()[0];
        assert_eq!(placement.width, 100.0);
        assert_eq!(placement.height, 600.0 - placement.y);
    }

    #[test]
    fn deleting_an_image_saves_and_reindexes() {
        let mut session = session();
        session.add_image("a".to_string()).expect("add");
        session.add_image("b".to_string()).expect("add");
        session.delete_image(0).expect("delete");
        assert_eq!(session.placements().len(), 1);
        assert_eq!(session.placements()[0].image_data, "b");
        assert!(matches!(
            session.delete_image(5),
            Err(JournalError::UnknownImage(5))
        ));
    }

    #[test]
    fn snapshots_are_self_contained() {
        let mut session = session();
        session
            .apply_stroke(&[Point { x: 5.0, y: 5.0 }, Point { x: 60.0, y: 60.0 }])
            .expect("stroke");
        session.set_text("replay".to_string()).expect("save");
        let snapshot = session.snapshot().expect("snapshot");

        let mut fresh = JournalSession::new("2026-08-09".to_string());
        fresh.restore(&snapshot).expect("restore");
        assert!(!fresh.surface().is_blank());
        assert_eq!(fresh.rich_text(), "replay");
    }
}
