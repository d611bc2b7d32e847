//! Pointer-driven sticker editing.
//!
//! [`StickerEditor`] owns the placed-sticker list and turns pointer events,
//! catalog picks and slider changes into list edits with undo/redo. It never
//! touches pixels; the compositor reads [`StickerEditor::stickers`] and
//! [`StickerEditor::selected`] on its next pass.
//!
//! # Example
//!
//! ```
//! use photobooth_compositor::{StickerEditor, catalog};
//!
//! let mut editor = StickerEditor::default();
//! let heart = catalog::sticker_by_id("cute-1").unwrap();
//! editor.add_sticker(heart, 800, 1200);
//!
//! // Drag it 50 units right.
//! editor.pointer_down(400.0, 600.0);
//! editor.pointer_move(450.0, 600.0);
//! editor.pointer_up();
//! assert_eq!(editor.stickers()[0].x, 450.0);
//!
//! editor.undo();
//! assert_eq!(editor.stickers()[0].x, 400.0);
//! ```

use tracing::debug;

use crate::catalog::Sticker;
use crate::config::CompositorConfig;
use crate::history::History;
use crate::session::{PhotoSession, PlacedSticker};

pub use crate::session::{MAX_STICKER_SCALE, MIN_STICKER_SCALE};

const PLACEMENT_PREFIX: &str = "sticker-";

/// A point in canvas units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Maps a pointer position on the displayed canvas element to canvas units.
///
/// `display_size` is the on-screen size of the element, `canvas_size` its
/// backing resolution.
pub fn display_to_canvas(point: Point, display_size: (f32, f32), canvas_size: (u32, u32)) -> Point {
    let sx = if display_size.0 > 0.0 {
        canvas_size.0 as f32 / display_size.0
    } else {
        1.0
    };
    let sy = if display_size.1 > 0.0 {
        canvas_size.1 as f32 / display_size.1
    } else {
        1.0
    };
    Point::new(point.x * sx, point.y * sy)
}

/// Returns the index of the first sticker whose centre is strictly closer
/// than `radius * scale` to `(x, y)`.
pub fn hit_test(stickers: &[PlacedSticker], x: f32, y: f32, radius: f32) -> Option<usize> {
    stickers.iter().position(|s| {
        let (dx, dy) = (x - s.x, y - s.y);
        (dx * dx + dy * dy).sqrt() < radius * s.effective_scale()
    })
}

// ============================================================================
// InteractionMode
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum InteractionMode {
    Idle {
        selected: Option<String>,
    },
    /// The dragged sticker is always the selected one.
    Dragging {
        sticker_id: String,
        /// Pointer position minus sticker centre at pointer-down.
        offset: Point,
        moved: bool,
    },
}

impl InteractionMode {
    pub fn selected(&self) -> Option<&str> {
        match self {
            Self::Idle { selected } => selected.as_deref(),
            Self::Dragging { sticker_id, .. } => Some(sticker_id),
        }
    }
}

impl Default for InteractionMode {
    fn default() -> Self {
        Self::Idle { selected: None }
    }
}

// ============================================================================
// StickerEditor
// ============================================================================

#[derive(Debug, Clone)]
pub struct StickerEditor {
    stickers: Vec<PlacedSticker>,
    mode: InteractionMode,
    history: History<Vec<PlacedSticker>>,
    hit_radius: f32,
    next_id: u64,
    version: u64,
}

impl Default for StickerEditor {
    fn default() -> Self {
        Self::new(Vec::new(), &CompositorConfig::default())
    }
}

impl StickerEditor {
    pub fn new(stickers: Vec<PlacedSticker>, config: &CompositorConfig) -> Self {
        // Continue numbering after any `sticker-N` ids already present.
        let next_id = stickers
            .iter()
            .filter_map(|s| s.id.strip_prefix(PLACEMENT_PREFIX)?.parse::<u64>().ok())
            .max()
            .unwrap_or(0);

        Self {
            history: History::new(stickers.clone()),
            stickers,
            mode: InteractionMode::default(),
            hit_radius: config.hit_radius,
            next_id,
            version: 0,
        }
    }

    /// Starts editing a restored session's stickers with a fresh history.
    pub fn from_session(session: &PhotoSession, config: &CompositorConfig) -> Self {
        Self::new(session.placed_stickers.clone(), config)
    }

    pub fn stickers(&self) -> &[PlacedSticker] {
        &self.stickers
    }

    pub fn into_stickers(self) -> Vec<PlacedSticker> {
        self.stickers
    }

    pub fn mode(&self) -> &InteractionMode {
        &self.mode
    }

    pub fn selected(&self) -> Option<&str> {
        self.mode.selected()
    }

    pub fn selected_sticker(&self) -> Option<&PlacedSticker> {
        let id = self.selected()?;
        self.stickers.iter().find(|s| s.id == id)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.mode, InteractionMode::Dragging { .. })
    }

    /// Incremented whenever the sticker list or selection changes.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn history(&self) -> &History<Vec<PlacedSticker>> {
        &self.history
    }

    fn touch(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    fn record(&mut self) -> bool {
        let pushed = self.history.push_if_changed(self.stickers.clone());
        if pushed {
            debug!(index = self.history.index(), "history snapshot recorded");
        }
        pushed
    }

    // ------------------------------------------------------------------------
    // Pointer
    // ------------------------------------------------------------------------

    /// Selects the first sticker under the pointer and starts dragging it,
    /// or clears the selection on a miss.
    pub fn pointer_down(&mut self, x: f32, y: f32) -> Option<&str> {
        match hit_test(&self.stickers, x, y, self.hit_radius) {
            Some(index) => {
                let sticker = &self.stickers[index];
                self.mode = InteractionMode::Dragging {
                    sticker_id: sticker.id.clone(),
                    offset: Point::new(x - sticker.x, y - sticker.y),
                    moved: false,
                };
            }
            None => self.mode = InteractionMode::Idle { selected: None },
        }
        self.touch();
        self.selected()
    }

    /// Moves the dragged sticker so the grab offset is preserved.
    ///
    /// Returns false when not dragging.
    pub fn pointer_move(&mut self, x: f32, y: f32) -> bool {
        let InteractionMode::Dragging {
            sticker_id,
            offset,
            moved,
        } = &mut self.mode
        else {
            return false;
        };
        let Some(sticker) = self.stickers.iter_mut().find(|s| s.id == *sticker_id) else {
            return false;
        };

        sticker.x = x - offset.x;
        sticker.y = y - offset.y;
        *moved = true;
        self.touch();
        true
    }

    /// Ends a drag. Returns true if a history snapshot was recorded.
    pub fn pointer_up(&mut self) -> bool {
        let InteractionMode::Dragging { sticker_id, .. } = &self.mode else {
            return false;
        };
        self.mode = InteractionMode::Idle {
            selected: Some(sticker_id.clone()),
        };
        self.record()
    }

    // ------------------------------------------------------------------------
    // Edits
    // ------------------------------------------------------------------------

    /// Places `sticker` at the canvas centre, selects it and records history.
    /// Returns the new placement id.
    pub fn add_sticker(
        &mut self,
        sticker: &Sticker,
        canvas_width: u32,
        canvas_height: u32,
    ) -> String {
        self.place(
            sticker.id.to_string(),
            sticker.src.to_string(),
            canvas_width,
            canvas_height,
        )
    }

    /// Like [`add_sticker`](Self::add_sticker) for a user-supplied image,
    /// typically a `data:` URL with an id from [`catalog::custom_sticker_id`].
    ///
    /// [`catalog::custom_sticker_id`]: crate::catalog::custom_sticker_id
    pub fn add_custom_sticker(
        &mut self,
        sticker_id: impl Into<String>,
        src: impl Into<String>,
        canvas_width: u32,
        canvas_height: u32,
    ) -> String {
        self.place(sticker_id.into(), src.into(), canvas_width, canvas_height)
    }

    fn place(
        &mut self,
        sticker_id: String,
        src: String,
        canvas_width: u32,
        canvas_height: u32,
    ) -> String {
        let id = self.fresh_id();
        self.stickers.push(PlacedSticker {
            id: id.clone(),
            sticker_id,
            src,
            x: canvas_width as f32 / 2.0,
            y: canvas_height as f32 / 2.0,
            scale: 1.0,
            rotation: 0.0,
        });
        self.mode = InteractionMode::Idle {
            selected: Some(id.clone()),
        };
        self.record();
        self.touch();
        id
    }

    /// Next `sticker-N` id not used by the current list.
    fn fresh_id(&mut self) -> String {
        loop {
            self.next_id = self.next_id.wrapping_add(1);
            let id = format!("{PLACEMENT_PREFIX}{}", self.next_id);
            if !self.stickers.iter().any(|s| s.id == id) {
                return id;
            }
        }
    }

    /// Removes the selected sticker. Returns false if nothing was selected.
    pub fn delete_selected(&mut self) -> bool {
        let Some(id) = self.selected().map(str::to_string) else {
            return false;
        };
        let before = self.stickers.len();
        self.stickers.retain(|s| s.id != id);
        self.mode = InteractionMode::Idle { selected: None };
        self.touch();
        if self.stickers.len() == before {
            return false;
        }
        self.record();
        true
    }

    /// Sets the selected sticker's scale, clamped to the slider range.
    ///
    /// Not recorded until [`commit`](Self::commit).
    pub fn set_scale(&mut self, scale: f32) -> bool {
        if !scale.is_finite() {
            return false;
        }
        let scale = scale.clamp(MIN_STICKER_SCALE, MAX_STICKER_SCALE);
        self.update_selected(|s| s.scale = scale)
    }

    /// Sets the selected sticker's rotation, normalised to `[-180, 180]`.
    ///
    /// Not recorded until [`commit`](Self::commit).
    pub fn set_rotation(&mut self, degrees: f32) -> bool {
        if !degrees.is_finite() {
            return false;
        }
        let rotation = normalize_degrees(degrees);
        self.update_selected(|s| s.rotation = rotation)
    }

    fn update_selected(&mut self, f: impl FnOnce(&mut PlacedSticker)) -> bool {
        let Some(id) = self.selected().map(str::to_string) else {
            return false;
        };
        let Some(sticker) = self.stickers.iter_mut().find(|s| s.id == id) else {
            return false;
        };
        f(sticker);
        self.touch();
        true
    }

    /// Records the current list if it differs from the last snapshot.
    pub fn commit(&mut self) -> bool {
        self.record()
    }

    pub fn select(&mut self, id: Option<&str>) {
        let selected = id
            .filter(|id| self.stickers.iter().any(|s| s.id == *id))
            .map(str::to_string);
        self.mode = InteractionMode::Idle { selected };
        self.touch();
    }

    // ------------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------------

    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo() else {
            return false;
        };
        self.stickers = snapshot.clone();
        self.after_restore();
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo() else {
            return false;
        };
        self.stickers = snapshot.clone();
        self.after_restore();
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Drops any drag and forgets a selection that no longer exists.
    fn after_restore(&mut self) {
        let selected = self
            .selected()
            .filter(|id| self.stickers.iter().any(|s| s.id == *id))
            .map(str::to_string);
        self.mode = InteractionMode::Idle { selected };
        self.touch();
    }
}

/// Wraps an angle into `[-180, 180]`.
pub fn normalize_degrees(degrees: f32) -> f32 {
    let wrapped = (degrees + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 && degrees > 0.0 {
        180.0
    } else {
        wrapped
    }
}
