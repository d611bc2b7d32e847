//! Slot geometry for template layouts.
//!
//! Every template layout maps to a canvas size and an ordered list of
//! [`FrameArea`]s, one per photo slot. Resolution is a pure function of the
//! layout, slot count, canvas size and padding.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Outer padding and gap between slots, in canvas units.
pub const DEFAULT_PADDING: f32 = 40.0;

/// Width shared by every layout.
pub const CANVAS_WIDTH: u32 = 800;

/// Scrapbook slots as fractions of an 800x800 canvas.
const SCRAPBOOK_SLOTS: [(f32, f32, f32, f32); 4] = [
    (60.0, 60.0, 320.0, 300.0),
    (420.0, 100.0, 320.0, 280.0),
    (80.0, 420.0, 300.0, 320.0),
    (420.0, 440.0, 300.0, 300.0),
];
const SCRAPBOOK_REFERENCE: f32 = 800.0;

// ============================================================================
// FrameArea
// ============================================================================

/// A rectangular photo slot in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameArea {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Radius used to round the slot's clip path.
    #[serde(default, alias = "radius")]
    pub corner_radius: f32,
}

impl FrameArea {
    pub fn new(x: f32, y: f32, width: f32, height: f32, corner_radius: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            corner_radius,
        }
    }

    /// Returns the right edge coordinate (x + width).
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Returns the bottom edge coordinate (y + height).
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Returns true if the two areas share any interior point.
    pub fn overlaps(&self, other: &FrameArea) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Returns true if the area lies inside `[0, width] x [0, height]`.
    pub fn fits_within(&self, width: f32, height: f32) -> bool {
        self.x >= 0.0 && self.y >= 0.0 && self.right() <= width && self.bottom() <= height
    }

    /// Smallest whole-pixel rectangle `(x, y, width, height)` covering this area.
    pub fn pixel_bounds(&self) -> (i32, i32, u32, u32) {
        let x0 = self.x.floor();
        let y0 = self.y.floor();
        let x1 = self.right().ceil();
        let y1 = self.bottom().ceil();
        (
            x0 as i32,
            y0 as i32,
            (x1 - x0).max(0.0) as u32,
            (y1 - y0).max(0.0) as u32,
        )
    }
}

// ============================================================================
// Layout
// ============================================================================

/// The geometric arrangement family of a template.
///
/// Identifiers outside the known set are kept verbatim in [`Layout::Unknown`]
/// and resolve with the strip formula.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Layout {
    Strip3,
    Strip4,
    Polaroid2,
    Polaroid4,
    Grid2x2,
    Grid3x1,
    Scrapbook,
    FilmStrip,
    Unknown(String),
}

/// Layout families share a packing formula and corner radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutFamily {
    Strip,
    FilmStrip,
    Polaroid,
    Grid,
    Scrapbook,
}

impl LayoutFamily {
    pub fn corner_radius(self) -> f32 {
        match self {
            Self::Strip => 8.0,
            Self::FilmStrip => 2.0,
            Self::Polaroid => 4.0,
            Self::Grid => 6.0,
            Self::Scrapbook => 8.0,
        }
    }
}

impl Layout {
    pub const ALL: [Layout; 8] = [
        Layout::Strip3,
        Layout::Strip4,
        Layout::Polaroid2,
        Layout::Polaroid4,
        Layout::Grid2x2,
        Layout::Grid3x1,
        Layout::Scrapbook,
        Layout::FilmStrip,
    ];

    /// Parses a layout identifier. Never fails.
    pub fn parse(id: &str) -> Self {
        match id {
            "strip-3" => Self::Strip3,
            "strip-4" => Self::Strip4,
            "polaroid-2" => Self::Polaroid2,
            "polaroid-4" => Self::Polaroid4,
            "grid-2x2" => Self::Grid2x2,
            "grid-3x1" => Self::Grid3x1,
            "scrapbook" => Self::Scrapbook,
            "film-strip" => Self::FilmStrip,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Strip3 => "strip-3",
            Self::Strip4 => "strip-4",
            Self::Polaroid2 => "polaroid-2",
            Self::Polaroid4 => "polaroid-4",
            Self::Grid2x2 => "grid-2x2",
            Self::Grid3x1 => "grid-3x1",
            Self::Scrapbook => "scrapbook",
            Self::FilmStrip => "film-strip",
            Self::Unknown(id) => id,
        }
    }

    pub fn family(&self) -> LayoutFamily {
        match self {
            Self::Strip3 | Self::Strip4 | Self::Unknown(_) => LayoutFamily::Strip,
            Self::FilmStrip => LayoutFamily::FilmStrip,
            Self::Polaroid2 | Self::Polaroid4 => LayoutFamily::Polaroid,
            Self::Grid2x2 | Self::Grid3x1 => LayoutFamily::Grid,
            Self::Scrapbook => LayoutFamily::Scrapbook,
        }
    }

    /// Canvas height for this layout: tall for strips, medium for polaroids,
    /// square otherwise. Unknown identifiers are classified by name.
    pub fn canvas_height(&self) -> u32 {
        let id = self.as_str();
        if id.contains("strip") {
            1200
        } else if id.contains("polaroid") {
            1000
        } else {
            800
        }
    }

    /// Slot count the layout is designed around.
    pub fn default_slots(&self) -> usize {
        match self {
            Self::Strip3 | Self::Grid3x1 => 3,
            Self::Polaroid2 => 2,
            _ => 4,
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Layout {
    fn from(id: String) -> Self {
        Self::parse(&id)
    }
}

impl From<Layout> for String {
    fn from(layout: Layout) -> Self {
        layout.as_str().to_string()
    }
}

/// Returns the `(width, height)` canvas for a layout.
pub fn canvas_size(layout: &Layout) -> (u32, u32) {
    (CANVAS_WIDTH, layout.canvas_height())
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolves slot rectangles with the default padding.
pub fn resolve_frame_areas(
    layout: &Layout,
    slots: usize,
    canvas_width: u32,
    canvas_height: u32,
) -> Vec<FrameArea> {
    resolve_frame_areas_padded(layout, slots, canvas_width, canvas_height, DEFAULT_PADDING)
}

/// Resolves `slots` non-overlapping rectangles for `layout` on the canvas.
pub fn resolve_frame_areas_padded(
    layout: &Layout,
    slots: usize,
    canvas_width: u32,
    canvas_height: u32,
    padding: f32,
) -> Vec<FrameArea> {
    if slots == 0 {
        return Vec::new();
    }

    let width = canvas_width as f32;
    let height = canvas_height as f32;
    let radius = layout.family().corner_radius();

    match layout {
        Layout::Polaroid2 | Layout::Polaroid4 => polaroid(slots, width, height, padding, radius),
        Layout::Grid2x2 => {
            // Six-slot grids switch to three columns.
            let cols = if slots > 4 { 3 } else { 2 };
            grid(cols, slots, width, height, padding, radius)
        }
        Layout::Grid3x1 => grid(slots, slots, width, height, padding, radius),
        Layout::Scrapbook if slots <= SCRAPBOOK_SLOTS.len() => {
            scrapbook(slots, width, height, radius)
        }
        Layout::Scrapbook => {
            let cols = if slots > 4 { 3 } else { 2 };
            grid(cols, slots, width, height, padding, radius)
        }
        Layout::Strip3 | Layout::Strip4 | Layout::FilmStrip | Layout::Unknown(_) => {
            column(slots, width, height, padding, radius)
        }
    }
}

/// Splits `extent` into `count` equal cells separated and surrounded by gaps.
///
/// The gap shrinks below `padding` when the cells would otherwise collapse,
/// so the last cell always ends inside `extent`.
fn fit_axis(extent: f32, padding: f32, count: usize) -> (f32, f32) {
    let n = count.max(1) as f32;
    let gap = padding.min(extent / (2.0 * n + 1.0)).max(0.0);
    let cell = ((extent - gap * (n + 1.0)) / n).max(0.0);
    (gap, cell)
}

fn column(slots: usize, width: f32, height: f32, padding: f32, radius: f32) -> Vec<FrameArea> {
    let (gap_x, slot_width) = fit_axis(width, padding, 1);
    let (gap_y, slot_height) = fit_axis(height, padding, slots);

    (0..slots)
        .map(|i| {
            FrameArea::new(
                gap_x,
                gap_y + i as f32 * (slot_height + gap_y),
                slot_width,
                slot_height,
                radius,
            )
        })
        .collect()
}

fn polaroid(slots: usize, width: f32, height: f32, padding: f32, radius: f32) -> Vec<FrameArea> {
    let cols = slots.min(2);
    let rows = slots.div_ceil(cols);
    let (gap_x, slot_width) = fit_axis(width, padding, cols);
    let (gap_y, max_height) = fit_axis(height, padding, rows);
    let slot_height = (slot_width * 1.2).min(max_height);

    (0..slots)
        .map(|i| {
            let row = (i / cols) as f32;
            let col = (i % cols) as f32;
            FrameArea::new(
                gap_x + col * (slot_width + gap_x),
                gap_y + row * (slot_height + gap_y),
                slot_width,
                slot_height,
                radius,
            )
        })
        .collect()
}

fn grid(
    cols: usize,
    slots: usize,
    width: f32,
    height: f32,
    padding: f32,
    radius: f32,
) -> Vec<FrameArea> {
    let cols = cols.max(1);
    let rows = slots.div_ceil(cols);
    let (gap_x, cell_width) = fit_axis(width, padding, cols);
    let (gap_y, cell_height) = fit_axis(height, padding, rows);

    (0..slots)
        .map(|i| {
            let row = (i / cols) as f32;
            let col = (i % cols) as f32;
            FrameArea::new(
                gap_x + col * (cell_width + gap_x),
                gap_y + row * (cell_height + gap_y),
                cell_width,
                cell_height,
                radius,
            )
        })
        .collect()
}

fn scrapbook(slots: usize, width: f32, height: f32, radius: f32) -> Vec<FrameArea> {
    let sx = width / SCRAPBOOK_REFERENCE;
    let sy = height / SCRAPBOOK_REFERENCE;

    SCRAPBOOK_SLOTS
        .iter()
        .take(slots)
        .map(|&(x, y, w, h)| FrameArea::new(x * sx, y * sy, w * sx, h * sy, radius))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_valid(layout: &Layout, slots: usize) {
        let (w, h) = canvas_size(layout);
        let areas = resolve_frame_areas(layout, slots, w, h);
        assert_eq!(areas.len(), slots, "{layout} with {slots} slots");

        for (i, a) in areas.iter().enumerate() {
            assert!(
                a.fits_within(w as f32, h as f32),
                "{layout}/{slots}: slot {i} {a:?} escapes {w}x{h}"
            );
            for b in &areas[i + 1..] {
                assert!(!a.overlaps(b), "{layout}/{slots}: {a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn every_layout_yields_requested_slot_count() {
        for layout in Layout::ALL.iter().chain([&Layout::parse("mystery")]) {
            for slots in 0..=8 {
                assert_valid(layout, slots);
            }
        }
    }

    #[test]
    fn crowded_layouts_shrink_gaps_to_stay_on_canvas() {
        for layout in [Layout::Strip3, Layout::Polaroid4, Layout::Grid3x1, Layout::Grid2x2] {
            let (w, h) = canvas_size(&layout);
            let areas = resolve_frame_areas(&layout, 200, w, h);
            assert_eq!(areas.len(), 200);

            let last = areas.last().unwrap();
            assert!(last.bottom() <= h as f32 + 0.01, "{layout}: {last:?} below {h}");
            assert!(last.right() <= w as f32 + 0.01, "{layout}: {last:?} right of {w}");
            assert!(areas.iter().all(|a| a.height > 0.0 && a.width > 0.0), "{layout}");
            for pair in areas.windows(2) {
                assert!(!pair[0].overlaps(&pair[1]), "{layout}: {pair:?}");
            }
        }
    }

    #[test]
    fn strip_3_matches_reference_coordinates() {
        let areas = resolve_frame_areas(&Layout::Strip3, 3, 800, 1200);
        let h = (1200.0 - 160.0) / 3.0;
        assert_eq!(areas[0], FrameArea::new(40.0, 40.0, 720.0, h, 8.0));
        assert_eq!(areas[1].y, 40.0 + h + 40.0);
        assert_eq!(areas[2].y, 40.0 + 2.0 * (h + 40.0));
    }

    #[test]
    fn grid_2x2_with_six_slots_uses_three_columns() {
        let areas = resolve_frame_areas(&Layout::Grid2x2, 6, 800, 800);
        assert_eq!(areas.len(), 6);

        let mut columns = areas.iter().map(|a| a.x.round() as i32).collect::<Vec<_>>();
        columns.sort();
        columns.dedup();
        assert_eq!(columns.len(), 3);

        let mut rows = areas.iter().map(|a| a.y.round() as i32).collect::<Vec<_>>();
        rows.sort();
        rows.dedup();
        assert_eq!(rows.len(), 2);

        let first = areas[0];
        for a in &areas {
            assert!((a.width - first.width).abs() < 0.001);
            assert!((a.height - first.height).abs() < 0.001);
        }
    }

    #[test]
    fn grid_2x2_with_four_slots_is_square_grid() {
        let areas = resolve_frame_areas(&Layout::Grid2x2, 4, 800, 800);
        assert_eq!(areas[0], FrameArea::new(40.0, 40.0, 340.0, 340.0, 6.0));
        assert_eq!(areas[3], FrameArea::new(420.0, 420.0, 340.0, 340.0, 6.0));
    }

    #[test]
    fn polaroid_slots_keep_portrait_ratio() {
        let areas = resolve_frame_areas(&Layout::Polaroid4, 4, 800, 1000);
        assert_eq!(areas[0].width, 340.0);
        assert!((areas[0].height - 408.0).abs() < 0.001);
        assert_eq!(areas[0].corner_radius, 4.0);
    }

    #[test]
    fn scrapbook_is_fixed_and_irregular() {
        let areas = resolve_frame_areas(&Layout::Scrapbook, 4, 800, 800);
        assert_eq!(areas[0], FrameArea::new(60.0, 60.0, 320.0, 300.0, 8.0));
        assert_ne!(areas[0].width, areas[2].width);

        let two = resolve_frame_areas(&Layout::Scrapbook, 2, 800, 800);
        assert_eq!(two, areas[..2].to_vec());
    }

    #[test]
    fn unknown_layout_falls_back_to_strip_formula() {
        let unknown = Layout::parse("hexagon");
        assert_eq!(unknown, Layout::Unknown("hexagon".into()));
        let expected = resolve_frame_areas(&Layout::Strip4, 4, 800, 800);
        assert_eq!(resolve_frame_areas(&unknown, 4, 800, 800), expected);
    }

    #[test]
    fn canvas_heights_follow_layout_family() {
        assert_eq!(canvas_size(&Layout::Strip3), (800, 1200));
        assert_eq!(canvas_size(&Layout::FilmStrip), (800, 1200));
        assert_eq!(canvas_size(&Layout::Polaroid2), (800, 1000));
        assert_eq!(canvas_size(&Layout::Grid3x1), (800, 800));
        assert_eq!(canvas_size(&Layout::Scrapbook), (800, 800));
        assert_eq!(canvas_size(&Layout::parse("mega-strip")), (800, 1200));
    }

    #[test]
    fn resolution_is_deterministic() {
        for layout in Layout::ALL {
            let (w, h) = canvas_size(&layout);
            assert_eq!(
                resolve_frame_areas(&layout, 4, w, h),
                resolve_frame_areas(&layout, 4, w, h)
            );
        }
    }

    #[test]
    fn layout_serializes_as_identifier() {
        let json = serde_json::to_string(&Layout::Grid2x2).unwrap();
        assert_eq!(json, "\"grid-2x2\"");
        let parsed: Layout = serde_json::from_str("\"spiral\"").unwrap();
        assert_eq!(parsed.as_str(), "spiral");
    }

    #[test]
    fn pixel_bounds_cover_fractional_area() {
        let area = FrameArea::new(40.0, 426.67, 720.0, 346.66, 8.0);
        assert_eq!(area.pixel_bounds(), (40, 426, 720, 348));
    }
}
