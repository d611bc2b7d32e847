//! Built-in templates, stickers and background colors.
//!
//! The registries are immutable. Lookups return owned [`Template`]s with
//! their geometry resolved, ready to hand to the compositor.

use serde::{Deserialize, Serialize};

use crate::geometry::{FrameArea, Layout, canvas_size, resolve_frame_areas};

/// Background color of a fresh session.
pub const DEFAULT_BACKGROUND: &str = "#FFE4EC";

/// Background swatches offered by the editor, light to dark per hue.
pub const BACKGROUND_COLORS: &[&str] = &[
    "#FFE4EC", "#FFF0F5", "#FFB6C1", "#FFC0CB", "#FF69B4", "#FF1493", "#DB7093",
    "#F0E6FF", "#E6E6FA", "#DDA0DD", "#DA70D6", "#BA55D3", "#9370DB", "#8A2BE2",
    "#E6F3FF", "#B0E0E6", "#87CEEB", "#87CEFA", "#00BFFF", "#1E90FF", "#4169E1",
    "#E6FFE6", "#98FB98", "#90EE90", "#00FA9A", "#00FF7F", "#3CB371", "#2E8B57",
    "#FFF5E6", "#FFFACD", "#FFE4B5", "#FFD700", "#FFA500", "#FF8C00", "#FF7F50",
    "#FFE6E6", "#FFC0CB", "#FFB6C1", "#FF69B4", "#FF1493", "#DC143C", "#B22222",
    "#FFFFFF", "#F5F5DC", "#FAEBD7", "#FFE4C4", "#D2B48C", "#BC8F8F", "#8B4513",
    "#2C2C2C", "#1A1A1A", "#0D0D0D", "#000000",
];

// ============================================================================
// Templates
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateCategory {
    Korean,
    Polaroid,
    Scrapbook,
    Film,
    Grid,
}

/// A photo layout with its resolved slot geometry.
///
/// `canvas_width`, `canvas_height` and `frame_areas` are derived from
/// `layout` and `slots`; [`Template::normalize`] re-derives them when a
/// deserialized template lacks them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    pub layout: Layout,
    pub slots: usize,
    /// Dedicated overlay graphic. Takes precedence over `preview_image`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_image: Option<String>,
    pub category: TemplateCategory,
    #[serde(default)]
    pub frame_areas: Vec<FrameArea>,
    #[serde(default)]
    pub canvas_width: u32,
    #[serde(default)]
    pub canvas_height: u32,
}

impl Template {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        layout: Layout,
        slots: usize,
        preview_image: Option<String>,
        category: TemplateCategory,
    ) -> Self {
        let mut template = Self {
            id: id.into(),
            name: name.into(),
            layout,
            slots,
            frame_image: None,
            preview_image,
            category,
            frame_areas: Vec::new(),
            canvas_width: 0,
            canvas_height: 0,
        };
        template.normalize();
        template
    }

    /// A user-supplied overlay on a 2x2 grid, filed under scrapbook.
    pub fn custom(
        id: impl Into<String>,
        name: impl Into<String>,
        slots: usize,
        overlay: impl Into<String>,
    ) -> Self {
        Self::new(
            id,
            name,
            Layout::Grid2x2,
            slots,
            Some(overlay.into()),
            TemplateCategory::Scrapbook,
        )
    }

    /// Fills in canvas size and frame areas if missing or inconsistent.
    ///
    /// Returns true if anything was re-derived.
    pub fn normalize(&mut self) -> bool {
        let (width, height) = canvas_size(&self.layout);
        let size_ok = self.canvas_width == width && self.canvas_height == height;
        let areas_ok = self.frame_areas.len() == self.slots;
        if size_ok && areas_ok {
            return false;
        }

        self.canvas_width = width;
        self.canvas_height = height;
        self.frame_areas = resolve_frame_areas(&self.layout, self.slots, width, height);
        true
    }

    /// Reference of the image drawn over the finished canvas, if any.
    pub fn overlay_image(&self) -> Option<&str> {
        self.frame_image
            .as_deref()
            .or(self.preview_image.as_deref())
            .filter(|r| !r.is_empty())
    }
}

struct TemplateEntry {
    id: &'static str,
    name: &'static str,
    layout: &'static str,
    slots: usize,
    preview_image: &'static str,
    category: TemplateCategory,
}

const fn template(
    id: &'static str,
    name: &'static str,
    layout: &'static str,
    slots: usize,
    preview_image: &'static str,
    category: TemplateCategory,
) -> TemplateEntry {
    TemplateEntry {
        id,
        name,
        layout,
        slots,
        preview_image,
        category,
    }
}

static TEMPLATES: &[TemplateEntry] = {
    use TemplateCategory::*;
    &[
        template("korean-strip-3", "K-Strip 3", "strip-3", 3, "/templates/korean-strip-4.png", Korean),
        template("korean-strip-4", "K-Strip 4", "strip-4", 4, "/templates/korean-strip-4.png", Korean),
        template("korean-strip-pink", "Pink Dream", "strip-4", 4, "/templates/korean-strip-4.png", Korean),
        template("korean-strip-purple", "Purple Haze", "strip-4", 4, "/templates/korean-strip-4.png", Korean),

        template("polaroid-2", "Polaroid Duo", "polaroid-2", 2, "/templates/polaroid-4.png", Polaroid),
        template("polaroid-4", "Polaroid Quad", "polaroid-4", 4, "/templates/polaroid-4.png", Polaroid),
        template("always-forever", "Always Forever", "polaroid-4", 4, "/templates/always-forever.png", Polaroid),

        template("scrapbook-cute", "Cute Scrapbook", "scrapbook", 4, "/templates/scrapbook-cute.png", Scrapbook),
        template("toy-story", "Toy Story", "scrapbook", 2, "/templates/toy-story.png", Scrapbook),

        template("film-strip-35mm", "35mm Film", "film-strip", 4, "/templates/film-35mm.png", Film),
        template("film-strip-cinema", "Cinema Strip", "film-strip", 3, "/templates/film-35mm.png", Film),

        template("grid-2x2", "2x2 Grid", "grid-2x2", 4, "/templates/polaroid-4.png", Grid),
        template("grid-3x1", "3x1 Wide", "grid-3x1", 3, "/templates/navy-wedding.png", Grid),
        template("woozi-grid", "Woozi Grid", "grid-2x2", 6, "/templates/woozi-grid.png", Grid),
        template("navy-wedding", "Navy Wedding", "strip-3", 3, "/templates/navy-wedding.png", Grid),
    ]
};

impl From<&TemplateEntry> for Template {
    fn from(entry: &TemplateEntry) -> Self {
        Template::new(
            entry.id,
            entry.name,
            Layout::parse(entry.layout),
            entry.slots,
            Some(entry.preview_image.to_string()),
            entry.category,
        )
    }
}

/// All built-in templates in gallery order.
pub fn templates() -> Vec<Template> {
    TEMPLATES.iter().map(Template::from).collect()
}

pub fn template_by_id(id: &str) -> Option<Template> {
    TEMPLATES.iter().find(|t| t.id == id).map(Template::from)
}

pub fn templates_by_category(category: TemplateCategory) -> Vec<Template> {
    TEMPLATES
        .iter()
        .filter(|t| t.category == category)
        .map(Template::from)
        .collect()
}

// ============================================================================
// Stickers
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StickerCategory {
    Cute,
    Sparkles,
    Scrapbook,
    Film,
    Vintage,
    Doodles,
}

impl StickerCategory {
    pub const ALL: [StickerCategory; 6] = [
        Self::Cute,
        Self::Sparkles,
        Self::Scrapbook,
        Self::Film,
        Self::Vintage,
        Self::Doodles,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Cute => "Cute",
            Self::Sparkles => "Sparkles",
            Self::Scrapbook => "Scrapbook",
            Self::Film => "Film",
            Self::Vintage => "Vintage",
            Self::Doodles => "Doodles",
        }
    }
}

/// A sticker the user can place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sticker {
    pub id: &'static str,
    pub src: &'static str,
    pub category: StickerCategory,
    pub name: &'static str,
}

const fn sticker(
    id: &'static str,
    src: &'static str,
    category: StickerCategory,
    name: &'static str,
) -> Sticker {
    Sticker {
        id,
        src,
        category,
        name,
    }
}

pub static STICKERS: &[Sticker] = {
    use StickerCategory::*;
    &[
        sticker("cute-1", "/stickers/cute/heart.png", Cute, "Heart"),
        sticker("cute-2", "/stickers/cute/star.png", Cute, "Star"),
        sticker("cute-3", "/stickers/cute/bow.png", Cute, "Bow"),
        sticker("cute-4", "/stickers/cute/cloud.png", Cute, "Cloud"),
        sticker("cute-5", "/stickers/cute/rainbow.png", Cute, "Rainbow"),
        sticker("cute-6", "/stickers/cute/bear.png", Cute, "Bear"),
        sticker("cute-7", "/stickers/cute/bunny.png", Cute, "Bunny"),
        sticker("cute-8", "/stickers/cute/cat.png", Cute, "Cat"),
        sticker("cute-9", "/stickers/cute/dog.png", Cute, "Dog"),
        sticker("cute-10", "/stickers/cute/flower.png", Cute, "Flower"),
        sticker("cute-11", "/stickers/cute/butterfly.png", Cute, "Butterfly"),
        sticker("cute-12", "/stickers/cute/crown.png", Cute, "Crown"),
        sticker("cute-13", "/stickers/cute/angel.png", Cute, "Angel"),
        sticker("cute-14", "/stickers/cute/devil.png", Cute, "Devil"),
        sticker("cute-15", "/stickers/cute/music.png", Cute, "Music Note"),

        sticker("sparkle-1", "/stickers/sparkles/sparkle-1.png", Sparkles, "Sparkle 1"),
        sticker("sparkle-2", "/stickers/sparkles/sparkle-2.png", Sparkles, "Sparkle 2"),
        sticker("sparkle-3", "/stickers/sparkles/sparkle-3.png", Sparkles, "Sparkle 3"),
        sticker("sparkle-4", "/stickers/sparkles/glitter.png", Sparkles, "Glitter"),
        sticker("sparkle-5", "/stickers/sparkles/shine.png", Sparkles, "Shine"),
        sticker("sparkle-6", "/stickers/sparkles/diamond.png", Sparkles, "Diamond"),
        sticker("sparkle-7", "/stickers/sparkles/gem.png", Sparkles, "Gem"),
        sticker("sparkle-8", "/stickers/sparkles/star-burst.png", Sparkles, "Star Burst"),
        sticker("sparkle-9", "/stickers/sparkles/magic.png", Sparkles, "Magic"),
        sticker("sparkle-10", "/stickers/sparkles/twinkle.png", Sparkles, "Twinkle"),

        sticker("scrap-1", "/stickers/scrapbook/tape.png", Scrapbook, "Washi Tape"),
        sticker("scrap-2", "/stickers/scrapbook/tape-corner.png", Scrapbook, "Corner Tape"),
        sticker("scrap-3", "/stickers/scrapbook/paper-clip.png", Scrapbook, "Paper Clip"),
        sticker("scrap-4", "/stickers/scrapbook/pin.png", Scrapbook, "Push Pin"),
        sticker("scrap-5", "/stickers/scrapbook/staple.png", Scrapbook, "Staple"),
        sticker("scrap-6", "/stickers/scrapbook/string.png", Scrapbook, "String"),
        sticker("scrap-7", "/stickers/scrapbook/ribbon.png", Scrapbook, "Ribbon"),
        sticker("scrap-8", "/stickers/scrapbook/lace.png", Scrapbook, "Lace"),
        sticker("scrap-9", "/stickers/scrapbook/button.png", Scrapbook, "Button"),
        sticker("scrap-10", "/stickers/scrapbook/seal.png", Scrapbook, "Seal"),
        sticker("scrap-11", "/stickers/scrapbook/stamp.png", Scrapbook, "Stamp"),
        sticker("scrap-12", "/stickers/scrapbook/label.png", Scrapbook, "Label"),
        sticker("scrap-13", "/stickers/scrapbook/tag.png", Scrapbook, "Tag"),
        sticker("scrap-14", "/stickers/scrapbook/frame-decor.png", Scrapbook, "Frame Decor"),
        sticker("scrap-15", "/stickers/scrapbook/corner.png", Scrapbook, "Corner"),

        sticker("film-1", "/stickers/film/camera.png", Film, "Camera"),
        sticker("film-2", "/stickers/film/film-roll.png", Film, "Film Roll"),
        sticker("film-3", "/stickers/film/clapper.png", Film, "Clapper"),
        sticker("film-4", "/stickers/film/projector.png", Film, "Projector"),
        sticker("film-5", "/stickers/film/light.png", Film, "Studio Light"),
        sticker("film-6", "/stickers/film/megaphone.png", Film, "Megaphone"),
        sticker("film-7", "/stickers/film/director-chair.png", Film, "Director Chair"),
        sticker("film-8", "/stickers/film/spotlight.png", Film, "Spotlight"),
        sticker("film-9", "/stickers/film/reel.png", Film, "Reel"),
        sticker("film-10", "/stickers/film/slate.png", Film, "Slate"),

        sticker("vintage-1", "/stickers/vintage/postage.png", Vintage, "Postage"),
        sticker("vintage-2", "/stickers/vintage/postcard.png", Vintage, "Postcard"),
        sticker("vintage-3", "/stickers/vintage/rose.png", Vintage, "Rose"),
        sticker("vintage-4", "/stickers/vintage/doily.png", Vintage, "Doily"),
        sticker("vintage-5", "/stickers/vintage/key.png", Vintage, "Key"),
        sticker("vintage-6", "/stickers/vintage/locket.png", Vintage, "Locket"),
        sticker("vintage-7", "/stickers/vintage/feather.png", Vintage, "Feather"),
        sticker("vintage-8", "/stickers/vintage/pocket-watch.png", Vintage, "Pocket Watch"),
        sticker("vintage-9", "/stickers/vintage/compass.png", Vintage, "Compass"),
        sticker("vintage-10", "/stickers/vintage/map.png", Vintage, "Map"),
        sticker("vintage-11", "/stickers/vintage/stamp-vintage.png", Vintage, "Vintage Stamp"),
        sticker("vintage-12", "/stickers/vintage/ticket.png", Vintage, "Ticket"),

        sticker("doodle-1", "/stickers/doodles/arrow.png", Doodles, "Arrow"),
        sticker("doodle-2", "/stickers/doodles/swirl.png", Doodles, "Swirl"),
        sticker("doodle-3", "/stickers/doodles/line.png", Doodles, "Line"),
        sticker("doodle-4", "/stickers/doodles/squiggle.png", Doodles, "Squiggle"),
        sticker("doodle-5", "/stickers/doodles/circle.png", Doodles, "Circle"),
        sticker("doodle-6", "/stickers/doodles/square.png", Doodles, "Square"),
        sticker("doodle-7", "/stickers/doodles/triangle.png", Doodles, "Triangle"),
        sticker("doodle-8", "/stickers/doodles/star-doodle.png", Doodles, "Star Doodle"),
        sticker("doodle-9", "/stickers/doodles/heart-doodle.png", Doodles, "Heart Doodle"),
        sticker("doodle-10", "/stickers/doodles/smile.png", Doodles, "Smile"),
        sticker("doodle-11", "/stickers/doodles/wink.png", Doodles, "Wink"),
        sticker("doodle-12", "/stickers/doodles/speech-bubble.png", Doodles, "Speech Bubble"),
        sticker("doodle-13", "/stickers/doodles/thought-bubble.png", Doodles, "Thought Bubble"),
        sticker("doodle-14", "/stickers/doodles/exclamation.png", Doodles, "Exclamation"),
        sticker("doodle-15", "/stickers/doodles/question.png", Doodles, "Question"),
        sticker("doodle-16", "/stickers/doodles/check.png", Doodles, "Check"),
        sticker("doodle-17", "/stickers/doodles/x-mark.png", Doodles, "X Mark"),
        sticker("doodle-18", "/stickers/doodles/zigzag.png", Doodles, "Zigzag"),
        sticker("doodle-19", "/stickers/doodles/loop.png", Doodles, "Loop"),
        sticker("doodle-20", "/stickers/doodles/spiral.png", Doodles, "Spiral"),
    ]
};

/// Catalog id for a user-uploaded sticker.
pub fn custom_sticker_id(timestamp: u64) -> String {
    format!("custom-{timestamp}")
}

pub fn sticker_by_id(id: &str) -> Option<&'static Sticker> {
    STICKERS.iter().find(|s| s.id == id)
}

pub fn stickers_by_category(category: StickerCategory) -> impl Iterator<Item = &'static Sticker> {
    STICKERS.iter().filter(move |s| s.category == category)
}
