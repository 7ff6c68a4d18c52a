//! Grid view model computed by [`crate::Gallery::render`].

use crate::MAX_DISPLAYED;

/// Alt text on every grid image.
pub const CELL_ALT: &str = "Uploaded character portrait";

/// Placeholder text for an empty gallery.
pub const EMPTY_MESSAGE: &str = "Drop up to four heroic portraits.";

/// Grid-level layout keyed by the number of displayed images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutVariant {
    One,
    Two,
    Three,
    Four,
}

impl LayoutVariant {
    /// Variant for `count` displayed images, `None` when the grid is empty.
    pub fn for_count(count: usize) -> Option<Self> {
        match count.min(MAX_DISPLAYED) {
            0 => None,
            1 => Some(Self::One),
            2 => Some(Self::Two),
            3 => Some(Self::Three),
            _ => Some(Self::Four),
        }
    }

    pub fn class(self) -> &'static str {
        match self {
            Self::One => "count-1",
            Self::Two => "count-2",
            Self::Three => "count-3",
            Self::Four => "count-4",
        }
    }
}

/// Placement of a single cell inside its layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellSlot {
    OneImg,
    TwoImg,
    /// First two cells of a three-image layout.
    ThreeImgTop,
    /// Third cell of a three-image layout.
    ThreeImgBottom,
    FourImg,
}

impl CellSlot {
    fn for_position(layout: LayoutVariant, index: usize) -> Self {
        match layout {
            LayoutVariant::One => Self::OneImg,
            LayoutVariant::Two => Self::TwoImg,
            LayoutVariant::Three if index < 2 => Self::ThreeImgTop,
            LayoutVariant::Three => Self::ThreeImgBottom,
            LayoutVariant::Four => Self::FourImg,
        }
    }

    pub fn class(self) -> &'static str {
        match self {
            Self::OneImg => "one-img",
            Self::TwoImg => "two-img",
            Self::ThreeImgTop => "three-img-top",
            Self::ThreeImgBottom => "three-img-bottom",
            Self::FourImg => "four-img",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridCell {
    pub src: String,
    pub slot: CellSlot,
}

impl GridCell {
    /// CSS classes of the cell wrapper.
    pub fn classes(&self) -> [&'static str; 2] {
        ["hero-portrait-cell", self.slot.class()]
    }
}

/// Rendered state of the portrait grid.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GridView {
    /// `None` renders the empty-state placeholder.
    pub layout: Option<LayoutVariant>,
    pub cells: Vec<GridCell>,
}

impl GridView {
    /// Build the grid from staged sources. Only the first
    /// [`MAX_DISPLAYED`] are shown.
    pub fn build<'a>(sources: impl IntoIterator<Item = &'a str>) -> Self {
        let shown: Vec<&str> = sources.into_iter().take(MAX_DISPLAYED).collect();
        let Some(layout) = LayoutVariant::for_count(shown.len()) else {
            return Self::default();
        };

        let cells = shown
            .into_iter()
            .enumerate()
            .map(|(index, src)| GridCell {
                src: src.to_string(),
                slot: CellSlot::for_position(layout, index),
            })
            .collect();

        Self {
            layout: Some(layout),
            cells,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.layout.is_none()
    }

    /// CSS class on the grid container.
    pub fn class(&self) -> &'static str {
        self.layout.map_or("is-empty", LayoutVariant::class)
    }

    /// Placeholder text, present only when the grid is empty.
    pub fn empty_message(&self) -> Option<&'static str> {
        self.is_empty().then_some(EMPTY_MESSAGE)
    }
}
