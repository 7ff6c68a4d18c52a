//! The "manage images" modal shared by a gallery.

/// Label of the per-tile remove control.
pub const REMOVE_LABEL: &str = "Remove";

/// One thumbnail in the modal, in staged-list order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalTile {
    pub src: String,
    /// `Uploaded image N`, 1-based.
    pub alt: String,
}

/// Where a click inside the modal landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    /// The backdrop itself, outside the dialog content.
    Backdrop,
    Content,
}

/// Input the modal reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalEvent {
    CloseControl,
    Click(ClickTarget),
    /// A document-level key press, by key name (`"Escape"`, `"Enter"`, ...).
    KeyDown(String),
    /// The remove control of the tile at this index.
    RemoveTile(usize),
}

/// Modal state. Owned by the gallery it is attached to.
#[derive(Debug, Clone)]
pub struct GalleryModal {
    hidden: bool,
    tiles: Vec<ModalTile>,
    escape_bound: bool,
}

impl GalleryModal {
    /// A modal as found in server-rendered markup, which may claim to be
    /// visible.
    pub fn from_markup(hidden: bool) -> Self {
        Self {
            hidden,
            tiles: Vec::new(),
            escape_bound: false,
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn tiles(&self) -> &[ModalTile] {
        &self.tiles
    }

    /// Whether the document-level Escape handler is installed.
    pub fn escape_bound(&self) -> bool {
        self.escape_bound
    }

    /// Install the Escape handler. Returns `false` if it was already bound.
    pub(crate) fn bind_escape(&mut self) -> bool {
        !std::mem::replace(&mut self.escape_bound, true)
    }

    pub(crate) fn show<'a>(&mut self, sources: impl IntoIterator<Item = &'a str>) {
        self.tiles = sources
            .into_iter()
            .enumerate()
            .map(|(index, src)| ModalTile {
                src: src.to_string(),
                alt: format!("Uploaded image {}", index + 1),
            })
            .collect();
        self.hidden = false;
    }

    pub(crate) fn hide(&mut self) {
        self.hidden = true;
    }
}

impl Default for GalleryModal {
    fn default() -> Self {
        Self::from_markup(true)
    }
}
