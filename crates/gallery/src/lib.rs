//! Gallery staging widget for character portraits.
//!
//! The widget lets a user assemble images for a character before the
//! surrounding form is submitted. It never talks to the server: existing
//! portraits arrive as a URL-escaped JSON array embedded in the page, new
//! files are read locally and previewed as inline data URLs, and the current
//! list is written into a hidden form field for submission.
//!
//! Everything here is DOM-free. [`Gallery`] owns the staged list and derives
//! view models ([`view::GridView`], [`modal::GalleryModal`]) that a renderer
//! turns into markup, so several independent galleries can live on one page
//! and the behaviour is testable without a browser.

pub mod file;
pub mod modal;
pub mod view;
mod widget;

pub use file::{DiskFile, FileSource, MemoryFile};
pub use modal::{ClickTarget, GalleryModal, ModalEvent};
pub use view::{CellSlot, GridView, LayoutVariant};
pub use widget::{Gallery, ImageOrigin, StagedImage};

/// Number of staged images shown in the grid.
pub const MAX_DISPLAYED: usize = 4;
