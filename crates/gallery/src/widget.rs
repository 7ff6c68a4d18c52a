use std::fmt;
use std::sync::Arc;

use forge_core::data_url;
use futures::stream::{FuturesUnordered, StreamExt};
use serde_json::Value;

use crate::file::FileSource;
use crate::modal::{ClickTarget, GalleryModal, ModalEvent};
use crate::view::GridView;

/// Where a staged image came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageOrigin {
    /// A URL persisted by an earlier submission.
    Existing,
    /// A file chosen in this session, previewed as an inline data URL.
    NewFile,
}

/// One entry of the staged list.
#[derive(Clone)]
pub struct StagedImage {
    /// Inline data URL for new files, the stored URL for existing images.
    pub source: String,
    pub origin: ImageOrigin,
    pub raw_file: Option<Arc<dyn FileSource>>,
    /// Selection sequence; the list is always sorted by it.
    seq: u64,
}

impl fmt::Debug for StagedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StagedImage")
            .field("source_len", &self.source.len())
            .field("origin", &self.origin)
            .field("raw_file", &self.raw_file.as_ref().map(|file| file.name()))
            .field("seq", &self.seq)
            .finish()
    }
}

/// A portrait gallery being assembled for one character form.
pub struct Gallery {
    items: Vec<StagedImage>,
    next_seq: u64,
    field_value: String,
    manage_disabled: bool,
    grid: GridView,
    modal: Option<GalleryModal>,
}

impl Gallery {
    /// Build a gallery from the server-embedded initial state: a URL-escaped
    /// JSON array of existing image URLs.
    ///
    /// Absent, malformed or non-array input yields an empty gallery. Entries
    /// that are not strings are skipped. The grid is rendered once.
    pub fn initialize(encoded: Option<&str>) -> Self {
        let urls = encoded.map(decode_initial_state).unwrap_or_default();

        let mut gallery = Self {
            items: Vec::with_capacity(urls.len()),
            next_seq: 0,
            field_value: String::new(),
            manage_disabled: true,
            grid: GridView::default(),
            modal: None,
        };
        for url in urls {
            let seq = gallery.take_seq();
            gallery.items.push(StagedImage {
                source: url,
                origin: ImageOrigin::Existing,
                raw_file: None,
                seq,
            });
        }
        gallery.render();
        gallery
    }

    pub fn items(&self) -> &[StagedImage] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Current value of the hidden `portraits` form field.
    pub fn field_value(&self) -> &str {
        &self.field_value
    }

    /// Whether the "manage images" control is disabled.
    pub fn manage_disabled(&self) -> bool {
        self.manage_disabled
    }

    /// The grid as of the last [`render`](Self::render).
    pub fn grid(&self) -> &GridView {
        &self.grid
    }

    pub fn modal(&self) -> Option<&GalleryModal> {
        self.modal.as_ref()
    }

    // -----------------------------------------------------------------------
    // Staged list
    // -----------------------------------------------------------------------

    /// Stage the image files among `files`, skipping anything whose declared
    /// media type is not `image/*`.
    ///
    /// Reads run concurrently. Each file takes a sequence number when it is
    /// selected and is inserted by that number when its read completes, so
    /// the final order is selection order whatever order reads finish in.
    /// The grid is re-rendered after every insertion. A failed read is
    /// logged and dropped.
    pub async fn add_files(&mut self, files: Vec<Arc<dyn FileSource>>) {
        let mut reads = FuturesUnordered::new();

        for file in files {
            if !file.media_type().starts_with("image/") {
                tracing::debug!(
                    name = file.name(),
                    media_type = file.media_type(),
                    "Skipping non-image file"
                );
                continue;
            }
            let seq = self.take_seq();
            reads.push(async move {
                let result = file.read_all().await;
                (seq, file, result)
            });
        }

        while let Some((seq, file, result)) = reads.next().await {
            match result {
                Ok(bytes) => {
                    let source = data_url::encode(file.media_type(), &bytes);
                    self.insert_in_order(StagedImage {
                        source,
                        origin: ImageOrigin::NewFile,
                        raw_file: Some(file),
                        seq,
                    });
                    self.render();
                }
                Err(e) => {
                    tracing::warn!(name = file.name(), error = %e, "Failed to read selected file");
                }
            }
        }
    }

    /// Remove the item at `index`. Out of range is a no-op.
    pub fn remove_at(&mut self, index: usize) -> Option<StagedImage> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    /// Files still attached to new-file items, in list order. This is what
    /// the form's file input holds after a render.
    pub fn pending_files(&self) -> Vec<Arc<dyn FileSource>> {
        self.items
            .iter()
            .filter(|item| item.origin == ImageOrigin::NewFile)
            .filter_map(|item| item.raw_file.clone())
            .collect()
    }

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    /// Recompute the grid, then re-sync the hidden field and the manage
    /// control.
    pub fn render(&mut self) -> &GridView {
        self.grid = GridView::build(self.items.iter().map(|item| item.source.as_str()));
        self.sync_field();
        self.manage_disabled = self.items.is_empty();
        &self.grid
    }

    /// Write the staged sources, in order, as a JSON array into the hidden
    /// field.
    pub fn sync_field(&mut self) -> &str {
        let sources: Vec<&str> = self.items.iter().map(|item| item.source.as_str()).collect();
        self.field_value = serde_json::to_string(&sources).unwrap_or_else(|_| "[]".to_string());
        &self.field_value
    }

    // -----------------------------------------------------------------------
    // Modal
    // -----------------------------------------------------------------------

    /// Attach the manage modal. It is hidden regardless of its markup state
    /// and its Escape handler is bound unless this modal instance already has
    /// one.
    pub fn attach_modal(&mut self, mut modal: GalleryModal) {
        modal.hide();
        modal.bind_escape();
        self.modal = Some(modal);
    }

    /// Detach and return the modal, keeping its binding state.
    pub fn detach_modal(&mut self) -> Option<GalleryModal> {
        self.modal.take()
    }

    /// Click on the "manage images" control. Ignored while disabled.
    pub fn click_manage(&mut self) {
        if self.manage_disabled {
            return;
        }
        self.open_modal();
    }

    /// Show the modal with one tile per staged image. With nothing staged
    /// the modal is closed instead.
    pub fn open_modal(&mut self) {
        if self.items.is_empty() {
            self.close_modal();
            return;
        }
        let Some(modal) = self.modal.as_mut() else {
            return;
        };
        modal.show(self.items.iter().map(|item| item.source.as_str()));
    }

    pub fn close_modal(&mut self) {
        if let Some(modal) = self.modal.as_mut() {
            modal.hide();
        }
    }

    /// Dispatch a modal interaction.
    pub fn handle_modal_event(&mut self, event: ModalEvent) {
        let Some(modal) = self.modal.as_ref() else {
            return;
        };
        let escape_active = modal.escape_bound() && !modal.is_hidden();

        match event {
            ModalEvent::CloseControl | ModalEvent::Click(ClickTarget::Backdrop) => {
                self.close_modal();
            }
            ModalEvent::Click(ClickTarget::Content) => {}
            ModalEvent::KeyDown(key) => {
                if key == "Escape" && escape_active {
                    self.close_modal();
                }
            }
            ModalEvent::RemoveTile(index) => {
                self.remove_at(index);
                self.render();
                self.open_modal();
            }
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn take_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    fn insert_in_order(&mut self, item: StagedImage) {
        let pos = self.items.partition_point(|existing| existing.seq < item.seq);
        self.items.insert(pos, item);
    }
}

/// Decode the URL-escaped JSON array of initial image URLs, failing soft.
fn decode_initial_state(encoded: &str) -> Vec<String> {
    if encoded.is_empty() {
        return Vec::new();
    }
    let Ok(json) = urlencoding::decode(encoded) else {
        return Vec::new();
    };
    match serde_json::from_str::<Value>(&json) {
        Ok(Value::Array(entries)) => entries
            .into_iter()
            .filter_map(|entry| match entry {
                Value::String(url) => Some(url),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::file::MemoryFile;
    use crate::view::LayoutVariant;

    fn encoded(urls: &[&str]) -> String {
        let json = serde_json::to_string(urls).unwrap();
        urlencoding::encode(&json).into_owned()
    }

    fn gallery_with(urls: &[&str]) -> Gallery {
        Gallery::initialize(Some(&encoded(urls)))
    }

    fn field_sources(gallery: &Gallery) -> Vec<String> {
        serde_json::from_str(gallery.field_value()).unwrap()
    }

    fn image(name: &str, bytes: &[u8]) -> Arc<dyn FileSource> {
        Arc::new(MemoryFile::new(name, "image/png", bytes.to_vec()))
    }

    /// Completes after a delay, to force out-of-order completion.
    struct SlowFile {
        inner: MemoryFile,
        delay: Duration,
    }

    #[async_trait]
    impl FileSource for SlowFile {
        fn name(&self) -> &str {
            self.inner.name()
        }
        fn media_type(&self) -> &str {
            self.inner.media_type()
        }
        async fn read_all(&self) -> io::Result<Vec<u8>> {
            tokio::time::sleep(self.delay).await;
            self.inner.read_all().await
        }
    }

    struct BrokenFile;

    #[async_trait]
    impl FileSource for BrokenFile {
        fn name(&self) -> &str {
            "broken.png"
        }
        fn media_type(&self) -> &str {
            "image/png"
        }
        async fn read_all(&self) -> io::Result<Vec<u8>> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        }
    }

    // -- initialize --------------------------------------------------------

    #[test]
    fn initialize_decodes_existing_urls() {
        let gallery = gallery_with(&["/uploads/characters/a.png", "/uploads/characters/b.png"]);
        assert_eq!(gallery.len(), 2);
        assert!(gallery.items().iter().all(|i| i.origin == ImageOrigin::Existing));
        assert_eq!(gallery.grid().layout, Some(LayoutVariant::Two));
        assert!(!gallery.manage_disabled());
    }

    #[test]
    fn initialize_fails_soft() {
        for input in [None, Some(""), Some("%E0%A4%A"), Some("not%20json"), Some("%7B%7D")] {
            let gallery = Gallery::initialize(input);
            assert!(gallery.is_empty(), "input {input:?} should give an empty gallery");
            assert!(gallery.grid().is_empty());
            assert!(gallery.manage_disabled());
            assert_eq!(gallery.field_value(), "[]");
        }
    }

    #[test]
    fn initialize_skips_non_strings() {
        let raw = urlencoding::encode(r#"["/uploads/characters/a.png", 1, null]"#).into_owned();
        let gallery = Gallery::initialize(Some(&raw));
        assert_eq!(field_sources(&gallery), vec!["/uploads/characters/a.png"]);
    }

    // -- add files ---------------------------------------------------------

    #[tokio::test]
    async fn add_files_skips_non_images() {
        let mut gallery = Gallery::initialize(None);
        let text: Arc<dyn FileSource> =
            Arc::new(MemoryFile::new("notes.txt", "text/plain", b"hi".to_vec()));

        gallery.add_files(vec![text, image("a.png", b"png")]).await;

        assert_eq!(gallery.len(), 1);
        let item = &gallery.items()[0];
        assert_eq!(item.origin, ImageOrigin::NewFile);
        assert_eq!(item.source, data_url::encode("image/png", b"png"));
        assert_eq!(gallery.pending_files().len(), 1);
    }

    #[tokio::test]
    async fn add_files_keeps_selection_order() {
        let mut gallery = gallery_with(&["/uploads/characters/a.png"]);
        let slow: Arc<dyn FileSource> = Arc::new(SlowFile {
            inner: MemoryFile::new("first.png", "image/png", b"first".to_vec()),
            delay: Duration::from_millis(60),
        });
        let fast = image("second.png", b"second");

        gallery.add_files(vec![slow, fast]).await;

        assert_eq!(
            field_sources(&gallery),
            vec![
                "/uploads/characters/a.png".to_string(),
                data_url::encode("image/png", b"first"),
                data_url::encode("image/png", b"second"),
            ]
        );
    }

    #[tokio::test]
    async fn failed_read_is_dropped() {
        let mut gallery = Gallery::initialize(None);
        let broken: Arc<dyn FileSource> = Arc::new(BrokenFile);
        gallery.add_files(vec![broken, image("ok.png", b"ok")]).await;
        assert_eq!(gallery.len(), 1);
        assert_eq!(gallery.pending_files()[0].name(), "ok.png");
    }

    // -- render / sync -----------------------------------------------------

    #[test]
    fn field_matches_sources_in_order() {
        let urls = [
            "/uploads/characters/c.png",
            "/uploads/characters/a.png",
            "/uploads/characters/b.png",
        ];
        let mut gallery = gallery_with(&urls);
        gallery.sync_field();
        assert_eq!(field_sources(&gallery), urls);
    }

    #[test]
    fn more_than_four_staged_but_four_rendered() {
        let mut gallery = gallery_with(&["/a", "/b", "/c", "/d", "/e"]);
        let view = gallery.render();
        assert_eq!(view.cells.len(), 4);
        assert_eq!(field_sources(&gallery).len(), 5);
    }

    #[test]
    fn remove_then_render_drops_item() {
        let mut gallery = gallery_with(&["/uploads/characters/a.png", "/uploads/characters/b.png"]);

        let removed = gallery.remove_at(0).unwrap();
        assert_eq!(removed.source, "/uploads/characters/a.png");
        let view = gallery.render().clone();

        assert!(view.cells.iter().all(|c| c.src != "/uploads/characters/a.png"));
        assert!(!gallery.manage_disabled());

        gallery.remove_at(0);
        gallery.render();
        assert!(gallery.grid().is_empty());
        assert!(gallery.manage_disabled());
    }

    #[test]
    fn remove_out_of_range_is_noop() {
        let mut gallery = gallery_with(&["/uploads/characters/a.png"]);
        assert!(gallery.remove_at(5).is_none());
        assert_eq!(gallery.len(), 1);
    }

    // -- modal -------------------------------------------------------------

    #[test]
    fn attach_hides_modal_from_markup() {
        let mut gallery = gallery_with(&["/a"]);
        gallery.attach_modal(GalleryModal::from_markup(false));
        let modal = gallery.modal().unwrap();
        assert!(modal.is_hidden());
        assert!(modal.escape_bound());
    }

    #[test]
    fn escape_bound_once_per_modal() {
        let mut modal = GalleryModal::default();
        assert!(modal.bind_escape());
        assert!(!modal.bind_escape());

        let mut gallery = gallery_with(&["/a"]);
        gallery.attach_modal(modal);
        let modal = gallery.detach_modal().unwrap();
        let mut other = gallery_with(&["/b"]);
        other.attach_modal(modal);
        assert!(other.modal().unwrap().escape_bound());
    }

    #[test]
    fn open_lists_tiles_and_close_paths() {
        let mut gallery = gallery_with(&["/a", "/b"]);
        gallery.attach_modal(GalleryModal::default());

        gallery.click_manage();
        let modal = gallery.modal().unwrap();
        assert!(!modal.is_hidden());
        assert_eq!(modal.tiles().len(), 2);
        assert_eq!(modal.tiles()[1].alt, "Uploaded image 2");

        gallery.handle_modal_event(ModalEvent::Click(ClickTarget::Content));
        assert!(!gallery.modal().unwrap().is_hidden());

        gallery.handle_modal_event(ModalEvent::Click(ClickTarget::Backdrop));
        assert!(gallery.modal().unwrap().is_hidden());

        gallery.open_modal();
        gallery.handle_modal_event(ModalEvent::KeyDown("Enter".into()));
        assert!(!gallery.modal().unwrap().is_hidden());
        gallery.handle_modal_event(ModalEvent::KeyDown("Escape".into()));
        assert!(gallery.modal().unwrap().is_hidden());

        gallery.open_modal();
        gallery.handle_modal_event(ModalEvent::CloseControl);
        assert!(gallery.modal().unwrap().is_hidden());
    }

    #[test]
    fn open_with_nothing_staged_closes() {
        let mut gallery = Gallery::initialize(None);
        gallery.attach_modal(GalleryModal::default());
        gallery.open_modal();
        assert!(gallery.modal().unwrap().is_hidden());

        // Disabled manage control does nothing.
        gallery.click_manage();
        assert!(gallery.modal().unwrap().is_hidden());
    }

    #[test]
    fn removing_last_tile_closes_modal() {
        let mut gallery = gallery_with(&["/a", "/b"]);
        gallery.attach_modal(GalleryModal::default());
        gallery.open_modal();

        gallery.handle_modal_event(ModalEvent::RemoveTile(0));
        let modal = gallery.modal().unwrap();
        assert!(!modal.is_hidden());
        assert_eq!(modal.tiles().len(), 1);
        assert_eq!(modal.tiles()[0].src, "/b");

        gallery.handle_modal_event(ModalEvent::RemoveTile(0));
        assert!(gallery.modal().unwrap().is_hidden());
        assert!(gallery.manage_disabled());
        assert_eq!(gallery.field_value(), "[]");
    }
}
