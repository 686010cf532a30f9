//! Text documents over VFS content.
//!
//! Documents are materialized lazily from the store and memoized by
//! normalized URI. A document for a missing file starts empty; saving it
//! writes the file into the store (create-on-save).
//!
//! Line/character coordinates count Unicode scalar values, and positions
//! outside the text clamp to the nearest valid location rather than failing.

use crate::events::{Disposable, EventEmitter};
use crate::vfs::VirtualFs;
use hostsim_types::{FsError, FsResult, Position, Range, Uri};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

struct DocState {
    text: String,
    version: u64,
    dirty: bool,
}

/// An in-memory text document backed by a VFS node.
pub struct TextDocument {
    uri: Uri,
    vfs: Arc<VirtualFs>,
    state: RwLock<DocState>,
}

impl TextDocument {
    fn new(uri: Uri, vfs: Arc<VirtualFs>, text: String) -> Self {
        Self {
            uri,
            vfs,
            state: RwLock::new(DocState {
                text,
                version: 1,
                dirty: false,
            }),
        }
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, DocState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// The document's URI.
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// The full text.
    pub fn text(&self) -> String {
        self.read_state().text.clone()
    }

    /// Monotonic version, starting at 1 and bumped by every edit.
    pub fn version(&self) -> u64 {
        self.read_state().version
    }

    /// True if the document has unsaved edits.
    pub fn is_dirty(&self) -> bool {
        self.read_state().dirty
    }

    /// Number of lines. The empty document has one line.
    pub fn line_count(&self) -> u32 {
        self.read_state().text.split('\n').count() as u32
    }

    /// The text of a single line, without its terminator.
    pub fn line_text(&self, line: u32) -> Option<String> {
        self.read_state()
            .text
            .split('\n')
            .nth(line as usize)
            .map(str::to_string)
    }

    /// Convert a position to a scalar offset into the text, clamping the
    /// line to the document and the character to the line.
    pub fn offset_at(&self, position: Position) -> usize {
        offset_in(&self.read_state().text, position)
    }

    /// Convert a scalar offset back to a position, clamping to the end of
    /// the text.
    pub fn position_at(&self, offset: usize) -> Position {
        position_in(&self.read_state().text, offset)
    }

    /// Replace the text in `range` with `new_text`, bumping the version.
    ///
    /// Returns the new version. The change lives only in the document until
    /// `save()` writes it back through the VFS.
    pub fn edit(&self, range: Range, new_text: &str) -> u64 {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let start = byte_index(&state.text, offset_in(&state.text, range.start));
        let end = byte_index(&state.text, offset_in(&state.text, range.end));
        state.text.replace_range(start..end, new_text);
        state.version += 1;
        state.dirty = true;
        state.version
    }

    /// Write the document's text back to the store.
    pub async fn save(&self) -> FsResult<()> {
        let text = self.text();
        self.vfs.write_file(&self.uri, text.into_bytes()).await?;
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.dirty = false;
        Ok(())
    }
}

impl std::fmt::Debug for TextDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read_state();
        f.debug_struct("TextDocument")
            .field("uri", &self.uri.as_str())
            .field("version", &state.version)
            .field("dirty", &state.dirty)
            .finish()
    }
}

/// Scalar offset of `position` in `text`, clamped to valid text.
fn offset_in(text: &str, position: Position) -> usize {
    let mut offset = 0usize;
    for (index, line) in text.split('\n').enumerate() {
        let line_len = line.chars().count();
        if index as u32 == position.line {
            return offset + (position.character as usize).min(line_len);
        }
        offset += line_len + 1;
    }
    text.chars().count()
}

/// Position of scalar offset `offset` in `text`, clamped to the end.
fn position_in(text: &str, offset: usize) -> Position {
    let mut line = 0u32;
    let mut character = 0u32;
    for (seen, ch) in text.chars().enumerate() {
        if seen == offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            character = 0;
        } else {
            character += 1;
        }
    }
    Position::new(line, character)
}

/// Byte index of scalar offset `offset` in `text`.
fn byte_index(text: &str, offset: usize) -> usize {
    text.char_indices()
        .nth(offset)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len())
}

/// Open-document cache keyed by normalized URI.
pub struct DocumentRegistry {
    vfs: Arc<VirtualFs>,
    open_documents: RwLock<HashMap<String, Arc<TextDocument>>>,
    did_open: EventEmitter<Arc<TextDocument>>,
}

impl DocumentRegistry {
    /// Create a registry over the given store.
    pub fn new(vfs: Arc<VirtualFs>) -> Self {
        Self {
            vfs,
            open_documents: RwLock::new(HashMap::new()),
            did_open: EventEmitter::new(),
        }
    }

    /// Open the document for a URI, materializing it on first access.
    ///
    /// Repeated opens of the same URI return the same document. A missing
    /// file opens as an empty document; `save()` will create it.
    pub async fn open(&self, uri: &Uri) -> FsResult<Arc<TextDocument>> {
        if let Some(existing) = self.get(uri) {
            return Ok(existing);
        }

        let text = match self.vfs.read_file_to_string(uri).await {
            Ok(text) => text,
            Err(FsError::FileNotFound(_)) => String::new(),
            Err(err) => return Err(err),
        };

        let document = {
            let mut open_documents = self
                .open_documents
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            // Re-check under the write lock before inserting.
            if let Some(existing) = open_documents.get(uri.as_str()) {
                return Ok(existing.clone());
            }
            let document = Arc::new(TextDocument::new(uri.clone(), self.vfs.clone(), text));
            open_documents.insert(uri.as_str().to_string(), document.clone());
            document
        };

        self.did_open.fire(&document);
        Ok(document)
    }

    /// The cached document for a URI, if it has been opened.
    pub fn get(&self, uri: &Uri) -> Option<Arc<TextDocument>> {
        self.open_documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(uri.as_str())
            .cloned()
    }

    /// Number of open documents.
    pub fn open_count(&self) -> usize {
        self.open_documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Subscribe to document materialization.
    pub fn on_did_open(
        &self,
        listener: impl Fn(&Arc<TextDocument>) + Send + Sync + 'static,
    ) -> Disposable {
        self.did_open.subscribe(listener)
    }

    /// Drop the document cache.
    pub fn clear(&self) {
        self.open_documents
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl std::fmt::Debug for DocumentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentRegistry")
            .field("open", &self.open_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri(path: &str) -> Uri {
        Uri::file(path).unwrap()
    }

    async fn registry_with(files: &[(&str, &str)]) -> DocumentRegistry {
        let vfs = Arc::new(VirtualFs::new());
        for (path, content) in files {
            vfs.write_file(&uri(path), content.as_bytes().to_vec())
                .await
                .unwrap();
        }
        DocumentRegistry::new(vfs)
    }

    #[tokio::test]
    async fn open_is_memoized_by_uri() {
        let registry = registry_with(&[("/a.txt", "hello")]).await;

        let first = registry.open(&uri("/a.txt")).await.unwrap();
        let second = registry.open(&uri("/a.txt")).await.unwrap();
        // Separator style does not split the cache.
        let third = registry.open(&Uri::file(r"\a.txt").unwrap()).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&first, &third));
        assert_eq!(registry.open_count(), 1);
    }

    #[tokio::test]
    async fn missing_file_opens_empty_and_save_creates_it() {
        let registry = registry_with(&[]).await;
        let vfs = registry.vfs.clone();

        let doc = registry.open(&uri("/new.txt")).await.unwrap();
        assert_eq!(doc.text(), "");
        assert!(!vfs.exists(&uri("/new.txt")).await);

        doc.edit(Range::collapsed(Position::new(0, 0)), "created");
        doc.save().await.unwrap();

        assert_eq!(
            vfs.read_file(&uri("/new.txt")).await.unwrap(),
            b"created"
        );
        assert!(!doc.is_dirty());
    }

    #[tokio::test]
    async fn did_open_fires_once_per_materialization() {
        let registry = registry_with(&[("/a.txt", "x")]).await;
        let opened = Arc::new(std::sync::Mutex::new(Vec::new()));
        {
            let opened = opened.clone();
            registry.on_did_open(move |doc| {
                opened.lock().unwrap().push(doc.uri().as_str().to_string());
            });
        }

        registry.open(&uri("/a.txt")).await.unwrap();
        registry.open(&uri("/a.txt")).await.unwrap();

        assert_eq!(*opened.lock().unwrap(), vec!["/a.txt".to_string()]);
    }

    #[tokio::test]
    async fn line_accounting() {
        let registry = registry_with(&[("/t.txt", "alpha\nbeta\n")]).await;
        let doc = registry.open(&uri("/t.txt")).await.unwrap();

        assert_eq!(doc.line_count(), 3);
        assert_eq!(doc.line_text(0).as_deref(), Some("alpha"));
        assert_eq!(doc.line_text(1).as_deref(), Some("beta"));
        assert_eq!(doc.line_text(2).as_deref(), Some(""));
        assert_eq!(doc.line_text(3), None);
    }

    #[tokio::test]
    async fn empty_document_has_one_line() {
        let registry = registry_with(&[]).await;
        let doc = registry.open(&uri("/empty.txt")).await.unwrap();
        assert_eq!(doc.line_count(), 1);
        assert_eq!(doc.line_text(0).as_deref(), Some(""));
    }

    #[tokio::test]
    async fn offset_and_position_round_trip() {
        let registry = registry_with(&[("/t.txt", "ab\ncd")]).await;
        let doc = registry.open(&uri("/t.txt")).await.unwrap();

        assert_eq!(doc.offset_at(Position::new(0, 0)), 0);
        assert_eq!(doc.offset_at(Position::new(0, 2)), 2);
        assert_eq!(doc.offset_at(Position::new(1, 0)), 3);
        assert_eq!(doc.offset_at(Position::new(1, 2)), 5);

        assert_eq!(doc.position_at(0), Position::new(0, 0));
        assert_eq!(doc.position_at(3), Position::new(1, 0));
        assert_eq!(doc.position_at(5), Position::new(1, 2));
    }

    #[tokio::test]
    async fn conversions_clamp_out_of_bounds_input() {
        let registry = registry_with(&[("/t.txt", "ab\ncd")]).await;
        let doc = registry.open(&uri("/t.txt")).await.unwrap();

        // Character beyond the line clamps to the line end.
        assert_eq!(doc.offset_at(Position::new(0, 99)), 2);
        // Line beyond the document clamps to the text end.
        assert_eq!(doc.offset_at(Position::new(9, 0)), 5);
        // Offset beyond the text clamps to the last position.
        assert_eq!(doc.position_at(99), Position::new(1, 2));
    }

    #[tokio::test]
    async fn edit_splices_and_bumps_version() {
        let registry = registry_with(&[("/t.txt", "hello world")]).await;
        let doc = registry.open(&uri("/t.txt")).await.unwrap();
        assert_eq!(doc.version(), 1);

        let version = doc.edit(Range::of(0, 6, 0, 11), "kernel");

        assert_eq!(version, 2);
        assert_eq!(doc.text(), "hello kernel");
        assert!(doc.is_dirty());
    }

    #[tokio::test]
    async fn edit_handles_multibyte_text() {
        let registry = registry_with(&[("/t.txt", "héllo")]).await;
        let doc = registry.open(&uri("/t.txt")).await.unwrap();

        doc.edit(Range::of(0, 1, 0, 2), "e");

        assert_eq!(doc.text(), "hello");
    }

    #[tokio::test]
    async fn save_round_trips_through_the_store() {
        let registry = registry_with(&[("/t.txt", "one")]).await;
        let vfs = registry.vfs.clone();
        let doc = registry.open(&uri("/t.txt")).await.unwrap();

        doc.edit(Range::of(0, 0, 0, 3), "two");
        assert_eq!(vfs.read_file(&uri("/t.txt")).await.unwrap(), b"one");

        doc.save().await.unwrap();
        assert_eq!(vfs.read_file(&uri("/t.txt")).await.unwrap(), b"two");
    }

    #[tokio::test]
    async fn clear_drops_the_cache() {
        let registry = registry_with(&[("/a.txt", "x")]).await;
        let before = registry.open(&uri("/a.txt")).await.unwrap();

        registry.clear();
        assert_eq!(registry.open_count(), 0);

        let after = registry.open(&uri("/a.txt")).await.unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
    }
}
