//! Editor registry — active/visible editor tracking over open documents.

use crate::documents::{DocumentRegistry, TextDocument};
use crate::events::{Disposable, EventEmitter};
use hostsim_types::{FsResult, Position, Selection, Uri};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// An editor view over a document: a selection and a visibility flag.
pub struct TextEditor {
    document: Arc<TextDocument>,
    selection: RwLock<Selection>,
    visible: AtomicBool,
    did_change_selection: EventEmitter<Selection>,
}

impl TextEditor {
    fn new(document: Arc<TextDocument>) -> Self {
        Self {
            document,
            selection: RwLock::new(Selection::cursor(Position::default())),
            visible: AtomicBool::new(true),
            did_change_selection: EventEmitter::new(),
        }
    }

    /// The document shown in this editor.
    pub fn document(&self) -> &Arc<TextDocument> {
        &self.document
    }

    /// The current selection.
    pub fn selection(&self) -> Selection {
        *self
            .selection
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// The cursor — the selection's active end.
    pub fn cursor(&self) -> Position {
        self.selection().active
    }

    /// Replace the selection and notify subscribers.
    pub fn set_selection(&self, selection: Selection) {
        {
            let mut slot = self
                .selection
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            *slot = selection;
        }
        self.did_change_selection.fire(&selection);
    }

    /// True while the editor is in the visible set.
    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::SeqCst);
    }

    /// Subscribe to selection changes.
    pub fn on_did_change_selection(
        &self,
        listener: impl Fn(&Selection) + Send + Sync + 'static,
    ) -> Disposable {
        self.did_change_selection.subscribe(listener)
    }
}

impl std::fmt::Debug for TextEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextEditor")
            .field("uri", &self.document.uri().as_str())
            .field("selection", &self.selection())
            .field("visible", &self.is_visible())
            .finish()
    }
}

/// What to show: a URI to resolve, or an already-open document.
pub enum ShowTarget {
    Uri(Uri),
    Document(Arc<TextDocument>),
}

impl From<Uri> for ShowTarget {
    fn from(uri: Uri) -> Self {
        ShowTarget::Uri(uri)
    }
}

impl From<&Uri> for ShowTarget {
    fn from(uri: &Uri) -> Self {
        ShowTarget::Uri(uri.clone())
    }
}

impl From<Arc<TextDocument>> for ShowTarget {
    fn from(document: Arc<TextDocument>) -> Self {
        ShowTarget::Document(document)
    }
}

/// Tracks every editor, the visible subset, and the single active editor.
pub struct EditorRegistry {
    documents: Arc<DocumentRegistry>,
    editors: RwLock<Vec<Arc<TextEditor>>>,
    visible: RwLock<Vec<Arc<TextEditor>>>,
    active: RwLock<Option<Arc<TextEditor>>>,
    did_change_active: EventEmitter<Option<Arc<TextEditor>>>,
}

impl EditorRegistry {
    /// Create a registry resolving documents through `documents`.
    pub fn new(documents: Arc<DocumentRegistry>) -> Self {
        Self {
            documents,
            editors: RwLock::new(Vec::new()),
            visible: RwLock::new(Vec::new()),
            active: RwLock::new(None),
            did_change_active: EventEmitter::new(),
        }
    }

    /// Show a document, reusing an existing editor for it if one exists.
    ///
    /// The resulting editor becomes active and joins the visible set.
    pub async fn show(&self, target: impl Into<ShowTarget>) -> FsResult<Arc<TextEditor>> {
        let document = match target.into() {
            ShowTarget::Uri(uri) => self.documents.open(&uri).await?,
            ShowTarget::Document(document) => document,
        };

        let editor = self.editor_for(&document).unwrap_or_else(|| {
            let editor = Arc::new(TextEditor::new(document));
            self.editors
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .push(editor.clone());
            editor
        });

        editor.set_visible(true);
        {
            let mut visible = self.visible.write().unwrap_or_else(PoisonError::into_inner);
            if !visible.iter().any(|e| Arc::ptr_eq(e, &editor)) {
                visible.push(editor.clone());
            }
        }
        self.set_active(Some(editor.clone()));
        Ok(editor)
    }

    /// The editor already showing `document`, if any.
    pub fn editor_for(&self, document: &Arc<TextDocument>) -> Option<Arc<TextEditor>> {
        self.editors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|e| Arc::ptr_eq(e.document(), document))
            .cloned()
    }

    /// The active editor, if any.
    pub fn active(&self) -> Option<Arc<TextEditor>> {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Snapshot of the visible editors.
    pub fn visible(&self) -> Vec<Arc<TextEditor>> {
        self.visible
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Snapshot of every tracked editor.
    pub fn editors(&self) -> Vec<Arc<TextEditor>> {
        self.editors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Set (or clear) the active editor, notifying subscribers on change.
    pub fn set_active(&self, editor: Option<Arc<TextEditor>>) {
        let changed = {
            let mut active = self.active.write().unwrap_or_else(PoisonError::into_inner);
            let same = match (&*active, &editor) {
                (Some(current), Some(next)) => Arc::ptr_eq(current, next),
                (None, None) => true,
                _ => false,
            };
            if !same {
                *active = editor.clone();
            }
            !same
        };
        if changed {
            self.did_change_active.fire(&editor);
        }
    }

    /// Register an editor directly (test-harness control).
    pub fn add(&self, editor: Arc<TextEditor>) {
        {
            let mut editors = self.editors.write().unwrap_or_else(PoisonError::into_inner);
            if !editors.iter().any(|e| Arc::ptr_eq(e, &editor)) {
                editors.push(editor.clone());
            }
        }
        let mut visible = self.visible.write().unwrap_or_else(PoisonError::into_inner);
        if !visible.iter().any(|e| Arc::ptr_eq(e, &editor)) {
            editor.set_visible(true);
            visible.push(editor);
        }
    }

    /// Remove an editor, re-deriving the active editor if it was removed:
    /// the first remaining editor, or none.
    pub fn remove(&self, editor: &Arc<TextEditor>) {
        {
            let mut editors = self.editors.write().unwrap_or_else(PoisonError::into_inner);
            editors.retain(|e| !Arc::ptr_eq(e, editor));
        }
        {
            let mut visible = self.visible.write().unwrap_or_else(PoisonError::into_inner);
            visible.retain(|e| !Arc::ptr_eq(e, editor));
        }
        editor.set_visible(false);

        let was_active = self
            .active()
            .map(|active| Arc::ptr_eq(&active, editor))
            .unwrap_or(false);
        if was_active {
            let fallback = self
                .editors
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .first()
                .cloned();
            self.set_active(fallback);
        }
    }

    /// Subscribe to active-editor transitions.
    pub fn on_did_change_active(
        &self,
        listener: impl Fn(&Option<Arc<TextEditor>>) + Send + Sync + 'static,
    ) -> Disposable {
        self.did_change_active.subscribe(listener)
    }

    /// Reset the registry to its initial state: no editors, nothing active.
    ///
    /// Silent — no change events fire for the reset itself.
    pub fn clear(&self) {
        self.editors
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.visible
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        *self.active.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl std::fmt::Debug for EditorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorRegistry")
            .field("editors", &self.editors().len())
            .field("visible", &self.visible().len())
            .field("active", &self.active().is_some())
            .finish()
    }
}
