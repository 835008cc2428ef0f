//! Comment store: position-addressed annotations with replies.
//!
//! Comments live outside the element list. A comment may point at an element
//! (`element_id`) or float on the canvas. The whole list persists as one JSON
//! blob under [`COMMENT_STORAGE_KEY`] in a host-provided [`KeyValueStorage`].

#[cfg(test)]
#[path = "comment_test.rs"]
mod comment_test;

use std::collections::HashMap;

use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use crate::doc::ElementId;
use crate::geom::Point;

/// Storage key of the persisted comment blob.
pub const COMMENT_STORAGE_KEY: &str = "comment-storage";

/// Palette new comments pick from when no color is given.
pub const COMMENT_COLORS: [&str; 8] = [
    "#ff6b6b", "#4ecdc4", "#45b7d1", "#96ceb4", "#feca57", "#ff9ff3", "#54a0ff", "#5f27cd",
];

/// Unique identifier for a comment or reply.
pub type CommentId = Uuid;

/// Errors from comment persistence.
#[derive(Debug, thiserror::Error)]
pub enum CommentError {
    #[error("comment blob is not valid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("comment storage failed: {0}")]
    Storage(String),
}

/// String blob storage supplied by the host.
pub trait KeyValueStorage {
    /// Read the value under `key`, `None` when absent.
    ///
    /// # Errors
    ///
    /// Returns [`CommentError::Storage`] when the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, CommentError>;

    /// Replace the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`CommentError::Storage`] when the backing store cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<(), CommentError>;
}

/// In-memory storage, for tests and hosts without persistence.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, CommentError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), CommentError> {
        self.values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// A comment or a reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub content: String,
    /// Stage-space anchor of the comment marker.
    pub position: Point,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_id: Option<ElementId>,
    pub author: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub is_visible: bool,
    pub color: String,
    #[serde(default)]
    pub is_resolved: bool,
    #[serde(default)]
    pub replies: Vec<Comment>,
    /// Set on replies only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CommentId>,
}

/// Caller-supplied fields of a new comment or reply.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub content: String,
    pub position: Point,
    #[serde(default)]
    pub element_id: Option<ElementId>,
    pub author: String,
    /// Picked from [`COMMENT_COLORS`] when absent.
    #[serde(default)]
    pub color: Option<String>,
}

/// Sparse comment update.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommentPatch {
    pub content: Option<String>,
    pub position: Option<Point>,
    pub color: Option<String>,
    pub is_visible: Option<bool>,
}

/// Where the next comment will be placed, while the host collects its content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingComment {
    pub position: Point,
    pub element_id: Option<ElementId>,
}

#[derive(Serialize, Deserialize)]
struct PersistedState {
    comments: Vec<Comment>,
}

#[derive(Serialize, Deserialize)]
struct PersistedBlob {
    state: PersistedState,
    #[serde(default)]
    version: u32,
}

/// All comments plus selection and creation state.
#[derive(Debug, Clone, Default)]
pub struct CommentStore {
    comments: Vec<Comment>,
    selected_id: Option<CommentId>,
    selected_ids: Vec<CommentId>,
    pending: Option<PendingComment>,
    panel_open: bool,
}

impl CommentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    #[must_use]
    pub fn comment(&self, id: &CommentId) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id == *id)
    }

    /// Comments attached to `element_id`.
    pub fn comments_for(&self, element_id: ElementId) -> impl Iterator<Item = &Comment> {
        self.comments.iter().filter(move |c| c.element_id == Some(element_id))
    }

    /// Add a top-level comment and end any pending creation. Returns its id.
    pub fn add_comment(&mut self, new: NewComment) -> CommentId {
        let comment = build_comment(new, None);
        let id = comment.id;
        self.comments.push(comment);
        self.pending = None;
        id
    }

    /// Apply `patch` to a top-level comment. Returns false if it does not exist.
    pub fn update_comment(&mut self, id: &CommentId, patch: &CommentPatch) -> bool {
        let Some(comment) = self.comments.iter_mut().find(|c| c.id == *id) else {
            return false;
        };
        if let Some(ref content) = patch.content {
            comment.content.clone_from(content);
        }
        if let Some(position) = patch.position {
            comment.position = position;
        }
        if let Some(ref color) = patch.color {
            comment.color.clone_from(color);
        }
        if let Some(visible) = patch.is_visible {
            comment.is_visible = visible;
        }
        comment.updated_at = OffsetDateTime::now_utc();
        true
    }

    /// Remove a top-level comment and its replies. Clears it from the selection.
    pub fn delete_comment(&mut self, id: &CommentId) -> bool {
        let before = self.comments.len();
        self.comments.retain(|c| c.id != *id);
        if self.selected_id == Some(*id) {
            self.selected_id = None;
        }
        self.selected_ids.retain(|s| s != id);
        self.comments.len() != before
    }

    /// Flip the resolved flag.
    pub fn resolve_comment(&mut self, id: &CommentId) -> bool {
        let Some(comment) = self.comments.iter_mut().find(|c| c.id == *id) else {
            return false;
        };
        comment.is_resolved = !comment.is_resolved;
        true
    }

    /// Append a reply to `parent_id`. Returns the reply id, or `None` if the parent is missing.
    pub fn add_reply(&mut self, parent_id: &CommentId, new: NewComment) -> Option<CommentId> {
        let parent = self.comments.iter_mut().find(|c| c.id == *parent_id)?;
        let reply = build_comment(new, Some(*parent_id));
        let id = reply.id;
        parent.replies.push(reply);
        parent.updated_at = OffsetDateTime::now_utc();
        Some(id)
    }

    /// Remove a reply from `parent_id`.
    pub fn delete_reply(&mut self, parent_id: &CommentId, reply_id: &CommentId) -> bool {
        let Some(parent) = self.comments.iter_mut().find(|c| c.id == *parent_id) else {
            return false;
        };
        let before = parent.replies.len();
        parent.replies.retain(|r| r.id != *reply_id);
        if parent.replies.len() == before {
            return false;
        }
        parent.updated_at = OffsetDateTime::now_utc();
        true
    }

    // --- Selection ---

    pub fn select_comment(&mut self, id: Option<CommentId>) {
        self.selected_id = id;
    }

    #[must_use]
    pub fn selected_comment(&self) -> Option<CommentId> {
        self.selected_id
    }

    pub fn select_comments(&mut self, ids: Vec<CommentId>) {
        self.selected_ids = ids;
    }

    pub fn toggle_comment_selection(&mut self, id: CommentId) {
        if let Some(idx) = self.selected_ids.iter().position(|s| *s == id) {
            self.selected_ids.remove(idx);
        } else {
            self.selected_ids.push(id);
        }
    }

    #[must_use]
    pub fn selected_comments(&self) -> &[CommentId] {
        &self.selected_ids
    }

    pub fn clear_comment_selection(&mut self) {
        self.selected_ids.clear();
        self.selected_id = None;
    }

    // --- Panel / creation ---

    pub fn toggle_panel(&mut self) {
        self.panel_open = !self.panel_open;
    }

    #[must_use]
    pub fn is_panel_open(&self) -> bool {
        self.panel_open
    }

    /// Start or cancel placing a comment.
    pub fn set_pending(&mut self, pending: Option<PendingComment>) {
        self.pending = pending;
    }

    #[must_use]
    pub fn pending(&self) -> Option<PendingComment> {
        self.pending
    }

    // --- Persistence ---

    /// Replace the comment list with the stored blob. A missing blob leaves the store empty.
    ///
    /// # Errors
    ///
    /// Returns an error when the storage read fails or the blob is malformed;
    /// the current comments are kept in that case.
    pub fn load<S: KeyValueStorage>(&mut self, storage: &S) -> Result<(), CommentError> {
        let Some(raw) = storage.get(COMMENT_STORAGE_KEY)? else {
            self.comments.clear();
            return Ok(());
        };
        let blob: PersistedBlob = serde_json::from_str(&raw)?;
        debug!(count = blob.state.comments.len(), "comments loaded");
        self.comments = blob.state.comments;
        self.selected_id = None;
        self.selected_ids.clear();
        Ok(())
    }

    /// Write the comment list to storage.
    ///
    /// # Errors
    ///
    /// Returns an error when serialization or the storage write fails.
    pub fn save<S: KeyValueStorage>(&self, storage: &mut S) -> Result<(), CommentError> {
        let blob = PersistedBlob {
            state: PersistedState { comments: self.comments.clone() },
            version: 0,
        };
        let raw = serde_json::to_string(&blob)?;
        storage.set(COMMENT_STORAGE_KEY, &raw)?;
        debug!(count = self.comments.len(), "comments saved");
        Ok(())
    }
}

fn build_comment(new: NewComment, parent_id: Option<CommentId>) -> Comment {
    let now = OffsetDateTime::now_utc();
    Comment {
        id: Uuid::new_v4(),
        content: new.content,
        position: new.position,
        element_id: new.element_id,
        author: new.author,
        created_at: now,
        updated_at: now,
        is_visible: true,
        color: new.color.unwrap_or_else(random_color),
        is_resolved: false,
        replies: Vec::new(),
        parent_id,
    }
}

fn random_color() -> String {
    let color = COMMENT_COLORS.choose(&mut rand::rng()).copied().unwrap_or(COMMENT_COLORS[0]);
    color.to_owned()
}
