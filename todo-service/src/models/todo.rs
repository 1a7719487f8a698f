use chrono::{DateTime, SubsecRound, Utc};
use mongodb::bson::{doc, oid::ObjectId, Document};
use serde::{Deserialize, Serialize};

/// A todo item as persisted in the `todo` collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TodoModel {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub completed: bool,
    #[serde(
        rename = "createdAt",
        with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime"
    )]
    pub created_at: DateTime<Utc>,
}

impl TodoModel {
    /// Builds a fresh item: new id, creation time now, never completed.
    ///
    /// `created_at` is truncated to milliseconds, the precision BSON keeps, so
    /// the value handed back to callers matches what a later read returns.
    pub fn new(title: String) -> Self {
        Self {
            id: ObjectId::new(),
            title,
            completed: false,
            created_at: Utc::now().trunc_subsecs(3),
        }
    }
}

/// Equality filter over todo fields. Unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TodoFilter {
    pub id: Option<ObjectId>,
    pub title: Option<String>,
    pub completed: Option<bool>,
}

impl TodoFilter {
    pub fn by_id(id: ObjectId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    pub fn to_document(&self) -> Document {
        let mut filter = Document::new();
        if let Some(id) = self.id {
            filter.insert("_id", id);
        }
        if let Some(title) = &self.title {
            filter.insert("title", title.as_str());
        }
        if let Some(completed) = self.completed {
            filter.insert("completed", completed);
        }
        filter
    }

    /// In-process evaluation; agrees with `to_document` on what matches.
    pub fn matches(&self, todo: &TodoModel) -> bool {
        self.id.map_or(true, |id| todo.id == id)
            && self.title.as_ref().map_or(true, |t| &todo.title == t)
            && self.completed.map_or(true, |c| todo.completed == c)
    }
}

/// The mutable part of a todo. `_id` and `createdAt` are never patched.
#[derive(Debug, Clone, PartialEq)]
pub struct TodoPatch {
    pub title: String,
    pub completed: bool,
}

impl TodoPatch {
    pub fn to_update_document(&self) -> Document {
        doc! {
            "$set": {
                "title": self.title.as_str(),
                "completed": self.completed,
            }
        }
    }

    pub fn apply(&self, todo: &mut TodoModel) {
        todo.title.clone_from(&self.title);
        todo.completed = self.completed;
    }
}
