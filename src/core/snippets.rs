//! # Snippet Store
//!
//! Saved code snippets, most recent first, with one optional selection and a
//! separate "creating" mode for the entry being drafted.
//!
//! The editor works on a [`SnippetDraft`]. Selecting a snippet copies it into
//! the draft; saving writes the draft back (or prepends it when creating).

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Storage key in the key-value store.
pub const STORE_KEY: &str = "snippets";

pub const NEW_SNIPPET_TITLE: &str = "New Snippet";
pub const NEW_SNIPPET_CODE: &str = "// Start coding here...";

/// Languages offered by the editor.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    JavaScript,
    Python,
    Html,
    Css,
    TypeScript,
    Shell,
}

impl Language {
    pub const ALL: [Language; 6] = [
        Language::JavaScript,
        Language::Python,
        Language::Html,
        Language::Css,
        Language::TypeScript,
        Language::Shell,
    ];

    /// Cycles to the next language (wraps around)
    pub fn next(self) -> Language {
        let idx = Self::ALL.iter().position(|l| *l == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Returns a human-readable label for display
    pub fn label(self) -> &'static str {
        match self {
            Language::JavaScript => "JavaScript",
            Language::Python => "Python",
            Language::Html => "HTML",
            Language::Css => "CSS",
            Language::TypeScript => "TypeScript",
            Language::Shell => "Shell",
        }
    }

    /// Lowercase tag, as stored and as used in code fences.
    pub fn tag(self) -> &'static str {
        match self {
            Language::JavaScript => "javascript",
            Language::Python => "python",
            Language::Html => "html",
            Language::Css => "css",
            Language::TypeScript => "typescript",
            Language::Shell => "shell",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    pub id: String,
    pub title: String,
    pub language: Language,
    pub code: String,
    pub created_at: DateTime<Utc>,
}

/// The editable fields of a snippet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnippetDraft {
    pub title: String,
    pub language: Language,
    pub code: String,
}

impl SnippetDraft {
    /// What "New" puts in the editor.
    pub fn seed() -> Self {
        Self {
            title: NEW_SNIPPET_TITLE.to_string(),
            language: Language::JavaScript,
            code: NEW_SNIPPET_CODE.to_string(),
        }
    }

    fn from_snippet(snippet: &Snippet) -> Self {
        Self {
            title: snippet.title.clone(),
            language: snippet.language,
            code: snippet.code.clone(),
        }
    }

    fn is_valid(&self) -> bool {
        !self.title.trim().is_empty() && !self.code.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SnippetBook {
    pub snippets: Vec<Snippet>,
    pub selected_id: Option<String>,
    pub creating: bool,
    pub draft: SnippetDraft,
    /// Bumped whenever `draft` is replaced from outside the editor.
    pub draft_revision: u64,
}

impl SnippetBook {
    pub fn new(snippets: Vec<Snippet>) -> Self {
        Self {
            snippets,
            ..Default::default()
        }
    }

    pub fn selected(&self) -> Option<&Snippet> {
        let id = self.selected_id.as_deref()?;
        self.snippets.iter().find(|s| s.id == id)
    }

    /// Whether the editor pane has something to edit.
    pub fn editor_open(&self) -> bool {
        self.creating || self.selected_id.is_some()
    }

    /// Clears the selection and starts drafting a new snippet.
    pub fn start_new(&mut self) {
        self.selected_id = None;
        self.creating = true;
        self.draft = SnippetDraft::seed();
        self.draft_revision += 1;
    }

    /// Selects a snippet by id and loads it into the draft. Unknown ids change nothing.
    pub fn select(&mut self, id: &str) -> bool {
        let Some(snippet) = self.snippets.iter().find(|s| s.id == id) else {
            return false;
        };
        self.draft = SnippetDraft::from_snippet(snippet);
        self.selected_id = Some(snippet.id.clone());
        self.creating = false;
        self.draft_revision += 1;
        true
    }

    /// Saves the draft. Returns true when the list changed.
    ///
    /// Creating mode prepends and selects the new entry; otherwise the selected
    /// entry is rewritten in place. A blank title or code rejects the save.
    pub fn save(&mut self, draft: SnippetDraft) -> bool {
        self.draft = draft;
        if !self.draft.is_valid() {
            debug!("Snippet save rejected: blank title or code");
            return false;
        }

        if self.creating {
            let snippet = Snippet {
                id: uuid::Uuid::new_v4().to_string(),
                title: self.draft.title.clone(),
                language: self.draft.language,
                code: self.draft.code.clone(),
                created_at: Utc::now(),
            };
            self.selected_id = Some(snippet.id.clone());
            self.snippets.insert(0, snippet);
            self.creating = false;
            return true;
        }

        let Some(id) = self.selected_id.as_deref() else {
            return false;
        };
        let Some(snippet) = self.snippets.iter_mut().find(|s| s.id == id) else {
            return false;
        };
        snippet.title.clone_from(&self.draft.title);
        snippet.language = self.draft.language;
        snippet.code.clone_from(&self.draft.code);
        true
    }

    /// Deletes the selected snippet. Returns true when the list changed.
    pub fn delete_selected(&mut self) -> bool {
        if self.creating {
            return false;
        }
        let Some(id) = self.selected_id.take() else {
            return false;
        };
        let before = self.snippets.len();
        self.snippets.retain(|s| s.id != id);
        self.draft = SnippetDraft::default();
        self.snippets.len() != before
    }

    /// Index of the selected snippet in display order.
    pub fn selected_index(&self) -> Option<usize> {
        let id = self.selected_id.as_deref()?;
        self.snippets.iter().position(|s| s.id == id)
    }
}
