//! Wiki plan types.
//!
//! The architect emits a flat page list linked by `parent_file`; the
//! hierarchy builder turns it into the nested structure persisted as
//! `structure.json`.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// One planned page; hierarchy comes from `parent_file`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatPage {
    pub title: String,
    /// Unique markdown filename, e.g. `02_01_API_Server.md`
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_file: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatWikiStructure {
    pub title: String,
    #[serde(default)]
    pub pages: Vec<FlatPage>,
}

impl FlatWikiStructure {
    /// JSON schema handed to the model for structured output
    pub fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "title": {
                    "type": "string",
                    "description": "The main title of the wiki, usually the repository name."
                },
                "pages": {
                    "type": "array",
                    "description": "A flat list of all pages to be included in the wiki.",
                    "items": {
                        "type": "object",
                        "properties": {
                            "title": {
                                "type": "string",
                                "description": "The clear and concise title of the page."
                            },
                            "file": {
                                "type": "string",
                                "description": "A unique, numbered markdown filename, e.g. '01_Introduction.md' or '03_01_User_Routes.md'."
                            },
                            "parent_file": {
                                "type": ["string", "null"],
                                "description": "Filename of the parent page. Null or omitted for top-level pages."
                            }
                        },
                        "required": ["title", "file"]
                    }
                }
            },
            "required": ["title", "pages"]
        })
    }
}

/// A page with its sub-pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub title: String,
    pub file: String,
    #[serde(default)]
    pub pages: Vec<Page>,
}

impl Page {
    pub fn leaf(title: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            file: file.into(),
            pages: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WikiStructure {
    pub title: String,
    pub pages: Vec<Page>,
}

impl WikiStructure {
    /// Pages in pre-order with their parent's title (the wiki title for
    /// top-level pages)
    pub fn walk(&self) -> Vec<(&Page, &str)> {
        let mut out = Vec::new();
        let mut stack: Vec<(&Page, &str)> = self
            .pages
            .iter()
            .rev()
            .map(|p| (p, self.title.as_str()))
            .collect();

        while let Some((page, parent)) = stack.pop() {
            out.push((page, parent));
            stack.extend(page.pages.iter().rev().map(|child| (child, page.title.as_str())));
        }
        out
    }

    pub fn page_count(&self) -> usize {
        self.walk().len()
    }

    pub fn find(&self, file: &str) -> Option<&Page> {
        self.walk().into_iter().map(|(p, _)| p).find(|p| p.file == file)
    }
}
