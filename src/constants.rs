//! Global Constants
//!
//! Centralized constants for configuration defaults and tuning.

/// Text splitting for the indexer
pub mod indexing {
    /// Maximum characters per chunk
    pub const CHUNK_SIZE: usize = 2000;

    /// Characters shared between consecutive chunks
    pub const CHUNK_OVERLAP: usize = 200;

    /// Separators tried in order, coarsest first
    pub const SEPARATORS: &[&str] = &["\n\n", "\n", " ", ""];

    /// Texts sent per embedding request
    pub const EMBEDDING_BATCH_SIZE: usize = 64;
}

/// Retrieval fan-out per collection
pub mod retrieval {
    /// Chunks pulled from a repository's code collection
    pub const CODE_K: usize = 5;

    /// Chunks pulled from a repository's wiki collection
    pub const WIKI_K: usize = 3;

    /// Chunks pulled from a legacy single-collection layout
    pub const SINGLE_K: usize = 8;

    /// Chunks pulled from every collection in a cross-repository search
    pub const GLOBAL_K: usize = 2;
}

/// On-disk layout
pub mod layout {
    /// Sub-directory of a repository's vector root holding source chunks
    pub const CODE_COLLECTION: &str = "code";

    /// Sub-directory of a repository's vector root holding wiki chunks
    pub const WIKI_COLLECTION: &str = "wiki";

    /// SQLite file inside every collection directory
    pub const COLLECTION_FILE: &str = "collection.db";

    /// Wiki manifest file name
    pub const STRUCTURE_FILE: &str = "structure.json";

    /// Default clone directory
    pub const CLONE_ROOT: &str = "cloned_repos";

    /// Default vector store directory
    pub const VECTOR_ROOT: &str = "vector_stores";

    /// Default wiki output directory
    pub const WIKI_ROOT: &str = "wikis";

    /// Default file filter document
    pub const FILTERS_FILE: &str = "configs/file_filters.json";
}

/// Repository tree rendering for the wiki architect
pub mod tree {
    /// Directories never shown in the file tree
    pub const SKIP_DIRS: &[&str] = &[
        "node_modules",
        "__pycache__",
        "target",
        "dist",
        "build",
        "vendor",
        "venv",
    ];

    /// Spaces per nesting level
    pub const INDENT: usize = 4;
}

/// Mermaid diagram handling
pub mod diagram {
    /// Paired delimiter around raw diagram source inside a page
    pub const MARKER: &str = "%%MERMAID_DIAGRAM%%";

    /// Model reply meaning "no diagram for this topic"
    pub const IGNORE_SENTINEL: &str = "IGNORE";

    /// Token every accepted diagram must contain
    pub const REQUIRED_TOKEN: &str = "graph";

    /// Content keywords that make a page worth a diagram
    pub const TRIGGER_KEYWORDS: &[&str] = &[
        "flow",
        "architecture",
        "structure",
        "diagram",
        "interaction",
        "sequence",
    ];

    /// Edge tokens, at least one of which an accepted diagram contains
    pub const ARROW_TOKENS: &[&str] = &["-->", "---", "==>", "-.->"];

    /// Diagram used by the single-document agent when generation fails
    pub const FALLBACK: &str =
        "graph TD\n    A[\"Error: Could not generate architecture diagram.\"]";
}

/// Staged pipeline limits
pub mod pipeline {
    /// Maximum stage transitions in one pipeline run
    pub const MAX_STEPS: usize = 10;
}

/// HTTP/Network constants
pub mod network {
    /// Default request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 300;
}
