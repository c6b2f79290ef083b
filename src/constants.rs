//! Application-wide constants
//!
//! Catalog keys, default selection limits and file locations live here so
//! that the state, config and session layers agree on the same literals.

/// Catalog variant names
pub mod variants {
    /// Only embedding type currently offered
    pub const WORD2VEC: &str = "word2vec";

    /// Plain orthogonal alignment over all common words
    pub const ALIGN_GLOBAL: &str = "global";

    /// Alignment that discards noisy anchor words
    pub const ALIGN_NOISE_AWARE: &str = "noise-aware";

    /// Self-supervised alignment driven by a landmark classifier
    pub const ALIGN_S4: &str = "s4";

    /// Classifier models usable by the s4 alignment
    pub const CLS_NN: &str = "nn";
    pub const CLS_SVM_AUTO: &str = "svm_auto";
    pub const CLS_SVM_FEATURES: &str = "svm_features";
}

/// Selection limits used by the bounded-push helpers
pub mod selection {
    /// Two plaintexts can be compared side by side
    pub const MAX_PLAINTEXTS: usize = 2;

    /// One embedding per comparison slot
    pub const MAX_EMBEDDINGS_PER_SLOT: usize = 1;

    /// One alignment is inspected at a time
    pub const MAX_ALIGNMENTS: usize = 1;
}

/// Backend request defaults
pub mod requests {
    /// Neighbor count the backend assumes when none is given
    pub const DEFAULT_NEIGHBORS: u32 = 10;

    /// Key under which the alignment variant name is sent inside `config`
    pub const ALIGNMENT_TYPE_KEY: &str = "type";
}

/// Configuration file paths
pub mod config {
    /// Application directory under the user's config dir
    pub const APP_DIR: &str = "embedding-explorer";

    /// Catalog override file name
    pub const FILENAME: &str = "catalogs.json";

    /// Environment variable that overrides the config file location
    pub const PATH_ENV: &str = "EMBEDDING_EXPLORER_CONFIG";

    /// Environment variable holding the log level
    pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";
}

/// Session protocol limits
pub mod session {
    /// Maximum request line size (1 MiB)
    pub const MAX_LINE_SIZE: usize = 1024 * 1024;
}
