//! Algorithm variant catalogs
//!
//! A catalog maps variant names to their default parameters and remembers
//! which variant is currently selected. There is one catalog each for
//! embedding types, alignment types and the classifier models the s4
//! alignment can use.

mod defaults;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

pub use defaults::{default_alignments, default_classifiers, default_embeddings};

/// Parameter names to values for a single variant
pub type Params = BTreeMap<String, ParamValue>;

/// A default parameter value (accepts bool, integer, float or string)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(b) => write!(f, "{b}"),
            ParamValue::Int(i) => write!(f, "{i}"),
            ParamValue::Float(x) => write!(f, "{x}"),
            ParamValue::Text(s) => write!(f, "{s}"),
        }
    }
}

impl ParamValue {
    /// Parse a command-line value: bools and numbers first, text otherwise.
    /// Non-finite floats stay text since JSON has no representation for them.
    pub fn parse_loose(raw: &str) -> Self {
        if let Ok(b) = raw.parse::<bool>() {
            ParamValue::Bool(b)
        } else if let Ok(i) = raw.parse::<i64>() {
            ParamValue::Int(i)
        } else if let Ok(x) = raw.parse::<f64>()
            && x.is_finite()
        {
            ParamValue::Float(x)
        } else {
            ParamValue::Text(raw.to_string())
        }
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

/// Which catalog an operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CatalogKind {
    Embedding,
    Alignment,
    Classifier,
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CatalogKind::Embedding => "embedding",
            CatalogKind::Alignment => "alignment",
            CatalogKind::Classifier => "classifier",
        };
        f.write_str(name)
    }
}

/// Named variants plus the selected-variant pointer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub selected: String,
    #[serde(default)]
    pub variants: BTreeMap<String, Params>,
}

impl Catalog {
    pub fn new(selected: impl Into<String>, variants: BTreeMap<String, Params>) -> Self {
        Self {
            selected: selected.into(),
            variants,
        }
    }

    pub fn get(&self, variant: &str) -> Option<&Params> {
        self.variants.get(variant)
    }

    pub fn contains(&self, variant: &str) -> bool {
        self.variants.contains_key(variant)
    }

    pub fn variant_names(&self) -> impl Iterator<Item = &str> {
        self.variants.keys().map(String::as_str)
    }

    pub fn selected(&self) -> &str {
        &self.selected
    }

    /// Parameters of the selected variant; `None` if the pointer names no entry
    pub fn selected_params(&self) -> Option<&Params> {
        self.variants.get(&self.selected)
    }

    /// Point at `variant`. Unknown names are stored as given.
    pub fn select(&mut self, variant: impl Into<String>) {
        let variant = variant.into();
        if !self.contains(&variant) {
            warn!(variant = %variant, "Selecting variant that is not in the catalog");
        }
        debug!(from = %self.selected, to = %variant, "Selected variant changed");
        self.selected = variant;
    }

    /// Like [`select`](Self::select) but refuses unknown variants
    pub fn select_strict(&mut self, variant: &str) -> Result<()> {
        if !self.contains(variant) {
            let known: Vec<&str> = self.variant_names().collect();
            bail!("Unknown variant '{}' (available: {})", variant, known.join(", "));
        }
        self.select(variant);
        Ok(())
    }

    pub fn param(&self, variant: &str, key: &str) -> Option<&ParamValue> {
        self.variants.get(variant).and_then(|params| params.get(key))
    }

    /// Overwrite one parameter, returning the previous value.
    /// Unknown variants and keys are created.
    pub fn set_param(&mut self, variant: &str, key: &str, value: ParamValue) -> Option<ParamValue> {
        if !self.contains(variant) {
            warn!(variant = %variant, key = %key, "Setting parameter on variant that is not in the catalog");
        }
        let previous = self
            .variants
            .entry(variant.to_string())
            .or_default()
            .insert(key.to_string(), value);
        if previous.is_none() {
            debug!(variant = %variant, key = %key, "Added new parameter");
        }
        previous
    }

    /// Layer `overrides` on top of this catalog: parameters are replaced one
    /// by one, variants missing from `overrides` keep their defaults.
    pub fn merge(&mut self, overrides: CatalogOverride) {
        for (variant, params) in overrides.variants {
            self.variants.entry(variant).or_default().extend(params);
        }
        if let Some(selected) = overrides.selected {
            self.selected = selected;
        }
    }
}

/// Partial catalog as stored in the config file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variants: BTreeMap<String, Params>,
}

impl From<&Catalog> for CatalogOverride {
    fn from(catalog: &Catalog) -> Self {
        Self {
            selected: Some(catalog.selected.clone()),
            variants: catalog.variants.clone(),
        }
    }
}

/// All catalogs the application knows about
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalogs {
    #[serde(default = "default_embeddings")]
    pub embedding: Catalog,
    #[serde(default = "default_alignments")]
    pub alignment: Catalog,
    #[serde(default = "default_classifiers")]
    pub classifier: Catalog,
}

impl Default for Catalogs {
    fn default() -> Self {
        Self {
            embedding: default_embeddings(),
            alignment: default_alignments(),
            classifier: default_classifiers(),
        }
    }
}

impl Catalogs {
    pub fn get(&self, kind: CatalogKind) -> &Catalog {
        match kind {
            CatalogKind::Embedding => &self.embedding,
            CatalogKind::Alignment => &self.alignment,
            CatalogKind::Classifier => &self.classifier,
        }
    }

    pub fn get_mut(&mut self, kind: CatalogKind) -> &mut Catalog {
        match kind {
            CatalogKind::Embedding => &mut self.embedding,
            CatalogKind::Alignment => &mut self.alignment,
            CatalogKind::Classifier => &mut self.classifier,
        }
    }

    /// Selected variants that have no catalog entry
    pub fn dangling_selections(&self) -> Vec<(CatalogKind, &str)> {
        [CatalogKind::Embedding, CatalogKind::Alignment, CatalogKind::Classifier]
            .into_iter()
            .filter(|kind| self.get(*kind).selected_params().is_none())
            .map(|kind| (kind, self.get(kind).selected()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::variants::*;

    #[test]
    fn test_default_selections() {
        let catalogs = Catalogs::default();
        assert_eq!(catalogs.embedding.selected(), WORD2VEC);
        assert_eq!(catalogs.alignment.selected(), ALIGN_GLOBAL);
        assert_eq!(catalogs.classifier.selected(), CLS_NN);
        assert!(catalogs.dangling_selections().is_empty());
    }

    #[test]
    fn test_default_variant_names() {
        let catalogs = Catalogs::default();
        let alignments: Vec<&str> = catalogs.alignment.variant_names().collect();
        assert_eq!(alignments, vec![ALIGN_GLOBAL, ALIGN_NOISE_AWARE, ALIGN_S4]);

        let classifiers: Vec<&str> = catalogs.classifier.variant_names().collect();
        assert_eq!(classifiers, vec![CLS_NN, CLS_SVM_AUTO, CLS_SVM_FEATURES]);

        let embeddings: Vec<&str> = catalogs.embedding.variant_names().collect();
        assert_eq!(embeddings, vec![WORD2VEC]);
    }

    #[test]
    fn test_select_unknown_is_stored() {
        let mut catalog = default_alignments();
        catalog.select("procrustes");
        assert_eq!(catalog.selected(), "procrustes");
        assert!(catalog.selected_params().is_none());
    }

    #[test]
    fn test_select_strict_rejects_unknown() {
        let mut catalog = default_alignments();
        let err = catalog.select_strict("procrustes").unwrap_err();
        assert!(err.to_string().contains("procrustes"));
        assert_eq!(catalog.selected(), ALIGN_GLOBAL);

        catalog.select_strict(ALIGN_S4).unwrap();
        assert_eq!(catalog.selected(), ALIGN_S4);
    }

    #[test]
    fn test_set_param_returns_previous() {
        let mut catalog = default_alignments();
        let previous = catalog.set_param(ALIGN_S4, "iters", ParamValue::Int(250));
        assert_eq!(previous, Some(ParamValue::Int(100)));
        assert_eq!(catalog.param(ALIGN_S4, "iters"), Some(&ParamValue::Int(250)));
    }

    #[test]
    fn test_set_param_creates_unknown_entries() {
        let mut catalog = default_embeddings();
        assert_eq!(catalog.set_param("fasttext", "dim", 300i64.into()), None);
        assert_eq!(catalog.param("fasttext", "dim"), Some(&ParamValue::Int(300)));
    }

    #[test]
    fn test_merge_keeps_unlisted_defaults() {
        let mut catalog = default_alignments();
        let overrides = CatalogOverride {
            selected: Some(ALIGN_S4.to_string()),
            variants: BTreeMap::from([(
                ALIGN_S4.to_string(),
                Params::from([("t".to_string(), ParamValue::Float(0.7))]),
            )]),
        };

        catalog.merge(overrides);
        assert_eq!(catalog.selected(), ALIGN_S4);
        assert_eq!(catalog.param(ALIGN_S4, "t"), Some(&ParamValue::Float(0.7)));
        assert_eq!(catalog.param(ALIGN_S4, "iters"), Some(&ParamValue::Int(100)));
        assert_eq!(catalog.param(ALIGN_NOISE_AWARE, "is_soft"), Some(&ParamValue::Bool(true)));
    }

    #[test]
    fn test_merge_without_selection_keeps_pointer() {
        let mut catalog = default_embeddings();
        catalog.merge(CatalogOverride::default());
        assert_eq!(catalog, default_embeddings());
    }

    #[test]
    fn test_param_value_json_shapes() {
        let params: Params = serde_json::from_str(r#"{"a": true, "b": 0, "c": 0.5, "d": "nn"}"#).unwrap();
        assert_eq!(params["a"], ParamValue::Bool(true));
        assert_eq!(params["b"], ParamValue::Int(0));
        assert_eq!(params["c"], ParamValue::Float(0.5));
        assert_eq!(params["d"], ParamValue::Text("nn".to_string()));
    }

    #[test]
    fn test_parse_loose() {
        assert_eq!(ParamValue::parse_loose("false"), ParamValue::Bool(false));
        assert_eq!(ParamValue::parse_loose("12"), ParamValue::Int(12));
        assert_eq!(ParamValue::parse_loose("0.25"), ParamValue::Float(0.25));
        assert_eq!(ParamValue::parse_loose("svm_auto"), ParamValue::Text("svm_auto".to_string()));
    }

    #[test]
    fn test_parse_loose_keeps_non_finite_as_text() {
        for raw in ["nan", "NaN", "inf", "-inf", "infinity"] {
            assert_eq!(ParamValue::parse_loose(raw), ParamValue::Text(raw.to_string()));
        }
        assert_eq!(ParamValue::parse_loose("1e3"), ParamValue::Float(1000.0));
    }
}
