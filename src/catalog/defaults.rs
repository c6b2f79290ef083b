//! Built-in catalog contents

use std::collections::BTreeMap;

use super::{Catalog, ParamValue, Params};
use crate::constants::variants::*;

fn params<const N: usize>(entries: [(&str, ParamValue); N]) -> Params {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

/// Embedding types; only word2vec is offered
pub fn default_embeddings() -> Catalog {
    let variants = BTreeMap::from([(
        WORD2VEC.to_string(),
        params([
            ("size", ParamValue::Int(100)),
            ("window", ParamValue::Int(5)),
            ("minCount", ParamValue::Int(5)),
        ]),
    )]);
    Catalog::new(WORD2VEC, variants)
}

pub fn default_alignments() -> Catalog {
    let variants = BTreeMap::from([
        (ALIGN_GLOBAL.to_string(), Params::new()),
        (
            ALIGN_NOISE_AWARE.to_string(),
            params([("is_soft", ParamValue::Bool(true))]),
        ),
        (
            ALIGN_S4.to_string(),
            params([
                ("cls_model", ParamValue::from(CLS_NN)),
                ("iters", ParamValue::Int(100)),
                ("n_targets", ParamValue::Int(10)),
                ("n_negatives", ParamValue::Int(10)),
                ("fast", ParamValue::Bool(true)),
                ("rate", ParamValue::Int(0)),
                ("t", ParamValue::Float(0.5)),
                ("t_overlap", ParamValue::Float(0.5)),
            ]),
        ),
    ]);
    Catalog::new(ALIGN_GLOBAL, variants)
}

/// Classifier models have no tunable parameters of their own
pub fn default_classifiers() -> Catalog {
    let variants = [CLS_NN, CLS_SVM_AUTO, CLS_SVM_FEATURES]
        .into_iter()
        .map(|name| (name.to_string(), Params::new()))
        .collect();
    Catalog::new(CLS_NN, variants)
}
