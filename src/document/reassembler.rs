/*!
 * Structural reassembly of translated documents.
 *
 * The output is built by walking the source document once and copying every
 * container in place, so key order, array length and nesting are mirrored by
 * construction. Only translatable string leaves are looked up in the results.
 */

use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::errors::DocumentError;
use crate::translation::core::TranslationResult;

use super::indexer::PathIndexer;
use super::path::JsonPath;

/// Rebuilds documents from their source and a path-keyed result set
#[derive(Debug, Clone, Copy)]
pub struct Reassembler<'a> {
    indexer: &'a PathIndexer,
}

impl<'a> Reassembler<'a> {
    /// Use the same exclusion rules the document was indexed with
    pub fn new(indexer: &'a PathIndexer) -> Self {
        Self { indexer }
    }

    /// Substitute translated values into a copy of `document`.
    ///
    /// Fails with `DocumentError::MissingTranslation` on the first translatable
    /// leaf (in traversal order) without a result. Results for paths that are
    /// not translatable leaves are ignored.
    pub fn reassemble(
        &self,
        document: &Value,
        results: &HashMap<JsonPath, TranslationResult>,
    ) -> Result<Value, DocumentError> {
        self.rebuild(document, &JsonPath::root(), results)
    }

    fn rebuild(
        &self,
        value: &Value,
        path: &JsonPath,
        results: &HashMap<JsonPath, TranslationResult>,
    ) -> Result<Value, DocumentError> {
        self.indexer.check_depth(path)?;

        match value {
            Value::Object(map) => {
                let mut rebuilt = Map::with_capacity(map.len());
                for (key, child) in map {
                    let child = self.rebuild(child, &path.key(key), results)?;
                    rebuilt.insert(key.clone(), child);
                }
                Ok(Value::Object(rebuilt))
            }
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(index, child)| self.rebuild(child, &path.index(index), results))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Value::String(text) => {
                if self.indexer.rules().classify(path, text).is_some() {
                    return Ok(value.clone());
                }

                results
                    .get(path)
                    .map(|result| Value::String(result.translated_value.clone()))
                    .ok_or_else(|| DocumentError::MissingTranslation(path.clone()))
            }
            Value::Number(_) | Value::Bool(_) | Value::Null => Ok(value.clone()),
        }
    }
}
