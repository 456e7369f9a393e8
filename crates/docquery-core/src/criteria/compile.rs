//! Compilation of criteria chains into documents.
//!
//! A single node compiles by walking its operators in insertion order. A
//! pending bare `$not` wraps the next operator as `{$not: {op: value}}`; a
//! `$not` left dangling at the end wraps the whole operator document. The
//! node's key then holds either the operator document, or, when an
//! equality value is set, the equality value with the operators as
//! top-level siblings.
//!
//! A chain of several nodes compiles each node and merges the top-level keys;
//! a key produced twice is a [`CriteriaError::DuplicateKey`].

use docquery_model::{Document, Value};
use tracing::debug;

use super::Criteria;
use super::node::{CriteriaNode, Equality, Operator};
use crate::error::{CriteriaError, CriteriaResult};

impl CriteriaNode {
    /// Compile this node alone.
    #[must_use]
    pub fn compile(&self) -> Document {
        let mut document = Document::new();
        let mut negate = false;

        for (operator, value) in &self.operators {
            if negate {
                document.insert(
                    Operator::Not.as_str(),
                    Document::single(operator.as_str(), value.render()),
                );
                negate = false;
            } else if *operator == Operator::Not && value.is_negation() {
                negate = true;
            } else {
                document.insert(operator.as_str(), value.render());
            }
        }

        if negate {
            document = Document::single(Operator::Not.as_str(), document);
        }

        let Some(key) = self.key() else {
            return document;
        };

        match &self.equality {
            Equality::Value(value) => {
                let mut compiled = Document::single(key, value.clone());
                for (k, v) in document {
                    compiled.insert(k, v);
                }
                compiled
            }
            Equality::Unset => Document::single(key, document),
        }
    }
}

impl Criteria {
    /// Compile the whole chain into a criteria document.
    ///
    /// Compilation only reads the builder; calling it repeatedly yields equal
    /// documents.
    ///
    /// # Errors
    ///
    /// Returns [`CriteriaError::DuplicateKey`] if two chained nodes produce the
    /// same top-level key.
    pub fn compile(&self) -> CriteriaResult<Document> {
        if let [node] = self.chain.as_slice() {
            return Ok(node.compile());
        }

        let mut document = Document::new();
        for node in &self.chain {
            for (key, value) in node.compile() {
                merge_entry(&mut document, key, value)?;
            }
        }

        debug!(nodes = self.chain.len(), keys = document.len(), "compiled criteria chain");
        Ok(document)
    }
}

fn merge_entry(document: &mut Document, key: String, value: Value) -> CriteriaResult<()> {
    if let Some(existing) = document.get(&key) {
        return Err(CriteriaError::DuplicateKey {
            existing: existing.to_string(),
            value: value.to_string(),
            key,
        });
    }
    document.insert(key, value);
    Ok(())
}
