//! Knowledge base for retrieval
//!
//! A small, fixed set of labeled energy documents. The set is decided at
//! process start (built-in corpus or a TOML file named in configuration)
//! and never changes afterwards.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::errors::{AssistantError, Result};

/// A labeled reference document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub content: String,
}

impl Document {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
        }
    }
}

/// On-disk layout of a knowledge base file
#[derive(Debug, Deserialize)]
struct KnowledgeFile {
    documents: Vec<Document>,
}

/// Read-only, ordered document collection
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    documents: Vec<Document>,
}

impl KnowledgeBase {
    /// Build a knowledge base from documents, in the given order
    ///
    /// Rejects an empty set, blank ids and duplicate ids.
    pub fn new(documents: Vec<Document>) -> Result<Self> {
        if documents.is_empty() {
            return Err(AssistantError::KnowledgeBase(
                "knowledge base must contain at least one document".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for doc in &documents {
            if doc.id.trim().is_empty() {
                return Err(AssistantError::KnowledgeBase(
                    "document id must not be blank".to_string(),
                ));
            }
            if !seen.insert(doc.id.as_str()) {
                return Err(AssistantError::KnowledgeBase(format!(
                    "duplicate document id: {}",
                    doc.id
                )));
            }
        }

        Ok(Self { documents })
    }

    /// Built-in energy monitor corpus
    pub fn builtin() -> Self {
        Self {
            documents: vec![
                Document::new(
                    "dev_logs",
                    "HVAC usage peaked at 45% of total load yesterday. Peak hours were 2 PM - 5 PM.",
                ),
                Document::new(
                    "tariff",
                    "Current energy tariff is $0.25/kWh during peak hours (2 PM - 6 PM) and $0.10/kWh off-peak.",
                ),
                Document::new(
                    "anomalies",
                    "Detected ghost power draw of 150W continuously from the entertainment center (TV/Consoles) when idle.",
                ),
                Document::new(
                    "general_tips",
                    "Reducing thermostat by 1 degree Celsius can save up to 5% on heating costs.",
                ),
                Document::new(
                    "bill_est",
                    "Current projected monthly bill is $145.20. Last month was $152.50.",
                ),
                Document::new(
                    "device_eff",
                    "The refrigerator compressor is cycling ON every 15 minutes, which indicates a potential seal leak.",
                ),
            ],
        }
    }

    /// Parse a knowledge base from TOML (`[[documents]]` tables)
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let file: KnowledgeFile = toml::from_str(source)
            .map_err(|e| AssistantError::KnowledgeBase(format!("invalid knowledge file: {}", e)))?;
        Self::new(file.documents)
    }

    /// Load a knowledge base file from disk
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let kb = Self::from_toml_str(&contents)?;
        tracing::info!(path = %path.display(), documents = kb.len(), "Loaded knowledge base");
        Ok(kb)
    }

    /// All documents in enumeration order
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn get(&self, id: &str) -> Option<&Document> {
        self.documents.iter().find(|doc| doc.id == id)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_order() {
        let kb = KnowledgeBase::builtin();
        let ids: Vec<&str> = kb.documents().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["dev_logs", "tariff", "anomalies", "general_tips", "bill_est", "device_eff"]
        );
    }

    #[test]
    fn test_get_by_id() {
        let kb = KnowledgeBase::builtin();
        let tariff = kb.get("tariff").unwrap();
        assert!(tariff.content.contains("$0.25/kWh"));
        assert!(kb.get("missing").is_none());
    }

    #[test]
    fn test_rejects_empty_set() {
        let result = KnowledgeBase::new(vec![]);
        assert!(matches!(result, Err(AssistantError::KnowledgeBase(_))));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let result = KnowledgeBase::new(vec![
            Document::new("a", "first"),
            Document::new("a", "second"),
        ]);
        assert!(result.unwrap_err().to_string().contains("duplicate"));
    }

    #[test]
    fn test_rejects_blank_id() {
        let result = KnowledgeBase::new(vec![Document::new("  ", "content")]);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_toml_str() {
        let source = r#"
            [[documents]]
            id = "solar"
            content = "Rooftop solar produced 12 kWh today."

            [[documents]]
            id = "battery"
            content = "Home battery is at 80% charge."
        "#;
        let kb = KnowledgeBase::from_toml_str(source).unwrap();
        assert_eq!(kb.len(), 2);
        assert_eq!(kb.documents()[0].id, "solar");
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[[documents]]\nid = \"meter\"\ncontent = \"Smart meter online.\"").unwrap();

        let kb = KnowledgeBase::from_file(file.path()).unwrap();
        assert_eq!(kb.len(), 1);
        assert_eq!(kb.get("meter").unwrap().content, "Smart meter online.");
    }

    #[test]
    fn test_from_toml_str_invalid() {
        let result = KnowledgeBase::from_toml_str("documents = 3");
        assert!(matches!(result, Err(AssistantError::KnowledgeBase(_))));
    }
}
