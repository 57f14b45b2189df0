//! Extraction of configuration attributes from collected files.

use std::sync::Arc;

use tracing::debug;

use crate::config_parser::parse_config;
use crate::error::InventoryResult;
use crate::store::InventoryStore;
use crate::types::{AttributeSource, ConfigAttribute, FilesystemEntry};

/// Composite key disambiguating attributes across sections and files.
#[must_use]
pub fn unique_name(path: &str, section: Option<&str>, name: Option<&str>) -> String {
    format!(
        "{path}:{}:{}",
        section.unwrap_or_default(),
        name.unwrap_or_default()
    )
}

/// Parse one file into attributes. Non-configuration entries yield nothing.
#[must_use]
pub fn attributes_for(entry: &FilesystemEntry) -> Vec<ConfigAttribute> {
    if !entry.is_parseable_config() {
        return Vec::new();
    }
    let contents = entry.contents.as_deref().unwrap_or_default();

    parse_config(contents)
        .into_iter()
        .map(|e| ConfigAttribute {
            unique_name: unique_name(&entry.path, e.section.as_deref(), Some(&e.name)),
            section: e.section,
            name: e.name,
            value: e.value,
            description: e.description,
            source: AttributeSource::Scan,
        })
        .collect()
}

/// Turns configuration files into attribute records on their entries.
pub struct ConfigAttributeExtractor {
    store: Arc<dyn InventoryStore>,
}

impl ConfigAttributeExtractor {
    /// Create an extractor writing through `store`.
    #[must_use]
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    /// Parse every configuration file in `entries` and replace its
    /// attributes. Returns the number of files written.
    pub async fn extract(&self, entries: &[FilesystemEntry]) -> InventoryResult<usize> {
        let mut written = 0;
        for entry in entries.iter().filter(|e| e.is_parseable_config()) {
            let attributes = attributes_for(entry);
            debug!(path = %entry.path, count = attributes.len(), "parsed configuration file");
            self.store
                .save_custom_attributes(entry, attributes, AttributeSource::Scan)
                .await?;
            written += 1;
        }
        Ok(written)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use overcloud_core::NodeId;

    use super::*;
    use crate::store::MemoryInventoryStore;

    fn entry(path: &str, contents: &str) -> FilesystemEntry {
        FilesystemEntry::new(NodeId::new("n1"), path).with_contents(contents)
    }

    #[test]
    fn unique_name_joins_parts() {
        assert_eq!(
            unique_name("/etc/nova/nova.conf", Some("DEFAULT"), Some("debug")),
            "/etc/nova/nova.conf:DEFAULT:debug"
        );
        assert_eq!(unique_name("/etc/x.conf", None, Some("k")), "/etc/x.conf::k");
        assert_eq!(unique_name("/etc/x.conf", None, None), "/etc/x.conf::");
    }

    #[test]
    fn same_key_in_two_sections_stays_distinct() {
        let attributes = attributes_for(&entry(
            "/etc/nova/nova.conf",
            "[DEFAULT]\ndebug = true\n[api]\ndebug = false\n",
        ));

        let names: Vec<_> = attributes.iter().map(|a| a.unique_name.as_str()).collect();
        assert_eq!(
            names,
            vec!["/etc/nova/nova.conf:DEFAULT:debug", "/etc/nova/nova.conf:api:debug"]
        );
        assert!(attributes.iter().all(|a| a.source == AttributeSource::Scan));
    }

    #[test]
    fn non_config_entries_yield_nothing() {
        assert!(attributes_for(&entry("/etc/nova/policy.json", "a = 1")).is_empty());
        assert!(attributes_for(&entry("/etc/nova/nova.conf", "")).is_empty());
    }

    #[tokio::test]
    async fn extract_writes_only_config_files() {
        let store = Arc::new(MemoryInventoryStore::new());
        let extractor = ConfigAttributeExtractor::new(store.clone());
        let conf = entry("/etc/nova/nova.conf", "[DEFAULT]\ndebug = true\n");
        let other = entry("/etc/nova/policy.json", "{}");

        let written = extractor.extract(&[conf.clone(), other.clone()]).await.unwrap();

        assert_eq!(written, 1);
        assert_eq!(store.attributes(&conf.id).unwrap().len(), 1);
        assert!(store.attributes(&other.id).unwrap().is_empty());
    }

    #[tokio::test]
    async fn extract_regenerates_attributes() {
        let store = Arc::new(MemoryInventoryStore::new());
        let extractor = ConfigAttributeExtractor::new(store.clone());
        let mut conf = entry("/etc/nova/nova.conf", "a = 1\nb = 2\n");

        extractor.extract(std::slice::from_ref(&conf)).await.unwrap();
        conf.contents = Some("a = 3\n".to_owned());
        extractor.extract(std::slice::from_ref(&conf)).await.unwrap();

        let attributes = store.attributes(&conf.id).unwrap();
        assert_eq!(attributes.len(), 1);
        assert_eq!(attributes[0].value, "3");
    }
}
