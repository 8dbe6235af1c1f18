use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// One administrative region the directory can be filtered by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// Sort-index prefix shown in the dropdown, e.g. `1` in `"1. ນະຄອນຫຼວງວຽງຈັນ"`.
    pub index: u32,
    /// Display name attached to scraped records.
    pub name: String,
}

impl Region {
    /// Text typed into the region combobox.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}. {}", self.index, self.name)
    }

    /// Parse a dropdown label of the form `"<index>. <name>"`.
    ///
    /// Returns `None` when the prefix is not a number or the name is empty.
    #[must_use]
    pub fn parse_label(label: &str) -> Option<Self> {
        let (index, name) = label.trim().split_once('.')?;
        let index = index.trim().parse::<u32>().ok()?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some(Self {
            index,
            name: name.to_string(),
        })
    }
}

/// Ordered, fixed list of regions walked by a region-mode run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionCatalog {
    pub regions: Vec<Region>,
}

impl RegionCatalog {
    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Region> {
        self.regions.iter()
    }

    /// Find a region by its full label (`"3. ແຂວງ ຈຳປາສັກ"`) or its display name.
    #[must_use]
    pub fn find(&self, label_or_name: &str) -> Option<&Region> {
        let wanted = label_or_name.trim();
        let parsed = Region::parse_label(wanted);
        self.regions.iter().find(|region| {
            region.name == wanted || parsed.as_ref() == Some(*region)
        })
    }

    /// Narrow the catalog to the requested regions, keeping catalog order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if any requested region is not in the catalog.
    pub fn restrict_to(&self, wanted: &[String]) -> Result<Self, ConfigError> {
        let mut keep = HashSet::new();
        for label in wanted {
            let region = self.find(label).ok_or_else(|| {
                ConfigError::Validation(format!("region '{label}' is not in the catalog"))
            })?;
            keep.insert(region.index);
        }
        Ok(Self {
            regions: self
                .regions
                .iter()
                .filter(|r| keep.contains(&r.index))
                .cloned()
                .collect(),
        })
    }
}

impl<'a> IntoIterator for &'a RegionCatalog {
    type Item = &'a Region;
    type IntoIter = std::slice::Iter<'a, Region>;

    fn into_iter(self) -> Self::IntoIter {
        self.regions.iter()
    }
}

/// Load and validate the region catalog from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_regions(path: &Path) -> Result<RegionCatalog, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::RegionsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_regions(&content)
}

fn parse_regions(content: &str) -> Result<RegionCatalog, ConfigError> {
    let catalog: RegionCatalog = serde_yaml::from_str(content)?;
    validate_regions(&catalog)?;
    Ok(catalog)
}

fn validate_regions(catalog: &RegionCatalog) -> Result<(), ConfigError> {
    if catalog.regions.is_empty() {
        return Err(ConfigError::Validation(
            "region catalog must contain at least one region".to_string(),
        ));
    }

    let mut seen_indices = HashSet::new();
    let mut seen_names = HashSet::new();

    for region in &catalog.regions {
        if region.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "region {} has an empty name",
                region.index
            )));
        }

        if !seen_indices.insert(region.index) {
            return Err(ConfigError::Validation(format!(
                "duplicate region index: {}",
                region.index
            )));
        }

        if !seen_names.insert(region.name.trim()) {
            return Err(ConfigError::Validation(format!(
                "duplicate region name: '{}'",
                region.name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "regions_test.rs"]
mod tests;
