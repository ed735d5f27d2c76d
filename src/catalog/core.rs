use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::adjacency::AdjacencyRule;
use crate::error::{LayoutError, Result};

pub type ModuleId = String;

/// Fixed set of module categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Prep,
    Cook,
    Clean,
    Store,
    Corner,
    Filler,
    Appliance,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Prep,
        Category::Cook,
        Category::Clean,
        Category::Store,
        Category::Corner,
        Category::Filler,
        Category::Appliance,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Prep => "prep",
            Category::Cook => "cook",
            Category::Clean => "clean",
            Category::Store => "store",
            Category::Corner => "corner",
            Category::Filler => "filler",
            Category::Appliance => "appliance",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Catalog entry describing one kind of cabinet or appliance unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleType {
    pub id: ModuleId,
    pub category: Category,
    pub min_width: f64,
    pub max_width: f64,
    /// Share of zone slack this module absorbs; zero for rigid modules.
    #[serde(default)]
    pub elasticity: f64,
    #[serde(default)]
    pub adjacency: Vec<AdjacencyRule>,
}

impl ModuleType {
    pub fn rigid(id: impl Into<ModuleId>, category: Category, width: f64) -> Self {
        Self {
            id: id.into(),
            category,
            min_width: width,
            max_width: width,
            elasticity: 0.0,
            adjacency: Vec::new(),
        }
    }

    pub fn elastic(
        id: impl Into<ModuleId>,
        category: Category,
        min_width: f64,
        max_width: f64,
        elasticity: f64,
    ) -> Self {
        Self {
            id: id.into(),
            category,
            min_width,
            max_width,
            elasticity,
            adjacency: Vec::new(),
        }
    }

    pub fn with_rule(mut self, rule: AdjacencyRule) -> Self {
        self.adjacency.push(rule);
        self
    }

    pub fn is_elastic(&self) -> bool {
        self.elasticity > 0.0
    }

    /// Width this module can still grow by beyond its minimum.
    pub fn stretch_capacity(&self) -> f64 {
        if self.is_elastic() {
            self.max_width - self.min_width
        } else {
            0.0
        }
    }

    fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| LayoutError::InvalidCatalog {
            module: self.id.clone(),
            reason: reason.to_string(),
        };
        if self.id.is_empty() {
            return Err(invalid("identifier is empty"));
        }
        if !(self.min_width.is_finite() && self.min_width > 0.0) {
            return Err(invalid("minimum width must be positive"));
        }
        if !self.max_width.is_finite() || self.max_width < self.min_width {
            return Err(invalid("maximum width is below minimum width"));
        }
        if !self.elasticity.is_finite() || self.elasticity < 0.0 {
            return Err(invalid("elasticity must be zero or positive"));
        }
        if !self.is_elastic() && self.max_width != self.min_width {
            return Err(invalid("rigid module must have equal minimum and maximum width"));
        }
        Ok(())
    }
}

/// Module types keyed by identifier, iterated in identifier order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "CatalogDocument")]
pub struct ModuleCatalog {
    modules: BTreeMap<ModuleId, ModuleType>,
}

/// Serialised shape of a catalog, checked before it becomes one.
#[derive(Deserialize)]
struct CatalogDocument {
    modules: BTreeMap<ModuleId, ModuleType>,
}

impl TryFrom<CatalogDocument> for ModuleCatalog {
    type Error = LayoutError;

    fn try_from(document: CatalogDocument) -> Result<Self> {
        if let Some((key, module)) = document.modules.iter().find(|(k, m)| **k != m.id) {
            return Err(LayoutError::InvalidCatalog {
                module: key.clone(),
                reason: format!("keyed entry carries identifier `{}`", module.id),
            });
        }
        ModuleCatalog::new(document.modules.into_values())
    }
}

impl ModuleCatalog {
    pub fn new(modules: impl IntoIterator<Item = ModuleType>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for module in modules {
            module.validate()?;
            if map.contains_key(&module.id) {
                return Err(LayoutError::InvalidCatalog {
                    module: module.id.clone(),
                    reason: "duplicate identifier".into(),
                });
            }
            map.insert(module.id.clone(), module);
        }
        Ok(Self { modules: map })
    }

    /// Re-checks every entry and its key.
    pub fn validate(&self) -> Result<()> {
        for (key, module) in &self.modules {
            if *key != module.id {
                return Err(LayoutError::InvalidCatalog {
                    module: key.clone(),
                    reason: format!("keyed entry carries identifier `{}`", module.id),
                });
            }
            module.validate()?;
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&ModuleType> {
        self.modules.get(id)
    }

    pub fn require(&self, id: &str) -> Result<&ModuleType> {
        self.get(id)
            .ok_or_else(|| LayoutError::UnknownModule(id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModuleType> {
        self.modules.values()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &ModuleType> {
        self.iter().filter(move |m| m.category == category)
    }

    /// Modules whose category is any of `categories`, in identifier order.
    pub fn permitted(&self, categories: &[Category]) -> Vec<&ModuleType> {
        self.iter()
            .filter(|m| categories.contains(&m.category))
            .collect()
    }

    /// Smallest minimum width available for a category.
    pub fn cheapest(&self, category: Category) -> Option<f64> {
        self.by_category(category)
            .map(|m| m.min_width)
            .min_by(f64::total_cmp)
    }

    pub fn has_category(&self, category: Category) -> bool {
        self.by_category(category).next().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ModuleCatalog {
        ModuleCatalog::new([
            ModuleType::rigid("sink-60", Category::Clean, 60.0),
            ModuleType::rigid("hob-60", Category::Cook, 60.0),
            ModuleType::rigid("hob-90", Category::Cook, 90.0),
            ModuleType::elastic("pantry", Category::Store, 40.0, 120.0, 1.0),
        ])
        .unwrap()
    }

    #[test]
    fn cheapest_reports_smallest_minimum() {
        let catalog = catalog();
        assert_eq!(catalog.cheapest(Category::Cook), Some(60.0));
        assert_eq!(catalog.cheapest(Category::Store), Some(40.0));
        assert_eq!(catalog.cheapest(Category::Prep), None);
    }

    #[test]
    fn permitted_is_sorted_by_identifier() {
        let catalog = catalog();
        let ids: Vec<_> = catalog
            .permitted(&[Category::Cook, Category::Store])
            .into_iter()
            .map(|m| m.id.as_str())
            .collect();
        assert_eq!(ids, vec!["hob-60", "hob-90", "pantry"]);
    }

    #[test]
    fn duplicate_identifiers_are_rejected() {
        let err = ModuleCatalog::new([
            ModuleType::rigid("a", Category::Prep, 60.0),
            ModuleType::rigid("a", Category::Cook, 60.0),
        ])
        .unwrap_err();
        assert!(matches!(err, LayoutError::InvalidCatalog { ref module, .. } if module == "a"));
    }

    #[test]
    fn rigid_module_with_range_is_rejected() {
        let mut module = ModuleType::rigid("bad", Category::Prep, 60.0);
        module.max_width = 80.0;
        assert!(ModuleCatalog::new([module]).is_err());
    }

    #[test]
    fn deserialising_validates_entries() {
        let json = r#"{"modules": {"a": {
            "id": "b", "category": "cook", "min_width": -5, "max_width": -10
        }}}"#;
        let err = serde_json::from_str::<ModuleCatalog>(json).unwrap_err();
        assert!(err.to_string().contains("invalid catalog entry `a`"));

        let json = r#"{"modules": {"a": {
            "id": "a", "category": "cook", "min_width": -5, "max_width": -10
        }}}"#;
        let err = serde_json::from_str::<ModuleCatalog>(json).unwrap_err();
        assert!(err.to_string().contains("minimum width must be positive"));
    }

    #[test]
    fn serialised_catalog_reads_back() {
        let catalog = catalog();
        let json = serde_json::to_string(&catalog).unwrap();
        let back: ModuleCatalog = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), catalog.len());
        assert!(back.validate().is_ok());
    }

    #[test]
    fn inverted_widths_are_rejected() {
        let module = ModuleType::elastic("bad", Category::Filler, 30.0, 10.0, 1.0);
        assert!(ModuleCatalog::new([module]).is_err());
    }

    #[test]
    fn require_reports_unknown_module() {
        let catalog = catalog();
        assert!(catalog.require("hob-60").is_ok());
        assert!(matches!(
            catalog.require("oven"),
            Err(LayoutError::UnknownModule(ref id)) if id == "oven"
        ));
    }
}
