use crate::content::{CategoryDesc, GlobalSettings, VariableDesc};
use crate::error::{Result, SonicueError};
use std::collections::HashMap;

/// Category tree and variable table with their name indexes.
pub(crate) struct EngineTables {
    categories: Vec<CategoryDesc>,
    variables: Vec<VariableDesc>,
    category_lookup: HashMap<String, u16>,
    global_lookup: HashMap<String, u16>,
    instance_lookup: HashMap<String, u16>,
}

impl EngineTables {
    pub fn build(settings: GlobalSettings) -> Result<Self> {
        let GlobalSettings {
            categories,
            variables,
        } = settings;

        if categories.len() >= usize::from(u16::MAX) || variables.len() >= usize::from(u16::MAX) {
            return Err(SonicueError::invalid("global settings table is too large"));
        }

        let mut category_lookup = HashMap::new();
        for (index, category) in categories.iter().enumerate() {
            if let Some(parent) = category.parent {
                if usize::from(parent) >= categories.len() || usize::from(parent) == index {
                    return Err(SonicueError::invalid(format!(
                        "category '{}' has invalid parent {parent}",
                        category.name
                    )));
                }
            }
            // First occurrence wins on duplicate names.
            category_lookup
                .entry(category.name.clone())
                .or_insert(index as u16);
        }

        let mut global_lookup = HashMap::new();
        let mut instance_lookup = HashMap::new();
        for (index, variable) in variables.iter().enumerate() {
            if variable.min_value > variable.max_value {
                return Err(SonicueError::invalid(format!(
                    "variable '{}' has min above max",
                    variable.name
                )));
            }
            let lookup = if variable.access.cue_instance {
                &mut instance_lookup
            } else {
                &mut global_lookup
            };
            lookup.entry(variable.name.clone()).or_insert(index as u16);
        }

        let tables = Self {
            categories,
            variables,
            category_lookup,
            global_lookup,
            instance_lookup,
        };
        for index in 0..tables.categories.len() {
            if tables.depth(index as u16).is_none() {
                return Err(SonicueError::invalid("category parents form a cycle"));
            }
        }
        Ok(tables)
    }

    pub fn categories(&self) -> &[CategoryDesc] {
        &self.categories
    }

    pub fn variables(&self) -> &[VariableDesc] {
        &self.variables
    }

    pub fn variable(&self, index: u16) -> Option<&VariableDesc> {
        self.variables.get(usize::from(index))
    }

    pub fn category(&self, name: &str) -> Option<u16> {
        self.category_lookup.get(name).copied()
    }

    pub fn global_variable(&self, name: &str) -> Option<u16> {
        self.global_lookup.get(name).copied()
    }

    pub fn instance_variable(&self, name: &str) -> Option<u16> {
        self.instance_lookup.get(name).copied()
    }

    pub fn children(&self, parent: u16) -> Vec<u16> {
        self.categories
            .iter()
            .enumerate()
            .filter(|(_, category)| category.parent == Some(parent))
            .map(|(index, _)| index as u16)
            .collect()
    }

    /// True if `category` is `ancestor` or sits below it.
    pub fn is_in_category(&self, category: u16, ancestor: u16) -> bool {
        let mut current = Some(category);
        for _ in 0..=self.categories.len() {
            match current {
                Some(index) if index == ancestor => return true,
                Some(index) => {
                    current = self
                        .categories
                        .get(usize::from(index))
                        .and_then(|c| c.parent);
                }
                None => return false,
            }
        }
        false
    }

    /// Number of ancestors, or None if the parent chain loops.
    fn depth(&self, category: u16) -> Option<usize> {
        let mut current = self.categories[usize::from(category)].parent;
        let mut depth = 0;
        while let Some(parent) = current {
            depth += 1;
            if depth > self.categories.len() {
                return None;
            }
            current = self.categories[usize::from(parent)].parent;
        }
        Some(depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> GlobalSettings {
        GlobalSettings::new()
            .with_category(CategoryDesc::new("Global"))
            .with_category(CategoryDesc::new("Music").with_parent(0))
            .with_category(CategoryDesc::new("Ambience").with_parent(1))
            .with_variable(VariableDesc::global("SpeedOfSound", 343.5, 0.0, 1000.0))
            .with_variable(VariableDesc::instance("Distance", 0.0, 0.0, 1000.0))
    }

    #[test]
    fn test_lookups_split_by_scope() {
        let tables = EngineTables::build(settings()).unwrap();
        assert_eq!(tables.global_variable("SpeedOfSound"), Some(0));
        assert_eq!(tables.instance_variable("SpeedOfSound"), None);
        assert_eq!(tables.instance_variable("Distance"), Some(1));
        assert_eq!(tables.global_variable("Distance"), None);
        assert_eq!(tables.category("Music"), Some(1));
        assert_eq!(tables.category("Missing"), None);
    }

    #[test]
    fn test_category_ancestry() {
        let tables = EngineTables::build(settings()).unwrap();
        assert!(tables.is_in_category(2, 0));
        assert!(tables.is_in_category(2, 1));
        assert!(!tables.is_in_category(1, 2));
        assert_eq!(tables.children(0), vec![1]);
    }

    #[test]
    fn test_rejects_bad_parents() {
        let looped = GlobalSettings::new()
            .with_category(CategoryDesc::new("A").with_parent(1))
            .with_category(CategoryDesc::new("B").with_parent(0));
        assert!(EngineTables::build(looped).is_err());

        let dangling = GlobalSettings::new().with_category(CategoryDesc::new("A").with_parent(4));
        assert!(EngineTables::build(dangling).is_err());
    }
}
