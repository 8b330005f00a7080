use std::collections::BTreeMap;

/// Description templates per transaction category, as read from the `groups` section of the
/// configuration. Category names are matched without regard to ASCII case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryGroups {
    substrings: BTreeMap<String, Vec<String>>,
}

impl CategoryGroups {
    pub fn new<K, V, I>(groups: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, Vec<V>)>,
    {
        let substrings = groups
            .into_iter()
            .map(|(k, v)| {
                (
                    k.into().to_lowercase(),
                    v.into_iter().map(Into::into).collect(),
                )
            })
            .collect();
        Self { substrings }
    }

    /// The templates for `category`, if the category is defined.
    pub fn get(&self, category: &str) -> Option<&[String]> {
        self.substrings
            .get(&category.to_lowercase())
            .map(Vec::as_slice)
    }

    pub fn contains(&self, category: &str) -> bool {
        self.get(category).is_some()
    }

    /// Keeps only the categories that are defined, preserving order and repeats.
    pub fn filter_defined(&self, categories: &[&str]) -> Vec<String> {
        categories
            .iter()
            .filter(|c| self.contains(c))
            .map(|c| c.to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.substrings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.substrings.is_empty()
    }
}
