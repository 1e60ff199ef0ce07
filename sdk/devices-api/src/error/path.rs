use std::fmt::{Display, Formatter, Result as FormatResult};

/// One step into a decoded JSON document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathItem {
    Key(String),
    Index(usize),
}

/// Location of the offending item inside a payload, e.g. `['devices'][2]['status']`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPath(Vec<PathItem>);

impl ItemPath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut items = self.0.clone();
        items.push(PathItem::Key(key.into()));
        Self(items)
    }

    pub fn index(&self, index: usize) -> Self {
        let mut items = self.0.clone();
        items.push(PathItem::Index(index));
        Self(items)
    }

    pub fn items(&self) -> &[PathItem] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `['field'][0]` form, empty string at the root.
    pub fn render(&self) -> String {
        self.0
            .iter()
            .map(|item| match item {
                PathItem::Key(key) => format!("['{key}']"),
                PathItem::Index(index) => format!("[{index}]"),
            })
            .collect()
    }
}

impl From<Vec<PathItem>> for ItemPath {
    fn from(items: Vec<PathItem>) -> Self {
        Self(items)
    }
}

// Renders as a suffix so error messages read "... at ['field']" or nothing.
impl Display for ItemPath {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        if self.is_empty() {
            Ok(())
        } else {
            write!(formatter, " at {}", self.render())
        }
    }
}
