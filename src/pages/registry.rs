//! Named pages in navigation order.

use crate::domain::{Dataset, FilterSelection, PageView};
use crate::error::{AppError, ErrorKind};

/// Sidebar inputs a page reads from `FilterSelection`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Store slider/dropdown, `0..=STORE_CONTROL_MAX`.
    Store,
    /// `All Years` plus every year in the data.
    Year,
}

/// A renderable dashboard view.
///
/// The dataset is passed in on every call; pages hold no data of their own.
pub trait Page {
    fn controls(&self) -> &'static [Control];

    fn render(&self, dataset: &Dataset, selection: &FilterSelection) -> PageView;
}

pub struct PageEntry {
    pub name: String,
    pub page: Box<dyn Page>,
}

/// Ordered name → page map. Insertion order is navigation order.
#[derive(Default)]
pub struct PageRegistry {
    entries: Vec<PageEntry>,
}

impl PageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, page: impl Page + 'static) -> Result<(), AppError> {
        let name = name.into();
        if self.entries.iter().any(|e| e.name == name) {
            return Err(AppError::new(
                ErrorKind::DuplicateName,
                format!("Page '{name}' is already registered."),
            ));
        }
        self.entries.push(PageEntry {
            name,
            page: Box::new(page),
        });
        Ok(())
    }

    pub fn list_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Result<&dyn Page, AppError> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.page.as_ref())
            .ok_or_else(|| {
                AppError::new(
                    ErrorKind::UnknownPage,
                    format!("Unknown page '{name}'. Available: {}", self.list_names().join(", ")),
                )
            })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Blank(&'static str);

    impl Page for Blank {
        fn controls(&self) -> &'static [Control] {
            &[]
        }

        fn render(&self, dataset: &Dataset, _selection: &FilterSelection) -> PageView {
            PageView {
                title: self.0.to_string(),
                lines: Vec::new(),
                charts: Vec::new(),
                rows_in_view: dataset.len(),
            }
        }
    }

    #[test]
    fn names_keep_insertion_order() {
        let mut reg = PageRegistry::new();
        reg.register("A", Blank("a")).unwrap();
        reg.register("B", Blank("b")).unwrap();
        assert_eq!(reg.list_names(), vec!["A", "B"]);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn unknown_page_is_an_error() {
        let mut reg = PageRegistry::new();
        reg.register("A", Blank("a")).unwrap();
        reg.register("B", Blank("b")).unwrap();
        let err = reg.get("C").err().unwrap();
        assert_eq!(err.kind(), ErrorKind::UnknownPage);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut reg = PageRegistry::new();
        reg.register("A", Blank("first")).unwrap();
        let err = reg.register("A", Blank("second")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateName);

        let view = reg.get("A").unwrap().render(&Dataset::default(), &FilterSelection::default());
        assert_eq!(view.title, "first");
    }
}
