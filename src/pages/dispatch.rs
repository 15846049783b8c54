//! Page dispatch: one selection in, one rendered page out.

use tracing::debug;

use crate::domain::{Dataset, FilterSelection, PageView};
use crate::error::AppError;
use crate::pages::registry::PageRegistry;

pub struct Navigator {
    registry: PageRegistry,
}

impl Navigator {
    pub fn new(registry: PageRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &PageRegistry {
        &self.registry
    }

    /// Render the page named `selected`. A missing page is returned as-is;
    /// it means the caller's page list and the registry disagree.
    pub fn run(&self, selected: &str, dataset: &Dataset, selection: &FilterSelection) -> Result<PageView, AppError> {
        let page = self.registry.get(selected)?;
        debug!(page = selected, "dispatch");
        Ok(page.render(dataset, selection))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::error::ErrorKind;
    use crate::pages::registry::{Control, Page};

    struct Counting {
        calls: Rc<Cell<usize>>,
    }

    impl Page for Counting {
        fn controls(&self) -> &'static [Control] {
            &[Control::Store]
        }

        fn render(&self, _dataset: &Dataset, selection: &FilterSelection) -> PageView {
            self.calls.set(self.calls.get() + 1);
            PageView {
                title: format!("store>{}", selection.store.value),
                lines: Vec::new(),
                charts: Vec::new(),
                rows_in_view: 0,
            }
        }
    }

    #[test]
    fn runs_selected_page_exactly_once() {
        let a_calls = Rc::new(Cell::new(0));
        let b_calls = Rc::new(Cell::new(0));
        let mut reg = PageRegistry::new();
        reg.register("A", Counting { calls: a_calls.clone() }).unwrap();
        reg.register("B", Counting { calls: b_calls.clone() }).unwrap();
        let nav = Navigator::new(reg);

        let view = nav.run("B", &Dataset::default(), &FilterSelection::default()).unwrap();
        assert_eq!(view.title, "store>0");
        assert_eq!(a_calls.get(), 0);
        assert_eq!(b_calls.get(), 1);
    }

    #[test]
    fn unknown_page_propagates() {
        let nav = Navigator::new(PageRegistry::new());
        let err = nav
            .run("Nope", &Dataset::default(), &FilterSelection::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownPage);
    }
}
