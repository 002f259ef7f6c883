//! Navigation collaborator that receives item-selected signals.

use std::fmt;

use crate::catalogue::ItemKind;
use crate::events::ItemSelected;

/// Destination for a selected item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Product(String),
    Category(String),
}

impl Route {
    pub fn for_item(kind: ItemKind, id: impl Into<String>) -> Self {
        match kind {
            ItemKind::Product => Self::Product(id.into()),
            ItemKind::Category => Self::Category(id.into()),
        }
    }

    pub fn path(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Product(id) => write!(f, "/product/{id}"),
            Self::Category(id) => write!(f, "/products?categoryId={id}"),
        }
    }
}

pub trait Navigator {
    fn navigate(&mut self, route: Route);
}

/// Default navigator for the standalone binary: logs the destination.
#[derive(Debug, Default)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&mut self, route: Route) {
        tracing::info!(route = %route, "navigate");
    }
}

/// Keeps every route it was asked to visit, in order.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    pub visited: Vec<Route>,
}

impl Navigator for RecordingNavigator {
    fn navigate(&mut self, route: Route) {
        self.visited.push(route);
    }
}

impl<N: Navigator + ?Sized> Navigator for Box<N> {
    fn navigate(&mut self, route: Route) {
        (**self).navigate(route);
    }
}

/// Maps a selection signal onto a route and hands it to `navigator`.
pub fn forward_selection(navigator: &mut dyn Navigator, kind: ItemKind, selected: ItemSelected) {
    navigator.navigate(Route::for_item(kind, selected.id));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_and_category_paths() {
        assert_eq!(
            Route::for_item(ItemKind::Product, "42").path(),
            "/product/42"
        );
        assert_eq!(
            Route::for_item(ItemKind::Category, "shoes").path(),
            "/products?categoryId=shoes"
        );
    }

    #[test]
    fn forward_selection_records_route() {
        let mut nav = RecordingNavigator::default();
        forward_selection(
            &mut nav,
            ItemKind::Category,
            ItemSelected { id: "7".into() },
        );
        assert_eq!(nav.visited, vec![Route::Category("7".into())]);
    }
}
