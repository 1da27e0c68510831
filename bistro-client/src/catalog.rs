//! Menu browsing: category tabs and free-text search over the loaded menu

use shared::models::{MenuItem, MenuQuery};

use crate::{ClientResult, HttpClient};

/// Label of the tab that shows every category
pub const ALL_CATEGORIES: &str = "All";

/// Loaded menu plus the current filter
#[derive(Debug, Clone, Default)]
pub struct MenuCatalog {
    items: Vec<MenuItem>,
    query: MenuQuery,
}

impl MenuCatalog {
    /// Items are kept ordered by name
    pub fn new(mut items: Vec<MenuItem>) -> Self {
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Self {
            items,
            query: MenuQuery::new(),
        }
    }

    /// Fetch the full menu; filtering then happens locally
    pub async fn load(http: &HttpClient) -> ClientResult<Self> {
        let items = http.menu_items(&MenuQuery::new()).await?;
        tracing::debug!(count = items.len(), "Menu loaded");
        Ok(Self::new(items))
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn query(&self) -> &MenuQuery {
        &self.query
    }

    pub fn set_category(&mut self, category: impl Into<String>) {
        self.query.category = Some(category.into());
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.query.search = Some(search.into());
    }

    pub fn reset(&mut self) {
        self.query = MenuQuery::new();
    }

    /// Items passing the current filter
    pub fn visible(&self) -> Vec<&MenuItem> {
        self.query.apply(&self.items)
    }

    /// Category tabs: "All" first, then each distinct category once
    pub fn categories(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for category in self.items.iter().filter_map(|i| i.category.as_deref()) {
            let category = category.trim();
            if !category.is_empty() && !seen.iter().any(|c| c.eq_ignore_ascii_case(category)) {
                seen.push(category.to_string());
            }
        }
        seen.sort();
        std::iter::once(ALL_CATEGORIES.to_string())
            .chain(seen)
            .collect()
    }

    pub fn find(&self, item_id: i64) -> Option<&MenuItem> {
        self.items.iter().find(|i| i.item_id == item_id)
    }
}
