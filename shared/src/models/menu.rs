//! Menu Item Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, ErrorCode};
use crate::order::money::round_money;

/// Maximum allowed menu price
pub const MAX_MENU_PRICE: Decimal = Decimal::from_parts(100_000, 0, 0, false, 0);

/// Menu item entity (read-only for clients)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct MenuItem {
    pub item_id: i64,
    pub name: String,
    /// Unit price in the restaurant currency
    pub price: Decimal,
    /// Free-form category label (e.g. "Pizza", "Drinks")
    pub category: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// Create menu item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItemCreate {
    pub name: String,
    pub price: Decimal,
    pub category: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

impl MenuItemCreate {
    /// Trim text fields, drop blanks and check name/price
    pub fn normalized(self) -> Result<Self, AppError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::required("name"));
        }
        if self.price.is_sign_negative() || self.price > MAX_MENU_PRICE {
            return Err(AppError::with_message(
                ErrorCode::MenuItemInvalidPrice,
                format!("price must be between 0 and {MAX_MENU_PRICE}, got {}", self.price),
            ));
        }
        Ok(Self {
            name,
            price: round_money(self.price),
            category: non_blank(self.category),
            description: non_blank(self.description),
            image_url: non_blank(self.image_url),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Catalog filter: category label and free-text search
///
/// Both parts are optional; an absent or blank part matches everything.
/// The category "All" (any case) is treated as no category filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuQuery {
    pub category: Option<String>,
    #[serde(rename = "q")]
    pub search: Option<String>,
}

impl MenuQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    fn category_filter(&self) -> Option<String> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all"))
            .map(str::to_lowercase)
    }

    fn search_filter(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    /// Whether a single item passes the filter
    pub fn matches(&self, item: &MenuItem) -> bool {
        if let Some(category) = self.category_filter() {
            let item_category = item.category.as_deref().unwrap_or_default().to_lowercase();
            if item_category != category {
                return false;
            }
        }

        if let Some(needle) = self.search_filter() {
            let haystacks = [
                Some(item.name.as_str()),
                item.description.as_deref(),
                item.category.as_deref(),
            ];
            return haystacks
                .into_iter()
                .flatten()
                .any(|h| h.to_lowercase().contains(&needle));
        }

        true
    }

    /// Filter a slice, keeping the original order
    pub fn apply<'a>(&self, items: &'a [MenuItem]) -> Vec<&'a MenuItem> {
        items.iter().filter(|item| self.matches(item)).collect()
    }
}
