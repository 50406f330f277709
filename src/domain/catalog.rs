use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A grouping of products, e.g. "Tools".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Category {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryCreate {
    pub name: String,
}

/// Represents a product in the inventory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category_id: Option<String>,
    pub stock: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub stock: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category_id: Option<String>,
    pub stock: Option<u32>,
}

impl Product {
    pub fn matches(&self, category_id: Option<&str>, search_term: Option<&str>) -> bool {
        if let Some(category_id) = category_id {
            if self.category_id.as_deref() != Some(category_id) {
                return false;
            }
        }
        match search_term.map(str::trim).filter(|term| !term.is_empty()) {
            Some(term) => {
                let term = term.to_lowercase();
                self.name.to_lowercase().contains(&term)
                    || self.description.to_lowercase().contains(&term)
            }
            None => true,
        }
    }

    pub fn stock_info(&self) -> StockInfo {
        let available = self.stock > 0;
        let message = if available {
            format!("Available ({} units)", self.stock)
        } else {
            "Currently unavailable".to_string()
        };
        StockInfo {
            product_id: self.id.clone(),
            stock: self.stock,
            available,
            message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockInfo {
    pub product_id: String,
    pub stock: u32,
    pub available: bool,
    pub message: String,
}

/// Query string of the product listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductQuery {
    pub category: Option<String>,
    #[serde(alias = "q")]
    pub search_term: Option<String>,
    pub page: Option<String>,
}

/// One ingredient line of a crafting recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub product_id: String,
    pub quantity: u32,
}

/// Turns ingredient products into `output_quantity` units of the output product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recipe {
    pub id: String,
    pub name: String,
    pub output_product_id: String,
    pub output_quantity: u32,
    pub ingredients: Vec<Ingredient>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecipeCreate {
    pub name: String,
    pub output_product_id: String,
    pub output_quantity: u32,
    pub ingredients: Vec<Ingredient>,
}

impl Recipe {
    /// Units of each ingredient product needed to craft `times` batches.
    ///
    /// Lines naming the same product are summed.
    pub fn requirements(&self, times: u32) -> Vec<Ingredient> {
        let mut needed: Vec<Ingredient> = Vec::new();
        for line in &self.ingredients {
            let amount = line.quantity.saturating_mul(times);
            match needed.iter_mut().find(|n| n.product_id == line.product_id) {
                Some(existing) => existing.quantity = existing.quantity.saturating_add(amount),
                None => needed.push(Ingredient {
                    product_id: line.product_id.clone(),
                    quantity: amount,
                }),
            }
        }
        needed
    }
}

/// Result of a successful crafting run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CraftOutcome {
    pub recipe_id: String,
    pub batches: u32,
    pub output_product_id: String,
    pub produced: u32,
    pub consumed: Vec<Ingredient>,
}

/// A page of results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: usize,
    pub num_pages: usize,
    pub total: usize,
    pub has_next: bool,
    pub has_previous: bool,
}

/// Slices `items` into the requested page.
///
/// A missing or unparsable page number yields the first page; any number outside
/// `1..=num_pages` (zero and negatives included) yields the last page. There is
/// always at least one (possibly empty) page.
pub fn paginate<T>(items: Vec<T>, page: Option<&str>, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let total = items.len();
    let num_pages = total.div_ceil(per_page).max(1);
    let number = match page.and_then(|raw| raw.trim().parse::<i64>().ok()) {
        None => 1,
        Some(n) if n >= 1 && n <= num_pages as i64 => n as usize,
        Some(_) => num_pages,
    };
    let items = items
        .into_iter()
        .skip((number - 1) * per_page)
        .take(per_page)
        .collect();
    Page {
        items,
        number,
        num_pages,
        total,
        has_next: number < num_pages,
        has_previous: number > 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(name: &str, description: &str, category: Option<&str>, stock: u32) -> Product {
        Product {
            id: format!("product_{name}"),
            name: name.into(),
            description: description.into(),
            price: 1.0,
            category_id: category.map(String::from),
            stock,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_search_covers_name_and_description() {
        let hammer = product("Hammer", "Steel head", Some("category_1"), 3);
        assert!(hammer.matches(None, Some("hAmM")));
        assert!(hammer.matches(None, Some("steel")));
        assert!(hammer.matches(Some("category_1"), Some("  ")));
        assert!(!hammer.matches(Some("category_2"), None));
        assert!(!hammer.matches(None, Some("wood")));
    }

    #[test]
    fn test_stock_info_message() {
        assert_eq!(
            product("Saw", "", None, 4).stock_info().message,
            "Available (4 units)"
        );
        let empty = product("Saw", "", None, 0).stock_info();
        assert!(!empty.available);
        assert_eq!(empty.message, "Currently unavailable");
    }

    #[test]
    fn test_paginate_clamps_page_numbers() {
        let items: Vec<u32> = (1..=25).collect();

        let first = paginate(items.clone(), Some("abc"), 10);
        assert_eq!(first.number, 1);
        assert_eq!(first.items, (1..=10).collect::<Vec<_>>());
        assert!(first.has_next && !first.has_previous);

        let last = paginate(items.clone(), Some("99"), 10);
        assert_eq!(last.number, 3);
        assert_eq!(last.items, vec![21, 22, 23, 24, 25]);

        let zero = paginate(items.clone(), Some("0"), 10);
        assert_eq!(zero.number, 3);
        let negative = paginate(items, Some("-2"), 10);
        assert_eq!(negative.number, 3);

        let empty = paginate(Vec::<u32>::new(), Some("2"), 10);
        assert_eq!((empty.number, empty.num_pages, empty.total), (1, 1, 0));
    }

    #[test]
    fn test_requirements_are_aggregated_per_product() {
        let recipe = Recipe {
            id: "recipe_1".into(),
            name: "Plank bundle".into(),
            output_product_id: "product_9".into(),
            output_quantity: 1,
            ingredients: vec![
                Ingredient { product_id: "product_1".into(), quantity: 2 },
                Ingredient { product_id: "product_2".into(), quantity: 1 },
                Ingredient { product_id: "product_1".into(), quantity: 1 },
            ],
        };
        assert_eq!(
            recipe.requirements(3),
            vec![
                Ingredient { product_id: "product_1".into(), quantity: 9 },
                Ingredient { product_id: "product_2".into(), quantity: 3 },
            ]
        );
    }
}
