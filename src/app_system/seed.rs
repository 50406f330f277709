use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use super::{StoreSystem, SystemError};
use crate::domain::{
    CategoryCreate, CourierCreate, DeliveryOrderCreate, Ingredient, ProductCreate, RecipeCreate,
    TrackedOrderCreate,
};

/// Initial data loaded at start-up. Products and recipes refer to each other by name.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SeedData {
    pub categories: Vec<CategoryCreate>,
    pub products: Vec<SeedProduct>,
    pub recipes: Vec<SeedRecipe>,
    pub couriers: Vec<CourierCreate>,
    pub shipments: Vec<TrackedOrderCreate>,
    pub delivery_orders: Vec<DeliveryOrderCreate>,
}

#[derive(Debug, Deserialize)]
pub struct SeedProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub stock: u32,
}

#[derive(Debug, Deserialize)]
pub struct SeedRecipe {
    pub name: String,
    pub output: String,
    #[serde(default = "one")]
    pub output_quantity: u32,
    pub ingredients: Vec<SeedIngredient>,
}

#[derive(Debug, Deserialize)]
pub struct SeedIngredient {
    pub product: String,
    pub quantity: u32,
}

fn one() -> u32 {
    1
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub categories: usize,
    pub products: usize,
    pub recipes: usize,
    pub couriers: usize,
    pub shipments: usize,
    pub delivery_orders: usize,
}

impl SeedData {
    pub async fn load(path: &Path) -> Result<Self, SystemError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| SystemError::SeedIo {
                path: path.display().to_string(),
                source,
            })?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Creates every record through the regular clients, so all validation applies.
    pub async fn apply(self, system: &StoreSystem) -> Result<SeedReport, SystemError> {
        let mut report = SeedReport::default();

        let mut categories = HashMap::new();
        for params in self.categories {
            let category = system.catalog.create_category(params).await.map_err(rejected)?;
            categories.insert(category.name.clone(), category.id);
            report.categories += 1;
        }

        let mut products = HashMap::new();
        for seed in self.products {
            let category_id = match seed.category {
                Some(name) => Some(lookup(&categories, "category", &name)?),
                None => None,
            };
            let product = system
                .catalog
                .create_product(ProductCreate {
                    name: seed.name,
                    description: seed.description,
                    price: seed.price,
                    category_id,
                    stock: seed.stock,
                })
                .await
                .map_err(rejected)?;
            products.insert(product.name.clone(), product.id);
            report.products += 1;
        }

        for seed in self.recipes {
            let ingredients = seed
                .ingredients
                .iter()
                .map(|line| {
                    Ok(Ingredient {
                        product_id: lookup(&products, "product", &line.product)?,
                        quantity: line.quantity,
                    })
                })
                .collect::<Result<Vec<_>, SystemError>>()?;
            system
                .catalog
                .create_recipe(RecipeCreate {
                    name: seed.name,
                    output_product_id: lookup(&products, "product", &seed.output)?,
                    output_quantity: seed.output_quantity,
                    ingredients,
                })
                .await
                .map_err(rejected)?;
            report.recipes += 1;
        }

        for params in self.couriers {
            system.tracking.register_courier(params).await.map_err(rejected)?;
            report.couriers += 1;
        }
        for params in self.shipments {
            system.tracking.create_order(params).await.map_err(rejected)?;
            report.shipments += 1;
        }
        for params in self.delivery_orders {
            system.feedback.create_order(params).await.map_err(rejected)?;
            report.delivery_orders += 1;
        }

        info!(
            categories = report.categories,
            products = report.products,
            recipes = report.recipes,
            couriers = report.couriers,
            shipments = report.shipments,
            delivery_orders = report.delivery_orders,
            "Seed data loaded"
        );
        Ok(report)
    }
}

fn lookup(ids: &HashMap<String, String>, kind: &str, name: &str) -> Result<String, SystemError> {
    ids.get(name)
        .cloned()
        .ok_or_else(|| SystemError::SeedRecord(format!("unknown {kind} '{name}'")))
}

fn rejected(err: impl std::fmt::Display) -> SystemError {
    SystemError::SeedRecord(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_system::{AppConfig, Collaborators};
    use crate::services::fast_hashing;
    use serde_json::json;

    fn system() -> StoreSystem {
        let config = AppConfig::default();
        let collaborators = Collaborators {
            hashing: fast_hashing(),
            ..Collaborators::from_config(&config).unwrap()
        };
        StoreSystem::with_collaborators(&config, collaborators)
    }

    #[tokio::test]
    async fn test_seed_links_names_to_ids() {
        let system = system();
        let seed: SeedData = serde_json::from_value(json!({
            "categories": [{ "name": "Materials" }],
            "products": [
                { "name": "Plank", "price": 1.5, "category": "Materials", "stock": 8 },
                { "name": "Stick", "price": 0.5, "category": "Materials" }
            ],
            "recipes": [{
                "name": "Sticks",
                "output": "Stick",
                "output_quantity": 4,
                "ingredients": [{ "product": "Plank", "quantity": 2 }]
            }],
            "couriers": [{ "driver_id": "D-1", "name": "Rosa" }]
        }))
        .unwrap();

        let report = seed.apply(&system).await.unwrap();
        assert_eq!(report.products, 2);
        assert_eq!(report.recipes, 1);
        assert_eq!(report.couriers, 1);

        let recipes = system.catalog.list_recipes().await.unwrap();
        assert_eq!(recipes[0].ingredients[0].product_id, "product_1");
        assert_eq!(recipes[0].output_product_id, "product_2");
    }

    #[tokio::test]
    async fn test_unknown_reference_is_rejected() {
        let system = system();
        let seed: SeedData = serde_json::from_value(json!({
            "products": [{ "name": "Plank", "price": 1.5, "category": "Nowhere" }]
        }))
        .unwrap();
        assert!(matches!(seed.apply(&system).await, Err(SystemError::SeedRecord(_))));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let err = SeedData::load(Path::new("/definitely/not/here.json")).await;
        assert!(matches!(err, Err(SystemError::SeedIo { .. })));
    }
}
