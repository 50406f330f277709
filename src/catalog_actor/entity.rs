use crate::actor_framework::Entity;
use crate::domain::{Category, CategoryCreate, Product, ProductCreate, ProductPatch, Recipe, RecipeCreate};
use super::actions::ProductAction;
use super::error::CatalogError;
use chrono::Utc;

fn required(value: &str, field: &str) -> Result<String, CatalogError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CatalogError::ValidationError(format!("{field} is required")));
    }
    Ok(value.to_string())
}

fn valid_price(price: f64) -> Result<f64, CatalogError> {
    if !price.is_finite() || price < 0.0 {
        return Err(CatalogError::ValidationError(format!("Invalid price: {price}")));
    }
    Ok(price)
}

impl Entity for Category {
    type Id = String;
    type CreateParams = CategoryCreate;
    type Patch = CategoryCreate;
    type Action = ();
    type ActionResult = ();
    type Error = CatalogError;

    const KIND: &'static str = "category";

    fn id(&self) -> &String {
        &self.id
    }

    fn from_create_params(id: String, params: CategoryCreate) -> Result<Self, CatalogError> {
        Ok(Self {
            id,
            name: required(&params.name, "Category name")?,
        })
    }

    fn on_update(&mut self, patch: CategoryCreate) -> Result<(), CatalogError> {
        self.name = required(&patch.name, "Category name")?;
        Ok(())
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), CatalogError> {
        Ok(())
    }

    fn check_conflict(&self, other: &Self) -> Result<(), CatalogError> {
        if self.name.eq_ignore_ascii_case(&other.name) {
            return Err(CatalogError::AlreadyExists(format!("category '{}'", self.name)));
        }
        Ok(())
    }
}

impl Entity for Product {
    type Id = String;
    type CreateParams = ProductCreate;
    type Patch = ProductPatch;
    type Action = ProductAction;
    type ActionResult = u32;
    type Error = CatalogError;

    const KIND: &'static str = "product";

    fn id(&self) -> &String {
        &self.id
    }

    /// Creates a new Product from creation parameters.
    ///
    /// The category reference is checked by the caller; the actor only sees this store.
    fn from_create_params(id: String, params: ProductCreate) -> Result<Self, CatalogError> {
        let now = Utc::now();
        Ok(Self {
            id,
            name: required(&params.name, "Product name")?,
            description: params.description.trim().to_string(),
            price: valid_price(params.price)?,
            category_id: params.category_id,
            stock: params.stock,
            created_at: now,
            updated_at: now,
        })
    }

    fn on_update(&mut self, patch: ProductPatch) -> Result<(), CatalogError> {
        if let Some(name) = patch.name {
            self.name = required(&name, "Product name")?;
        }
        if let Some(description) = patch.description {
            self.description = description.trim().to_string();
        }
        if let Some(price) = patch.price {
            self.price = valid_price(price)?;
        }
        if let Some(category_id) = patch.category_id {
            self.category_id = Some(category_id);
        }
        if let Some(stock) = patch.stock {
            self.stock = stock;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Handles stock movements.
    ///
    /// # Errors
    /// Returns `InsufficientStock` when a reservation or negative adjustment
    /// would take stock below zero.
    fn handle_action(&mut self, action: ProductAction) -> Result<u32, CatalogError> {
        match action {
            ProductAction::CheckStock => return Ok(self.stock),
            ProductAction::ReserveStock(0) | ProductAction::Restock(0) => {
                return Err(CatalogError::InvalidQuantity(0));
            }
            ProductAction::ReserveStock(amount) => self.take(amount)?,
            ProductAction::Restock(amount) => self.put(amount)?,
            ProductAction::AdjustStock(delta) => {
                let magnitude = u32::try_from(delta.unsigned_abs())
                    .map_err(|_| CatalogError::InvalidQuantity(delta))?;
                if delta < 0 {
                    self.take(magnitude)?;
                } else {
                    self.put(magnitude)?;
                }
            }
        }
        self.updated_at = Utc::now();
        Ok(self.stock)
    }
}

impl Product {
    fn take(&mut self, amount: u32) -> Result<(), CatalogError> {
        if amount > self.stock {
            return Err(CatalogError::InsufficientStock {
                product_id: self.id.clone(),
                requested: amount,
                available: self.stock,
            });
        }
        self.stock -= amount;
        Ok(())
    }

    fn put(&mut self, amount: u32) -> Result<(), CatalogError> {
        self.stock = self
            .stock
            .checked_add(amount)
            .ok_or(CatalogError::InvalidQuantity(i64::from(amount)))?;
        Ok(())
    }
}

impl Entity for Recipe {
    type Id = String;
    type CreateParams = RecipeCreate;
    type Patch = ();
    type Action = ();
    type ActionResult = ();
    type Error = CatalogError;

    const KIND: &'static str = "recipe";

    fn id(&self) -> &String {
        &self.id
    }

    fn from_create_params(id: String, params: RecipeCreate) -> Result<Self, CatalogError> {
        if params.output_quantity == 0 {
            return Err(CatalogError::ValidationError(
                "Output quantity must be greater than zero".into(),
            ));
        }
        if params.ingredients.is_empty() {
            return Err(CatalogError::ValidationError(
                "A recipe needs at least one ingredient".into(),
            ));
        }
        if let Some(line) = params.ingredients.iter().find(|line| line.quantity == 0) {
            return Err(CatalogError::ValidationError(format!(
                "Ingredient {} must have a positive quantity",
                line.product_id
            )));
        }
        Ok(Self {
            id,
            name: required(&params.name, "Recipe name")?,
            output_product_id: params.output_product_id,
            output_quantity: params.output_quantity,
            ingredients: params.ingredients,
        })
    }

    fn on_update(&mut self, _patch: ()) -> Result<(), CatalogError> {
        Ok(())
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), CatalogError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Ingredient;

    fn product(stock: u32) -> Product {
        Product::from_create_params(
            "product_1".into(),
            ProductCreate {
                name: "Nails".into(),
                description: String::new(),
                price: 0.5,
                category_id: None,
                stock,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_reserve_and_restock() {
        let mut nails = product(10);
        assert_eq!(nails.handle_action(ProductAction::ReserveStock(4)), Ok(6));
        assert_eq!(nails.handle_action(ProductAction::Restock(1)), Ok(7));
        assert_eq!(nails.handle_action(ProductAction::CheckStock), Ok(7));
    }

    #[test]
    fn test_reserving_too_much_fails() {
        let mut nails = product(3);
        assert_eq!(
            nails.handle_action(ProductAction::ReserveStock(5)),
            Err(CatalogError::InsufficientStock {
                product_id: "product_1".into(),
                requested: 5,
                available: 3,
            })
        );
        assert_eq!(nails.stock, 3);
    }

    #[test]
    fn test_adjust_stock_both_ways() {
        let mut nails = product(3);
        assert_eq!(nails.handle_action(ProductAction::AdjustStock(7)), Ok(10));
        assert_eq!(nails.handle_action(ProductAction::AdjustStock(-10)), Ok(0));
        assert!(matches!(
            nails.handle_action(ProductAction::AdjustStock(-1)),
            Err(CatalogError::InsufficientStock { .. })
        ));
    }

    #[test]
    fn test_negative_price_is_rejected() {
        let err = Product::from_create_params(
            "product_1".into(),
            ProductCreate {
                name: "Nails".into(),
                description: String::new(),
                price: -1.0,
                category_id: None,
                stock: 0,
            },
        );
        assert!(matches!(err, Err(CatalogError::ValidationError(_))));
    }

    #[test]
    fn test_recipe_needs_positive_quantities() {
        let build = |output_quantity, ingredients| {
            Recipe::from_create_params(
                "recipe_1".into(),
                RecipeCreate {
                    name: "Bundle".into(),
                    output_product_id: "product_2".into(),
                    output_quantity,
                    ingredients,
                },
            )
        };
        let line = |quantity| Ingredient {
            product_id: "product_1".into(),
            quantity,
        };
        assert!(build(1, vec![line(2)]).is_ok());
        assert!(build(0, vec![line(2)]).is_err());
        assert!(build(1, vec![]).is_err());
        assert!(build(1, vec![line(0)]).is_err());
    }
}
