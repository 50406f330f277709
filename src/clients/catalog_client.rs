use tracing::{debug, error, info, instrument, warn};

use crate::actor_framework::ResourceClient;
use crate::catalog_actor::{CatalogError, ProductAction};
use crate::domain::{
    paginate, Category, CategoryCreate, CraftOutcome, Ingredient, Page, Product, ProductCreate,
    ProductPatch, ProductQuery, Recipe, RecipeCreate, StockInfo,
};

/// Client for the catalog actors.
///
/// Owns the cross-record rules: a product's category must exist, a recipe's
/// products must exist, and crafting reserves every ingredient or none.
#[derive(Clone)]
pub struct CatalogClient {
    categories: ResourceClient<Category>,
    products: ResourceClient<Product>,
    recipes: ResourceClient<Recipe>,
    page_size: usize,
}

impl CatalogClient {
    pub fn new(
        categories: ResourceClient<Category>,
        products: ResourceClient<Product>,
        recipes: ResourceClient<Recipe>,
        page_size: usize,
    ) -> Self {
        Self {
            categories,
            products,
            recipes,
            page_size,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.categories.is_alive()
            && self.products.is_alive()
            && self.recipes.is_alive()
    }

    #[instrument(skip(self))]
    pub async fn create_category(&self, params: CategoryCreate) -> Result<Category, CatalogError> {
        debug!("Sending request");
        let id = self.categories.create(params).await?;
        self.get_category(id).await
    }

    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
        debug!("Sending request");
        let mut categories = self.categories.list().await?;
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    #[instrument(skip(self))]
    pub async fn create_product(&self, params: ProductCreate) -> Result<Product, CatalogError> {
        debug!("Sending request");
        if let Some(category_id) = &params.category_id {
            self.ensure_category(category_id).await?;
        }
        let id = self.products.create(params).await?;
        info!(product_id = %id, "Product created");
        self.get_product(id).await
    }

    #[instrument(skip(self))]
    pub async fn update_product(&self, id: String, patch: ProductPatch) -> Result<Product, CatalogError> {
        debug!("Sending request");
        if let Some(category_id) = &patch.category_id {
            self.ensure_category(category_id).await?;
        }
        self.products.update(id, patch).await
    }

    /// Filters by category and search term, orders by name and returns one page.
    #[instrument(skip(self))]
    pub async fn list_products(&self, query: &ProductQuery) -> Result<Page<Product>, CatalogError> {
        debug!("Sending request");
        let mut products: Vec<Product> = self
            .products
            .list()
            .await?
            .into_iter()
            .filter(|p| p.matches(query.category.as_deref(), query.search_term.as_deref()))
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.created_at.cmp(&b.created_at)));
        Ok(paginate(products, query.page.as_deref(), self.page_size))
    }

    #[instrument(skip(self))]
    pub async fn stock_info(&self, id: String) -> Result<StockInfo, CatalogError> {
        Ok(self.get_product(id).await?.stock_info())
    }

    #[instrument(skip(self))]
    pub async fn check_stock(&self, id: String) -> Result<u32, CatalogError> {
        debug!("Sending request");
        self.products.perform_action(id, ProductAction::CheckStock).await
    }

    #[instrument(skip(self))]
    pub async fn reserve_stock(&self, id: String, quantity: u32) -> Result<u32, CatalogError> {
        debug!("Sending request");
        self.products.perform_action(id, ProductAction::ReserveStock(quantity)).await
    }

    #[instrument(skip(self))]
    pub async fn restock(&self, id: String, quantity: u32) -> Result<u32, CatalogError> {
        debug!("Sending request");
        self.products.perform_action(id, ProductAction::Restock(quantity)).await
    }

    /// Applies a signed correction; going below zero fails and changes nothing.
    #[instrument(skip(self))]
    pub async fn adjust_inventory(&self, id: String, delta: i64) -> Result<u32, CatalogError> {
        debug!("Sending request");
        let stock = self.products.perform_action(id.clone(), ProductAction::AdjustStock(delta)).await?;
        info!(product_id = %id, delta, stock, "Inventory adjusted");
        Ok(stock)
    }

    #[instrument(skip(self))]
    pub async fn create_recipe(&self, params: RecipeCreate) -> Result<Recipe, CatalogError> {
        debug!("Sending request");
        self.get_product(params.output_product_id.clone()).await?;
        for line in &params.ingredients {
            self.get_product(line.product_id.clone()).await?;
        }
        let id = self.recipes.create(params).await?;
        self.get_recipe(id).await
    }

    #[instrument(skip(self))]
    pub async fn list_recipes(&self) -> Result<Vec<Recipe>, CatalogError> {
        debug!("Sending request");
        let mut recipes = self.recipes.list().await?;
        recipes.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(recipes)
    }

    /// Crafts `batches` runs of a recipe.
    ///
    /// Every requirement is checked before anything moves. Ingredients are then
    /// reserved one by one; if a reservation fails the ones already taken are
    /// put back, so a failed craft leaves stock as it found it.
    #[instrument(skip(self))]
    pub async fn craft(&self, recipe_id: String, batches: u32) -> Result<CraftOutcome, CatalogError> {
        info!("Processing craft request");
        if batches == 0 {
            return Err(CatalogError::InvalidQuantity(0));
        }
        let recipe = self.get_recipe(recipe_id).await?;
        let produced = recipe.output_quantity.checked_mul(batches).ok_or_else(|| {
            CatalogError::CraftingFailed(format!("{batches} batches of {} is too many", recipe.name))
        })?;
        let requirements = recipe.requirements(batches);

        // Step 1: Check every ingredient
        for need in &requirements {
            let available = self.check_stock(need.product_id.clone()).await?;
            if available < need.quantity {
                warn!(product_id = %need.product_id, requested = need.quantity, available, "Not enough stock to craft");
                return Err(CatalogError::InsufficientStock {
                    product_id: need.product_id.clone(),
                    requested: need.quantity,
                    available,
                });
            }
        }

        // Step 2: Reserve, compensating on failure
        let mut reserved: Vec<&Ingredient> = Vec::with_capacity(requirements.len());
        for need in &requirements {
            if let Err(e) = self.reserve_stock(need.product_id.clone(), need.quantity).await {
                error!(error = %e, product_id = %need.product_id, "Ingredient reservation failed");
                self.release(&reserved).await;
                return Err(e);
            }
            reserved.push(need);
        }

        // Step 3: Produce
        if let Err(e) = self.restock(recipe.output_product_id.clone(), produced).await {
            error!(error = %e, "Output restock failed");
            self.release(&reserved).await;
            return Err(CatalogError::CraftingFailed(e.to_string()));
        }

        info!(recipe_id = %recipe.id, batches, produced, "Crafting complete");
        Ok(CraftOutcome {
            recipe_id: recipe.id,
            batches,
            output_product_id: recipe.output_product_id,
            produced,
            consumed: requirements,
        })
    }

    async fn release(&self, reserved: &[&Ingredient]) {
        for line in reserved {
            if let Err(e) = self.restock(line.product_id.clone(), line.quantity).await {
                error!(error = %e, product_id = %line.product_id, "Could not return reserved stock");
            }
        }
    }

    async fn ensure_category(&self, category_id: &str) -> Result<(), CatalogError> {
        if self.find_category(category_id.to_string()).await?.is_none() {
            return Err(CatalogError::ValidationError(format!(
                "Category {category_id} does not exist"
            )));
        }
        Ok(())
    }
}

crate::impl_client_methods!(CatalogClient, categories => Category, CatalogError, category);
crate::impl_client_methods!(CatalogClient, products => Product, CatalogError, product);
crate::impl_client_methods!(CatalogClient, recipes => Recipe, CatalogError, recipe);
