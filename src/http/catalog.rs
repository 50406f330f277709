use axum::extract::State;
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;

use super::{ApiResult, AppState, Json, Path, Query};
use crate::domain::{Category, CraftOutcome, Page, Product, ProductQuery, Recipe, StockInfo};

#[derive(Debug, Deserialize)]
struct InventoryAdjustment {
    delta: i64,
}

#[derive(Debug, Deserialize)]
struct CraftRequest {
    #[serde(default = "one")]
    quantity: u32,
}

fn one() -> u32 {
    1
}

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/catalog/", get(list_products))
        .route("/catalog/categories/", get(list_categories))
        .route("/catalog/products/{id}/", get(product_detail))
        .route("/catalog/products/{id}/stock/", get(stock_info))
        .route("/catalog/products/{id}/inventory/", post(adjust_inventory))
        .route("/catalog/recipes/", get(list_recipes))
        .route("/catalog/recipes/{id}/craft/", post(craft))
}

async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> ApiResult<Json<Page<Product>>> {
    Ok(Json(state.catalog.list_products(&query).await?))
}

async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(state.catalog.list_categories().await?))
}

async fn product_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Product>> {
    Ok(Json(state.catalog.get_product(id).await?))
}

async fn stock_info(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<StockInfo>> {
    Ok(Json(state.catalog.stock_info(id).await?))
}

async fn adjust_inventory(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<InventoryAdjustment>,
) -> ApiResult<Json<StockInfo>> {
    state.catalog.adjust_inventory(id.clone(), body.delta).await?;
    Ok(Json(state.catalog.stock_info(id).await?))
}

async fn list_recipes(State(state): State<AppState>) -> ApiResult<Json<Vec<Recipe>>> {
    Ok(Json(state.catalog.list_recipes().await?))
}

async fn craft(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<CraftRequest>>,
) -> ApiResult<Json<CraftOutcome>> {
    let quantity = body.map_or_else(one, |Json(body)| body.quantity);
    Ok(Json(state.catalog.craft(id, quantity).await?))
}
