#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use axum::Router;
    use chrono::{NaiveTime, Utc};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::app_system::{AppConfig, Collaborators, StoreSystem};
    use crate::catalog_actor::{CatalogError, ProductAction};
    use crate::checkout_actor::{AttemptAction, CheckoutError};
    use crate::clients::{CatalogClient, CheckoutClient};
    use crate::domain::{
        AttemptStatus, Category, CheckoutRequest, Ingredient, PaymentAttempt, Product, Recipe,
        SecureSession,
    };
    use crate::http::{router, AppState};
    use crate::mock_framework::{create_mock_client, expect_action, expect_create, expect_get};
    use crate::services::{
        fast_hashing, AgentRoster, FixedClock, MemoryMailer, SecureCheckoutGateway,
    };

    fn recipe() -> Recipe {
        Recipe {
            id: "recipe_1".into(),
            name: "Sticks".into(),
            output_product_id: "stick".into(),
            output_quantity: 4,
            ingredients: vec![Ingredient {
                product_id: "plank".into(),
                quantity: 2,
            }],
        }
    }

    fn catalog_with_mocks() -> (
        CatalogClient,
        tokio::sync::mpsc::Receiver<crate::actor_framework::ResourceRequest<Product>>,
        tokio::sync::mpsc::Receiver<crate::actor_framework::ResourceRequest<Recipe>>,
    ) {
        let (categories, _category_rx) = create_mock_client::<Category>(10);
        let (products, product_rx) = create_mock_client::<Product>(10);
        let (recipes, recipe_rx) = create_mock_client::<Recipe>(10);
        (CatalogClient::new(categories, products, recipes, 10), product_rx, recipe_rx)
    }

    #[tokio::test]
    async fn test_crafting_flow() {
        // 1. Setup Mocks
        let (catalog, mut product_rx, mut recipe_rx) = catalog_with_mocks();

        // 2. Execute crafting in background
        let craft_task = tokio::spawn(async move { catalog.craft("recipe_1".into(), 2).await });

        // 3. Verify Interactions
        let (recipe_id, responder) = expect_get(&mut recipe_rx).await.expect("Expected Recipe Get");
        assert_eq!(recipe_id, "recipe_1");
        responder.send(Ok(Some(recipe()))).unwrap();

        let (product_id, action, responder) = expect_action(&mut product_rx).await.expect("Expected stock check");
        assert_eq!((product_id.as_str(), action), ("plank", ProductAction::CheckStock));
        responder.send(Ok(10)).unwrap();

        let (product_id, action, responder) = expect_action(&mut product_rx).await.expect("Expected reservation");
        assert_eq!((product_id.as_str(), action), ("plank", ProductAction::ReserveStock(4)));
        responder.send(Ok(6)).unwrap();

        let (product_id, action, responder) = expect_action(&mut product_rx).await.expect("Expected output restock");
        assert_eq!((product_id.as_str(), action), ("stick", ProductAction::Restock(8)));
        responder.send(Ok(8)).unwrap();

        // 4. Verify Result
        let outcome = craft_task.await.unwrap().unwrap();
        assert_eq!(outcome.produced, 8);
        assert_eq!(outcome.consumed[0].quantity, 4);
    }

    #[tokio::test]
    async fn test_crafting_returns_reserved_stock_when_a_reservation_fails() {
        let (catalog, mut product_rx, mut recipe_rx) = catalog_with_mocks();
        let mut two_ingredients = recipe();
        two_ingredients.ingredients.push(Ingredient {
            product_id: "glue".into(),
            quantity: 1,
        });

        let craft_task = tokio::spawn(async move { catalog.craft("recipe_1".into(), 1).await });

        let (_, responder) = expect_get(&mut recipe_rx).await.expect("Expected Recipe Get");
        responder.send(Ok(Some(two_ingredients))).unwrap();

        for _ in 0..2 {
            let (_, action, responder) = expect_action(&mut product_rx).await.expect("Expected stock check");
            assert_eq!(action, ProductAction::CheckStock);
            responder.send(Ok(5)).unwrap();
        }

        let (_, action, responder) = expect_action(&mut product_rx).await.expect("Expected plank reservation");
        assert_eq!(action, ProductAction::ReserveStock(2));
        responder.send(Ok(3)).unwrap();

        // Someone else took the glue between the check and the reservation
        let (_, action, responder) = expect_action(&mut product_rx).await.expect("Expected glue reservation");
        assert_eq!(action, ProductAction::ReserveStock(1));
        responder
            .send(Err(CatalogError::InsufficientStock {
                product_id: "glue".into(),
                requested: 1,
                available: 0,
            }))
            .unwrap();

        let (product_id, action, responder) = expect_action(&mut product_rx).await.expect("Expected compensation");
        assert_eq!((product_id.as_str(), action), ("plank", ProductAction::Restock(2)));
        responder.send(Ok(5)).unwrap();

        assert!(matches!(
            craft_task.await.unwrap(),
            Err(CatalogError::InsufficientStock { available: 0, .. })
        ));
    }

    struct OfflineGateway;

    impl SecureCheckoutGateway for OfflineGateway {
        fn open_session(&self, _attempt: &PaymentAttempt, _return_url: &str) -> Result<SecureSession, String> {
            Err("gateway unreachable".into())
        }
    }

    fn attempt(status: AttemptStatus) -> PaymentAttempt {
        PaymentAttempt {
            id: "attempt_1".into(),
            order_id: None,
            amount: 25.0,
            currency: "USD".into(),
            status,
            external_id: None,
            secure_environment_url: None,
            error_message: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_checkout_marks_attempt_failed_when_gateway_is_down() {
        let (inner, mut attempt_rx) = create_mock_client::<PaymentAttempt>(10);
        let checkout = CheckoutClient::new(inner, Arc::new(OfflineGateway), "http://shop.test", "USD");

        let task = tokio::spawn(async move {
            checkout
                .initiate(CheckoutRequest {
                    order_id: None,
                    amount: 25.0,
                })
                .await
        });

        let (params, responder) = expect_create(&mut attempt_rx).await.expect("Expected Attempt Create");
        assert_eq!(params.currency, "USD");
        responder.send(Ok("attempt_1".into())).unwrap();

        let (_, responder) = expect_get(&mut attempt_rx).await.expect("Expected Attempt Get");
        responder.send(Ok(Some(attempt(AttemptStatus::Pending)))).unwrap();

        let (_, action, responder) = expect_action(&mut attempt_rx).await.expect("Expected MarkFailed");
        assert_eq!(
            action,
            AttemptAction::MarkFailed {
                error: "gateway unreachable".into()
            }
        );
        responder.send(Ok(attempt(AttemptStatus::Failed))).unwrap();

        assert_eq!(
            task.await.unwrap(),
            Err(CheckoutError::SecureEnvironmentFailure("gateway unreachable".into()))
        );
    }

    // --- HTTP ---

    struct TestApp {
        app: Router,
        mailer: Arc<MemoryMailer>,
        system: StoreSystem,
    }

    fn test_app(time_of_day: NaiveTime) -> TestApp {
        let config = AppConfig::default();
        let mailer = Arc::new(MemoryMailer::default());
        let collaborators = Collaborators {
            mailer: mailer.clone(),
            clock: Arc::new(FixedClock(time_of_day)),
            agents: Arc::new(AgentRoster::new(vec!["agent_7".into()])),
            hashing: fast_hashing(),
            ..Collaborators::from_config(&config).unwrap()
        };
        let system = StoreSystem::with_collaborators(&config, collaborators);
        TestApp {
            app: router(AppState::new(&system)),
            mailer,
            system,
        }
    }

    fn office_hours() -> NaiveTime {
        NaiveTime::from_hms_opt(10, 30, 0).unwrap()
    }

    async fn call(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
        user_id: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(user_id) = user_id {
            request = request.header("X-User-ID", user_id);
        }
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        send(app, request).await
    }

    /// Sends `body` verbatim, optionally labelled with `content_type`.
    async fn call_raw(
        app: &Router,
        method: Method,
        uri: &str,
        content_type: Option<&str>,
        body: &str,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri).header("X-User-ID", "user_1");
        if let Some(content_type) = content_type {
            request = request.header("content-type", content_type);
        }
        send(app, request.body(Body::from(body.to_string())).unwrap()).await
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn test_health() {
        let TestApp { app, .. } = test_app(office_hours());
        let (status, body) = call(&app, Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "up");
        assert_eq!(body["actors"]["catalog"], true);
        assert_eq!(body["actors"].as_object().unwrap().len(), 9);
    }

    fn assert_bad_request((status, body): (StatusCode, Value)) {
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string(), "unexpected body {body}");
    }

    #[tokio::test]
    async fn test_malformed_json_body_is_a_json_bad_request() {
        let TestApp { app, .. } = test_app(office_hours());

        // Missing card fields
        assert_bad_request(
            call(
                &app,
                Method::POST,
                "/payments/initiate/",
                Some(json!({ "user_id": "u", "amount": 5 })),
                Some("user_1"),
            )
            .await,
        );
        assert_bad_request(
            call_raw(&app, Method::POST, "/tickets/", Some("application/json"), "{\"description\":").await,
        );
        assert_bad_request(
            call_raw(&app, Method::POST, "/tickets/", Some("text/plain"), "Printer on fire").await,
        );
        assert_bad_request(call_raw(&app, Method::POST, "/tickets/", None, "").await);
    }

    #[tokio::test]
    async fn test_malformed_query_is_a_json_bad_request() {
        let TestApp { app, .. } = test_app(office_hours());
        assert_bad_request(call(&app, Method::GET, "/catalog/?page=1&page=2", None, None).await);
        assert_bad_request(
            call(&app, Method::GET, "/feedback/orders/?customer_id=a&customer_id=b", None, None).await,
        );
    }

    #[tokio::test]
    async fn test_malformed_path_is_a_json_bad_request() {
        let TestApp { app, .. } = test_app(office_hours());
        assert_bad_request(call(&app, Method::GET, "/catalog/products/%FF/", None, None).await);
        assert_bad_request(call(&app, Method::GET, "/tickets/%C3%28/", None, None).await);
    }

    #[tokio::test]
    async fn test_register_login_and_reset_password() {
        let TestApp { app, mailer, .. } = test_app(office_hours());

        let (status, profile) = call(
            &app,
            Method::POST,
            "/accounts/register/",
            Some(json!({
                "email": " Ana@Example.com ",
                "password": "Secret123",
                "password_confirm": "Secret123"
            })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(profile["email"], "ana@example.com");

        let (status, _) = call(
            &app,
            Method::POST,
            "/accounts/register/",
            Some(json!({
                "email": "ana@example.com",
                "password": "Secret123",
                "password_confirm": "Secret123"
            })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = call(
            &app,
            Method::POST,
            "/accounts/login/",
            Some(json!({ "email": "ana@example.com", "password": "wrong" })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = call(
            &app,
            Method::POST,
            "/authentication/password-reset/",
            Some(json!({ "email": "ana@example.com" })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let mail = mailer.sent().pop().expect("reset mail");
        let start = mail.body.find("/authentication/").expect("link in mail");
        let path = mail.body[start..].lines().next().unwrap().to_string();

        let (_, check) = call(&app, Method::GET, &path, None, None).await;
        assert_eq!(check["valid"], true);

        let (status, _) = call(
            &app,
            Method::POST,
            &path,
            Some(json!({ "new_password": "Fresh4567", "new_password_confirm": "Fresh4567" })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        // The link dies with the old password
        let (_, check) = call(&app, Method::GET, &path, None, None).await;
        assert_eq!(check["valid"], false);

        let (status, _) = call(
            &app,
            Method::POST,
            "/accounts/login/",
            Some(json!({ "email": "ana@example.com", "password": "Fresh4567" })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_catalog_listing_and_crafting() {
        let TestApp { app, system, .. } = test_app(office_hours());
        let tools = system
            .catalog
            .create_category(crate::domain::CategoryCreate { name: "Materials".into() })
            .await
            .unwrap();
        for (name, stock) in [("Plank", 4), ("Stick", 0)] {
            system
                .catalog
                .create_product(crate::domain::ProductCreate {
                    name: name.into(),
                    description: String::new(),
                    price: 1.0,
                    category_id: Some(tools.id.clone()),
                    stock,
                })
                .await
                .unwrap();
        }
        let recipe = system
            .catalog
            .create_recipe(crate::domain::RecipeCreate {
                name: "Sticks".into(),
                output_product_id: "product_2".into(),
                output_quantity: 4,
                ingredients: vec![Ingredient {
                    product_id: "product_1".into(),
                    quantity: 2,
                }],
            })
            .await
            .unwrap();

        let (status, page) = call(&app, Method::GET, "/catalog/?q=plank&page=9", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["total"], 1);
        assert_eq!(page["number"], 1);

        let craft_uri = format!("/catalog/recipes/{}/craft/", recipe.id);
        let (status, _) = call(&app, Method::POST, &craft_uri, Some(json!({ "quantity": 3 })), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (_, stock) = call(&app, Method::GET, "/catalog/products/product_1/stock/", None, None).await;
        assert_eq!(stock["stock"], 4);

        let (status, outcome) = call(&app, Method::POST, &craft_uri, Some(json!({ "quantity": 2 })), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(outcome["produced"], 8);
        let (_, stock) = call(&app, Method::GET, "/catalog/products/product_2/stock/", None, None).await;
        assert_eq!(stock["message"], "Available (8 units)");

        // No body crafts a single batch
        let (status, _) = call(
            &app,
            Method::POST,
            "/catalog/products/product_1/inventory/",
            Some(json!({ "delta": 2 })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let (status, outcome) = call(&app, Method::POST, &craft_uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!((outcome["batches"].clone(), outcome["produced"].clone()), (json!(1), json!(4)));
        let (_, stock) = call(&app, Method::GET, "/catalog/products/product_1/stock/", None, None).await;
        assert_eq!(stock["stock"], 0);
    }

    #[tokio::test]
    async fn test_declined_card_and_saved_method() {
        let TestApp { app, .. } = test_app(office_hours());
        let payment = |number: &str| {
            json!({
                "user_id": "user_1",
                "amount": 40.0,
                "currency": "USD",
                "card_number": number,
                "expiry_month": "09",
                "expiry_year": "2031",
                "cvc": "123",
                "save_method": true
            })
        };

        let (status, body) = call(
            &app,
            Method::POST,
            "/payments/initiate/",
            Some(payment("4111 1111 1111 1111")),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, body) = call(
            &app,
            Method::POST,
            "/payments/initiate/",
            Some(payment("5500 0000 0000 0004")),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["status"], "COMPLETED");

        let (_, methods) = call(&app, Method::GET, "/payments/saved_methods/user_1/", None, None).await;
        assert_eq!(methods[0]["brand"], "Mastercard");
        assert_eq!(methods[0]["is_default"], true);

        let (status, _) = call(
            &app,
            Method::POST,
            "/payments/confirm/",
            Some(json!({ "transaction_id": "missing", "status": "COMPLETED" })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_rating_happens_once() {
        let TestApp { app, .. } = test_app(office_hours());
        let (_, order) = call(
            &app,
            Method::POST,
            "/feedback/orders/",
            Some(json!({ "customer_id": "user_1" })),
            None,
        )
        .await;
        let uri = format!("/feedback/orders/{}/rating/", order["id"].as_str().unwrap());
        let rating = json!({ "customer_id": "user_1", "score": 5, "comment": "Fast" });

        let (status, outcome) = call(&app, Method::POST, &uri, Some(rating.clone()), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(outcome["rating_status"], "RATED");

        let (status, outcome) = call(&app, Method::POST, &uri, Some(rating), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(outcome["rating_status"], "ERROR");

        let (_, summary) = call(&app, Method::GET, &uri, None, None).await;
        assert_eq!(summary["was_rated"], true);
        assert_eq!(summary["rating"]["score"], 5);
    }

    #[tokio::test]
    async fn test_closing_a_ticket_notifies_once() {
        let TestApp { app, mailer, .. } = test_app(office_hours());
        let (status, ticket) = call(
            &app,
            Method::POST,
            "/tickets/",
            Some(json!({ "description": "Broken hinge", "reporter_email": "rosa@example.com" })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(ticket["status"], "ABIERTO");

        let uri = format!("/tickets/{}/estado/", ticket["id"].as_str().unwrap());
        let (status, _) = call(&app, Method::PATCH, &uri, Some(json!({ "status": "PERDIDO" })), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, first) = call(&app, Method::PUT, &uri, Some(json!({ "status": "CERRADO" })), None).await;
        let (_, second) = call(&app, Method::PUT, &uri, Some(json!({ "status": "CERRADO" })), None).await;
        assert_eq!(first["changed"], true);
        assert_eq!(second["changed"], false);
        assert_eq!(mailer.sent().len(), 1);
        assert_eq!(mailer.sent()[0].to, "rosa@example.com");
    }

    #[tokio::test]
    async fn test_delivery_contact_checks_run_in_order() {
        let TestApp { app, .. } = test_app(office_hours());
        call(
            &app,
            Method::POST,
            "/tracking/orders/",
            Some(json!({ "order_ref": "ORD-1", "customer_id": "user_1", "delivery_address": "Calle 1" })),
            None,
        )
        .await;
        let contact = "/tracking/orders/ORD-1/contact/";

        let (status, _) = call(&app, Method::GET, contact, None, Some("user_2")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = call(&app, Method::GET, contact, None, Some("user_1")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, courier) = call(
            &app,
            Method::POST,
            "/tracking/couriers/",
            Some(json!({ "driver_id": "D-9", "name": "Luis", "phone": "555-0101" })),
            None,
        )
        .await;
        let courier_id = courier["id"].as_str().unwrap().to_string();
        let (status, _) = call(
            &app,
            Method::POST,
            "/tracking/orders/ORD-1/assign/",
            Some(json!({ "courier_id": courier_id })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        // In transit, but the courier left no email
        let (status, _) = call(&app, Method::GET, contact, None, Some("user_1")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, located) = call(&app, Method::GET, "/tracking/orders/ORD-1/locate/", None, None).await;
        assert_eq!((located["latitude"].as_f64(), located["longitude"].as_f64()), (Some(0.0), Some(0.0)));

        call(&app, Method::POST, "/tracking/orders/ORD-1/delivered/", None, None).await;
        let (status, _) = call(&app, Method::GET, contact, None, Some("user_1")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_support_chat_routes_by_hours() {
        let TestApp { app, .. } = test_app(office_hours());
        let (_, session) = call(&app, Method::POST, "/support/chat/", Some(json!({ "user_id": "user_1" })), None).await;
        let id = session["id"].as_str().unwrap().to_string();

        let (status, reply) = call(
            &app,
            Method::POST,
            &format!("/support/chat/{id}/messages/"),
            Some(json!({ "content": "Where is my order?" })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(reply["sender"], "AGENT");
        assert!(reply["content"].as_str().unwrap().contains("'Where is my order?'"));

        let (_, session) = call(&app, Method::GET, &format!("/support/chat/{id}/"), None, None).await;
        assert_eq!(session["agent_id"], "agent_7");
        assert_eq!(session["status"], "IN_PROGRESS");

        let TestApp { app: night, .. } = test_app(NaiveTime::from_hms_opt(22, 0, 0).unwrap());
        let (_, session) = call(&night, Method::POST, "/support/chat/", Some(json!({ "user_id": "user_1" })), None).await;
        let id = session["id"].as_str().unwrap().to_string();
        let (_, reply) = call(
            &night,
            Method::POST,
            &format!("/support/chat/{id}/messages/"),
            Some(json!({ "content": "Hello?" })),
            None,
        )
        .await;
        assert_eq!(reply["sender"], "BOT");

        let (_, closed) = call(&night, Method::POST, &format!("/support/chat/{id}/close/"), None, None).await;
        assert_eq!(closed["status"], "CLOSED");
        let (status, _) = call(
            &night,
            Method::POST,
            &format!("/support/chat/{id}/messages/"),
            Some(json!({ "content": "Still there?" })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
