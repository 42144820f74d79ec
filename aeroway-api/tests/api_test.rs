use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use aeroway_api::middleware::auth::create_token;
use aeroway_api::state::AuthConfig;
use aeroway_api::users::hash_password;
use aeroway_api::{app, AppState};
use aeroway_core::models::NewUser;

fn test_state() -> AppState {
    AppState::in_memory(
        AuthConfig {
            secret: "test-secret".to_string(),
            expiration: 3600,
        },
        std::env::temp_dir().join("aeroway-test-media"),
    )
}

async fn seed_user(state: &AppState, email: &str, is_staff: bool) -> String {
    let user = state
        .users
        .create(NewUser {
            email: email.to_string(),
            password_hash: hash_password("password123").unwrap(),
            is_staff,
        })
        .await
        .unwrap();
    create_token(&state.auth, &user).unwrap()
}

async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn get(router: &Router, uri: &str, token: &str) -> (StatusCode, Value) {
    send(router, Method::GET, uri, Some(token), None).await
}

async fn post(router: &Router, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
    send(router, Method::POST, uri, Some(token), Some(body)).await
}

/// Seeds two airports, a route between them, an airplane type, a 10x6
/// airplane, and one flight. Returns (route_id, flight_id).
async fn seed_flight(router: &Router, staff: &str) -> (i64, i64) {
    let (_, source) = post(
        router,
        "/api/airport/airports",
        staff,
        json!({"name": "Paris", "closest_big_city": "Paris"}),
    )
    .await;
    let (_, destination) = post(
        router,
        "/api/airport/airports",
        staff,
        json!({"name": "Tokyo Airport", "closest_big_city": "Tokyo"}),
    )
    .await;
    let (_, route) = post(
        router,
        "/api/airport/route",
        staff,
        json!({
            "source": source["id"],
            "destination": destination["id"],
            "distance": 9700
        }),
    )
    .await;
    let (_, airplane_type) = post(
        router,
        "/api/airport/airplane_types",
        staff,
        json!({"name": "Wide-body"}),
    )
    .await;
    let (_, airplane) = post(
        router,
        "/api/airport/airplanes",
        staff,
        json!({
            "name": "Boeing 777",
            "rows": 10,
            "seats_in_rows": 6,
            "airplane_type": airplane_type["id"]
        }),
    )
    .await;
    let (status, flight) = post(
        router,
        "/api/airport/flights",
        staff,
        json!({
            "route": route["id"],
            "airplane": airplane["id"],
            "departure_time": "2026-09-01T10:00:00Z",
            "arrival_time": "2026-09-01T22:30:00Z"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    (route["id"].as_i64().unwrap(), flight["id"].as_i64().unwrap())
}

#[tokio::test]
async fn unauthenticated_requests_get_401_on_every_collection() {
    let router = app(test_state());
    for path in [
        "/api/airport/airports",
        "/api/airport/airplane_types",
        "/api/airport/airplanes",
        "/api/airport/crew",
        "/api/airport/route",
        "/api/airport/flights",
        "/api/airport/tickets",
        "/api/airport/orders",
    ] {
        let (status, body) = send(&router, Method::GET, path, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "path {}", path);
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn garbage_token_gets_401() {
    let router = app(test_state());
    let (status, _) = get(&router, "/api/airport/airports", "not-a-jwt").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_token_me_flow() {
    let router = app(test_state());

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/user/register",
        None,
        Some(json!({"email": "alex@example.com", "password": "password123"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], "alex@example.com");
    assert_eq!(body["is_staff"], false);

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/user/token",
        None,
        Some(json!({"email": "alex@example.com", "password": "password123"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let access = body["access"].as_str().unwrap().to_string();

    let (status, body) = get(&router, "/api/user/me", &access).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "alex@example.com");
}

#[tokio::test]
async fn register_rejects_short_passwords_and_duplicate_emails() {
    let router = app(test_state());

    let (status, _) = send(
        &router,
        Method::POST,
        "/api/user/register",
        None,
        Some(json!({"email": "alex@example.com", "password": "short"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    for expected in [StatusCode::CREATED, StatusCode::CONFLICT] {
        let (status, _) = send(
            &router,
            Method::POST,
            "/api/user/register",
            None,
            Some(json!({"email": "alex@example.com", "password": "password123"})),
        )
        .await;
        assert_eq!(status, expected);
    }
}

#[tokio::test]
async fn wrong_password_gets_401() {
    let state = test_state();
    seed_user(&state, "alex@example.com", false).await;
    let router = app(state);

    let (status, _) = send(
        &router,
        Method::POST,
        "/api/user/token",
        None,
        Some(json!({"email": "alex@example.com", "password": "wrong-password"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn non_staff_writes_are_forbidden() {
    let state = test_state();
    let customer = seed_user(&state, "customer@example.com", false).await;
    let router = app(state);

    let (status, _) = post(
        &router,
        "/api/airport/airports",
        &customer,
        json!({"name": "Paris", "closest_big_city": "Paris"}),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &router,
        Method::DELETE,
        "/api/airport/airports/1",
        Some(&customer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn staff_airport_crud_round_trip() {
    let state = test_state();
    let staff = seed_user(&state, "staff@example.com", true).await;
    let router = app(state);

    let (status, created) = post(
        &router,
        "/api/airport/airports",
        &staff,
        json!({"name": "Paris", "closest_big_city": "Paris"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Paris");
    assert_eq!(created["closest_big_city"], "Paris");
    assert_eq!(created["image"], Value::Null);
    let id = created["id"].as_i64().unwrap();

    let (status, body) = send(
        &router,
        Method::PUT,
        &format!("/api/airport/airports/{}", id),
        Some(&staff),
        Some(json!({"name": "Paris CDG", "closest_big_city": "Paris"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Paris CDG");

    let (status, _) = send(
        &router,
        Method::DELETE,
        &format!("/api/airport/airports/{}", id),
        Some(&staff),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = get(&router, &format!("/api/airport/airports/{}", id), &staff).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn airport_name_filter_is_case_insensitive_substring() {
    let state = test_state();
    let staff = seed_user(&state, "staff@example.com", true).await;
    let router = app(state);

    for name in ["Paris", "Tokyo Airport", "Berlin"] {
        post(
            &router,
            "/api/airport/airports",
            &staff,
            json!({"name": name, "closest_big_city": name}),
        )
        .await;
    }

    let (status, body) = get(&router, "/api/airport/airports?name=tok", &staff).await;
    assert_eq!(status, StatusCode::OK);
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Tokyo Airport");
}

#[tokio::test]
async fn airplane_type_id_list_filter() {
    let state = test_state();
    let staff = seed_user(&state, "staff@example.com", true).await;
    let router = app(state);

    let (_, narrow) = post(
        &router,
        "/api/airport/airplane_types",
        &staff,
        json!({"name": "Narrow-body"}),
    )
    .await;
    let (_, wide) = post(
        &router,
        "/api/airport/airplane_types",
        &staff,
        json!({"name": "Wide-body"}),
    )
    .await;

    for (name, type_id) in [("A320", &narrow["id"]), ("B777", &wide["id"])] {
        post(
            &router,
            "/api/airport/airplanes",
            &staff,
            json!({"name": name, "rows": 10, "seats_in_rows": 6, "airplane_type": type_id}),
        )
        .await;
    }

    let uri = format!(
        "/api/airport/airplanes?airplane_type={}",
        narrow["id"].as_i64().unwrap()
    );
    let (status, body) = get(&router, &uri, &staff).await;
    assert_eq!(status, StatusCode::OK);
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "A320");
    // List shape carries the type name, not its id.
    assert_eq!(items[0]["airplane_type"], "Narrow-body");

    let (status, _) = get(&router, "/api/airport/airplanes?airplane_type=1,zero", &staff).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn airplane_dimensions_must_be_positive() {
    let state = test_state();
    let staff = seed_user(&state, "staff@example.com", true).await;
    let router = app(state);

    let (_, airplane_type) = post(
        &router,
        "/api/airport/airplane_types",
        &staff,
        json!({"name": "Wide-body"}),
    )
    .await;
    let (status, body) = post(
        &router,
        "/api/airport/airplanes",
        &staff,
        json!({"name": "B777", "rows": 0, "seats_in_rows": 6, "airplane_type": airplane_type["id"]}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("rows"));
}

#[tokio::test]
async fn route_shapes_compose_the_route_name() {
    let state = test_state();
    let staff = seed_user(&state, "staff@example.com", true).await;
    let router = app(state);
    let (route_id, _) = seed_flight(&router, &staff).await;

    let (status, body) = get(&router, "/api/airport/route", &staff).await;
    assert_eq!(status, StatusCode::OK);
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["route_name"], "Paris - Tokyo Airport");
    assert_eq!(items[0]["source"], "Paris");
    assert_eq!(items[0]["destination"], "Tokyo Airport");

    let (status, body) = get(&router, &format!("/api/airport/route/{}", route_id), &staff).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"]["name"], "Paris");
    assert_eq!(body["destination"]["name"], "Tokyo Airport");

    let (status, body) = get(&router, "/api/airport/route?destination=tokyo", &staff).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = get(&router, "/api/airport/route?destination=berlin", &staff).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn flight_route_filter_matches_composed_name_case_insensitively() {
    let state = test_state();
    let staff = seed_user(&state, "staff@example.com", true).await;
    let router = app(state);
    seed_flight(&router, &staff).await;

    let (status, body) = get(
        &router,
        "/api/airport/flights?route=paris%20-%20tokyo",
        &staff,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = get(&router, "/api/airport/flights?route=berlin", &staff).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn booking_a_seat_decrements_free_seats() {
    let state = test_state();
    let staff = seed_user(&state, "staff@example.com", true).await;
    let router = app(state);
    let (_, flight_id) = seed_flight(&router, &staff).await;

    let (_, body) = get(&router, "/api/airport/flights", &staff).await;
    assert_eq!(body[0]["free_seats"], 60);
    assert!(body[0]["taken_seats"].as_array().unwrap().is_empty());

    let (status, order) = post(
        &router,
        "/api/airport/orders",
        &staff,
        json!({"tickets": [{"row": 1, "seat": 1, "flight": flight_id}]}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["tickets"].as_array().unwrap().len(), 1);

    let (_, body) = get(&router, "/api/airport/flights", &staff).await;
    assert_eq!(body[0]["free_seats"], 59);
    assert_eq!(body[0]["taken_seats"], json!([1]));

    let (_, detail) = get(
        &router,
        &format!("/api/airport/flights/{}", flight_id),
        &staff,
    )
    .await;
    assert_eq!(detail["taken_seats"], json!([{"row": 1, "seat": 1}]));
}

#[tokio::test]
async fn booking_the_same_seat_twice_is_a_conflict() {
    let state = test_state();
    let staff = seed_user(&state, "staff@example.com", true).await;
    let router = app(state);
    let (_, flight_id) = seed_flight(&router, &staff).await;

    let body = json!({"tickets": [{"row": 1, "seat": 1, "flight": flight_id}]});
    let (status, _) = post(&router, "/api/airport/orders", &staff, body.clone()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, response) = post(&router, "/api/airport/orders", &staff, body).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(response["error"].as_str().unwrap().contains("already taken"));
}

#[tokio::test]
async fn order_with_one_bad_ticket_persists_nothing() {
    let state = test_state();
    let staff = seed_user(&state, "staff@example.com", true).await;
    let router = app(state);
    let (_, flight_id) = seed_flight(&router, &staff).await;

    // Second ticket is outside the 10-row cabin.
    let (status, _) = post(
        &router,
        "/api/airport/orders",
        &staff,
        json!({"tickets": [
            {"row": 1, "seat": 1, "flight": flight_id},
            {"row": 11, "seat": 1, "flight": flight_id}
        ]}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, orders) = get(&router, "/api/airport/orders", &staff).await;
    assert!(orders.as_array().unwrap().is_empty());

    let (_, flights) = get(&router, "/api/airport/flights", &staff).await;
    assert_eq!(flights[0]["free_seats"], 60);
}

#[tokio::test]
async fn orders_are_scoped_to_their_owner() {
    let state = test_state();
    let staff = seed_user(&state, "staff@example.com", true).await;
    let other = seed_user(&state, "other@example.com", false).await;
    let router = app(state);
    let (_, flight_id) = seed_flight(&router, &staff).await;

    let (_, order) = post(
        &router,
        "/api/airport/orders",
        &staff,
        json!({"tickets": [{"row": 1, "seat": 1, "flight": flight_id}]}),
    )
    .await;
    let order_id = order["id"].as_i64().unwrap();

    let (_, body) = get(&router, "/api/airport/orders", &other).await;
    assert!(body.as_array().unwrap().is_empty());

    let (status, _) = get(&router, &format!("/api/airport/orders/{}", order_id), &other).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(&router, &format!("/api/airport/orders/{}", order_id), &staff).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn orders_filter_by_creation_day_and_route() {
    let state = test_state();
    let staff = seed_user(&state, "staff@example.com", true).await;
    let router = app(state);
    let (_, flight_id) = seed_flight(&router, &staff).await;

    post(
        &router,
        "/api/airport/orders",
        &staff,
        json!({"tickets": [{"row": 1, "seat": 1, "flight": flight_id}]}),
    )
    .await;

    let today = chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string();
    let (status, body) = get(
        &router,
        &format!("/api/airport/orders?created_at={}", today),
        &staff,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = get(&router, "/api/airport/orders?created_at=2000-01-01", &staff).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());

    let (status, _) = get(&router, "/api/airport/orders?created_at=not-a-date", &staff).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = get(&router, "/api/airport/orders?route=tokyo", &staff).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = get(&router, "/api/airport/orders?route=berlin", &staff).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn tickets_collection_is_read_only_and_nests_flights() {
    let state = test_state();
    let staff = seed_user(&state, "staff@example.com", true).await;
    let router = app(state);
    let (_, flight_id) = seed_flight(&router, &staff).await;

    post(
        &router,
        "/api/airport/orders",
        &staff,
        json!({"tickets": [{"row": 2, "seat": 3, "flight": flight_id}]}),
    )
    .await;

    let (status, body) = get(&router, "/api/airport/tickets", &staff).await;
    assert_eq!(status, StatusCode::OK);
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["row"], 2);
    assert_eq!(items[0]["seat"], 3);
    assert_eq!(items[0]["flight"]["route"], "Paris - Tokyo Airport");

    let ticket_id = items[0]["id"].as_i64().unwrap();
    let (status, detail) = get(&router, &format!("/api/airport/tickets/{}", ticket_id), &staff).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["flight"]["route"]["route_name"], "Paris - Tokyo Airport");

    let (status, _) = send(
        &router,
        Method::POST,
        "/api/airport/tickets",
        Some(&staff),
        Some(json!({"row": 1, "seat": 1, "flight": flight_id})),
    )
    .await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn deletes_on_managed_collections_get_405() {
    let state = test_state();
    let staff = seed_user(&state, "staff@example.com", true).await;
    let router = app(state);
    let (route_id, flight_id) = seed_flight(&router, &staff).await;

    for uri in [
        format!("/api/airport/route/{}", route_id),
        format!("/api/airport/flights/{}", flight_id),
        "/api/airport/tickets/1".to_string(),
        "/api/airport/orders/1".to_string(),
    ] {
        let (status, _) = send(&router, Method::DELETE, &uri, Some(&staff), None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "uri {}", uri);
    }
}
