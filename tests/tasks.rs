use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{test, web, App};
use dotenv::dotenv;
use serde_json::json;
use sqlx::PgPool;
use taskdeck::auth::{hash_password, AuthResponse};
use taskdeck::config::Config;
use taskdeck::routes;

async fn setup() -> (PgPool, Config) {
    dotenv().ok();
    if std::env::var("SECRET").is_err() {
        std::env::set_var("SECRET", "integration-test-secret");
    }
    let config = Config::from_env();
    let pool = PgPool::connect(&config.database_url)
        .await
        .expect("Failed to connect to test DB");
    (pool, config)
}

macro_rules! init_app {
    ($pool:expr, $config:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($pool.clone()))
                .app_data(web::Data::new($config.clone()))
                .app_data(
                    web::JsonConfig::default().error_handler(taskdeck::error::json_error_handler),
                )
                .wrap(
                    Cors::default()
                        .allow_any_origin()
                        .allow_any_method()
                        .allow_any_header()
                        .max_age(3600),
                )
                .wrap(Logger::default())
                .service(routes::health::health)
                .service(web::scope("/api/v1").configure(routes::config))
                .default_service(web::route().to(routes::health::not_found)),
        )
        .await
    };
}

async fn cleanup_user(pool: &PgPool, email: &str) {
    // Tasks go with the user via ON DELETE CASCADE.
    let _ = sqlx::query("DELETE FROM users WHERE email = $1")
        .bind(email)
        .execute(pool)
        .await;
}

async fn seed_admin(pool: &PgPool, email: &str, username: &str, password: &str) {
    let hashed = hash_password(password).unwrap();
    sqlx::query(
        "INSERT INTO users (email, username, first_name, last_name, password, role) \
         VALUES ($1, $2, 'Admin', 'Seed', $3, 'admin')",
    )
    .bind(email)
    .bind(username)
    .bind(&hashed)
    .execute(pool)
    .await
    .expect("Failed to seed admin");
}

async fn signup(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
    >,
    email: &str,
    username: &str,
) -> AuthResponse {
    let req = test::TestRequest::post()
        .uri("/api/v1/signup")
        .set_json(json!({
            "email": email,
            "password": "Password123!",
            "username": username,
            "first_name": "Task",
            "last_name": "Tester"
        }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 201, "signup failed for {}", email);
    test::read_body_json(resp).await
}

async fn login(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
    >,
    email: &str,
    password: &str,
) -> AuthResponse {
    let req = test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 200, "login failed for {}", email);
    test::read_body_json(resp).await
}

async fn create_task(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
    >,
    token: &str,
    payload: serde_json::Value,
) -> serde_json::Value {
    let req = test::TestRequest::post()
        .uri("/api/v1/tasks")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .set_json(payload)
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 201, "task creation failed");
    test::read_body_json(resp).await
}

#[actix_rt::test]
async fn test_basic_principal_is_scoped_to_own_tasks() {
    let (pool, config) = setup().await;
    cleanup_user(&pool, "scoped-a@example.com").await;
    cleanup_user(&pool, "scoped-b@example.com").await;
    let app = init_app!(pool, config);

    let alice = signup(&app, "scoped-a@example.com", "scoped_alice").await;
    let bob = signup(&app, "scoped-b@example.com", "scoped_bob").await;

    create_task(&app, &alice.token, json!({ "title": "alice one" })).await;
    create_task(&app, &alice.token, json!({ "title": "alice two" })).await;
    let bobs = create_task(&app, &bob.token, json!({ "title": "bob secret" })).await;
    let bob_task_id = bobs["task"]["id"].as_i64().unwrap();

    // Even with a foreign userId filter, a basic principal only sees its own
    // rows.
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/tasks?userId={}", bob.user.id))
        .insert_header(("Authorization", format!("Bearer {}", alice.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let listed: serde_json::Value = test::read_body_json(resp).await;
    let rows = listed["result"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows
        .iter()
        .all(|t| t["user_id"].as_i64() == Some(alice.user.id as i64)));

    // A basic principal creating "for" someone else still owns the task.
    let sneaky = create_task(
        &app,
        &alice.token,
        json!({ "title": "sneaky", "user_id": bob.user.id }),
    )
    .await;
    assert_eq!(
        sneaky["task"]["user_id"].as_i64(),
        Some(alice.user.id as i64)
    );

    // Foreign rows read as missing on get/update/delete.
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/tasks/{}", bob_task_id))
        .insert_header(("Authorization", format!("Bearer {}", alice.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/tasks/{}", bob_task_id))
        .insert_header(("Authorization", format!("Bearer {}", alice.token)))
        .set_json(json!({ "title": "hijacked" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/tasks/{}", bob_task_id))
        .insert_header(("Authorization", format!("Bearer {}", alice.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    // Bob's task is untouched.
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/tasks/{}", bob_task_id))
        .insert_header(("Authorization", format!("Bearer {}", bob.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let fetched: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(fetched["task"]["title"], "bob secret");

    cleanup_user(&pool, "scoped-a@example.com").await;
    cleanup_user(&pool, "scoped-b@example.com").await;
}

#[actix_rt::test]
async fn test_admin_may_target_and_reassign_owners() {
    let (pool, config) = setup().await;
    cleanup_user(&pool, "target-admin@example.com").await;
    cleanup_user(&pool, "target-a@example.com").await;
    cleanup_user(&pool, "target-b@example.com").await;
    seed_admin(&pool, "target-admin@example.com", "target_admin", "Password123!").await;
    let app = init_app!(pool, config);

    let admin = login(&app, "target-admin@example.com", "Password123!").await;
    let alice = signup(&app, "target-a@example.com", "target_alice").await;
    let bob = signup(&app, "target-b@example.com", "target_bob").await;

    // Admin creates a task owned by Alice.
    let created = create_task(
        &app,
        &admin.token,
        json!({ "title": "assigned to alice", "user_id": alice.user.id }),
    )
    .await;
    let task_id = created["task"]["id"].as_i64().unwrap();
    assert_eq!(
        created["task"]["user_id"].as_i64(),
        Some(alice.user.id as i64)
    );

    // Admin list filtered by owner sees only Alice's tasks.
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/tasks?userId={}", alice.user.id))
        .insert_header(("Authorization", format!("Bearer {}", admin.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let listed: serde_json::Value = test::read_body_json(resp).await;
    assert!(listed["result"]
        .as_array()
        .unwrap()
        .iter()
        .all(|t| t["user_id"].as_i64() == Some(alice.user.id as i64)));

    // Admin reassigns the task to Bob; omitting user_id keeps the owner.
    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/tasks/{}", task_id))
        .insert_header(("Authorization", format!("Bearer {}", admin.token)))
        .set_json(json!({
            "title": "assigned to bob",
            "completed": true,
            "user_id": bob.user.id
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let updated: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(updated["task"]["user_id"].as_i64(), Some(bob.user.id as i64));
    assert_eq!(updated["task"]["completed"], true);

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/tasks/{}", task_id))
        .insert_header(("Authorization", format!("Bearer {}", admin.token)))
        .set_json(json!({ "title": "still bob's" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let updated: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(updated["task"]["user_id"].as_i64(), Some(bob.user.id as i64));

    cleanup_user(&pool, "target-admin@example.com").await;
    cleanup_user(&pool, "target-a@example.com").await;
    cleanup_user(&pool, "target-b@example.com").await;
}

#[actix_rt::test]
async fn test_search_sort_and_pagination() {
    let (pool, config) = setup().await;
    cleanup_user(&pool, "pages@example.com").await;
    let app = init_app!(pool, config);

    let user = signup(&app, "pages@example.com", "pages_user").await;
    create_task(&app, &user.token, json!({ "title": "alpha report" })).await;
    create_task(&app, &user.token, json!({ "title": "beta report" })).await;
    create_task(&app, &user.token, json!({ "title": "unrelated" })).await;

    // Substring search plus one-row pages.
    let req = test::TestRequest::get()
        .uri("/api/v1/tasks?search=report&rpp=1&page=1")
        .insert_header(("Authorization", format!("Bearer {}", user.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let page1: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(page1["result"].as_array().unwrap().len(), 1);
    assert_eq!(page1["result"][0]["title"], "alpha report");
    assert_eq!(page1["pagination"]["totalPages"], 2);
    assert_eq!(page1["pagination"]["nextPage"], 2);
    assert_eq!(page1["pagination"]["currentPage"], 1);

    let req = test::TestRequest::get()
        .uri("/api/v1/tasks?search=report&rpp=1&page=2")
        .insert_header(("Authorization", format!("Bearer {}", user.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let page2: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(page2["result"][0]["title"], "beta report");
    assert_eq!(page2["pagination"]["nextPage"], serde_json::Value::Null);

    // Descending sort flips the id order.
    let req = test::TestRequest::get()
        .uri("/api/v1/tasks?sort=desc")
        .insert_header(("Authorization", format!("Bearer {}", user.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let desc: serde_json::Value = test::read_body_json(resp).await;
    let ids: Vec<i64> = desc["result"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_i64().unwrap())
        .collect();
    let mut sorted = ids.clone();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    assert_eq!(ids, sorted);

    cleanup_user(&pool, "pages@example.com").await;
}

#[actix_rt::test]
async fn test_deleting_a_missing_task_is_404_and_leaves_rows_alone() {
    let (pool, config) = setup().await;
    cleanup_user(&pool, "leftover@example.com").await;
    let app = init_app!(pool, config);

    let user = signup(&app, "leftover@example.com", "leftover_user").await;
    let kept = create_task(&app, &user.token, json!({ "title": "keep me" })).await;
    let kept_id = kept["task"]["id"].as_i64().unwrap();

    let req = test::TestRequest::delete()
        .uri("/api/v1/tasks/2147483646")
        .insert_header(("Authorization", format!("Bearer {}", user.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/tasks/{}", kept_id))
        .insert_header(("Authorization", format!("Bearer {}", user.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    cleanup_user(&pool, "leftover@example.com").await;
}
