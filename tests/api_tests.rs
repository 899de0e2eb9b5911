//! End-to-end tests for the web API, driven through the router with
//! in-process requests against a throwaway sqlite database.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use cinelog::config::Config;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn spawn_app() -> Router {
    let db_path =
        std::env::temp_dir().join(format!("cinelog-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.server.secure_cookies = false;
    config.security.jwt_secret = "integration-test-secret".to_string();

    let state = cinelog::api::create_app_state_from_config(config)
        .await
        .expect("failed to create app state");
    cinelog::api::router(state)
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> Response {
    app.clone().oneshot(req).await.unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Register an account, returning (user id, bearer token).
async fn register(app: &Router, username: &str) -> (i64, String) {
    let response = send(
        app,
        request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({"username": username, "password": "password123"})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    (
        body["user"]["id"].as_i64().unwrap(),
        body["token"].as_str().unwrap().to_string(),
    )
}

async fn login(app: &Router, username: &str, password: &str) -> Response {
    send(
        app,
        request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"username": username, "password": password})),
        ),
    )
    .await
}

/// Bearer token for the migration-seeded admin account.
async fn admin_token(app: &Router) -> String {
    let response = login(app, "admin", "changeme").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    body["token"].as_str().unwrap().to_string()
}

/// Register an account and promote it to critic, returning a token carrying
/// the critic role.
async fn register_critic(app: &Router, username: &str) -> (i64, String) {
    let (id, _) = register(app, username).await;
    let admin = admin_token(app).await;

    let response = send(
        app,
        request(
            "PUT",
            &format!("/api/users/{id}/role"),
            Some(admin.as_str()),
            Some(json!({"role": "critic"})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // The old token still carries the user role; log in again for a fresh one
    let response = login(app, username, "password123").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    (id, body["token"].as_str().unwrap().to_string())
}

fn review_payload(movie_id: &str, rating: i64) -> Value {
    json!({
        "movieId": movie_id,
        "movieTitle": format!("Movie {movie_id}"),
        "rating": rating,
        "reviewText": "A review long enough to pass validation.",
    })
}

async fn create_review(app: &Router, token: &str, movie_id: &str, rating: i64) -> Value {
    let response = send(
        app,
        request(
            "POST",
            "/api/reviews",
            Some(token),
            Some(review_payload(movie_id, rating)),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

#[tokio::test]
async fn health_endpoint_is_public() {
    let app = spawn_app().await;

    let response = send(&app, request("GET", "/health", None, None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "OK");
}

#[tokio::test]
async fn register_login_me_flow() {
    let app = spawn_app().await;

    let (id, token) = register(&app, "alice").await;
    assert!(id > 0);

    // Bearer path
    let response = send(&app, request("GET", "/api/auth/me", Some(token.as_str()), None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["username"], "alice");
    assert_eq!(body["role"], "user");

    // No credential
    let response = send(&app, request("GET", "/api/auth/me", None, None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Wrong password
    let response = login(&app, "alice", "wrong-password").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Invalid credentials");
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
    let app = spawn_app().await;

    register(&app, "bob").await;
    let response = send(
        &app,
        request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({"username": "bob", "password": "password123"})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Username is already taken");
}

#[tokio::test]
async fn session_cookie_authenticates_and_logout_clears_it() {
    let app = spawn_app().await;
    register(&app, "carol").await;

    let response = login(&app, "carol", "password123").await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login should set a session cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();

    let req = Request::builder()
        .uri("/api/auth/me")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let response = send(&app, req).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["username"], "carol");

    let req = Request::builder()
        .method("POST")
        .uri("/api/auth/logout")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let response = send(&app, req).await;
    assert_eq!(response.status(), StatusCode::OK);

    let req = Request::builder()
        .uri("/api/auth/me")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let response = send(&app, req).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn session_takes_precedence_over_bearer_token() {
    let app = spawn_app().await;
    register(&app, "claire").await;
    let (_, miles_token) = register(&app, "miles").await;

    let response = login(&app, "claire", "password123").await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login should set a session cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();

    // Both credentials on one request: the cookie session wins
    let req = Request::builder()
        .uri("/api/auth/me")
        .header(header::COOKIE, &cookie)
        .header(header::AUTHORIZATION, format!("Bearer {miles_token}"))
        .body(Body::empty())
        .unwrap();
    let response = send(&app, req).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["username"], "claire");
}

#[tokio::test]
async fn review_validation_rejects_bad_payloads() {
    let app = spawn_app().await;
    let (_, token) = register(&app, "dave").await;

    // Rating out of range
    let response = send(
        &app,
        request(
            "POST",
            "/api/reviews",
            Some(token.as_str()),
            Some(json!({
                "movieId": "m1",
                "movieTitle": "Movie",
                "rating": 11,
                "reviewText": "A review long enough to pass validation.",
            })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Text too short after trimming
    let response = send(
        &app,
        request(
            "POST",
            "/api/reviews",
            Some(token.as_str()),
            Some(json!({
                "movieId": "m1",
                "movieTitle": "Movie",
                "rating": 5,
                "reviewText": "   short   ",
            })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Unauthenticated
    let response = send(
        &app,
        request("POST", "/api/reviews", None, Some(review_payload("m1", 5))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_review_is_rejected_and_first_survives() {
    let app = spawn_app().await;
    let (_, token) = register(&app, "erin").await;

    let first = create_review(&app, &token, "tt0111161", 9).await;
    assert_eq!(first["rating"], 9);
    assert_eq!(first["isFeatured"], false);

    let response = send(
        &app,
        request(
            "POST",
            "/api/reviews",
            Some(token.as_str()),
            Some(review_payload("tt0111161", 2)),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "You have already reviewed this movie");

    // First review is untouched
    let response = send(&app, request("GET", "/api/reviews/movie/tt0111161", None, None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let reviews = body.as_array().unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0]["rating"], 9);
}

#[tokio::test]
async fn like_toggles_and_unlike_is_idempotent() {
    let app = spawn_app().await;
    let (_, author) = register(&app, "frank").await;
    let (_, liker) = register(&app, "grace").await;

    let review = create_review(&app, &author, "m42", 7).await;
    let review_id = review["id"].as_i64().unwrap();
    assert_eq!(review["likes"], 0);

    let response = send(
        &app,
        request("POST", &format!("/api/reviews/{review_id}/like"), Some(liker.as_str()), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["likes"], 1);

    // Second toggle removes the like
    let response = send(
        &app,
        request("POST", &format!("/api/reviews/{review_id}/like"), Some(liker.as_str()), None),
    )
    .await;
    assert_eq!(body_json(response).await["likes"], 0);

    // Unlike when not liked is a no-op, not an error
    let response = send(
        &app,
        request("DELETE", &format!("/api/reviews/{review_id}/like"), Some(liker.as_str()), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["likes"], 0);
}

#[tokio::test]
async fn review_mutators_report_missing_rows() {
    use cinelog::db::repositories::review::CriticDetailsUpdate;

    let db_path =
        std::env::temp_dir().join(format!("cinelog-test-{}.db", uuid::Uuid::new_v4()));
    let store = cinelog::db::Store::new(&format!("sqlite:{}", db_path.display()))
        .await
        .expect("failed to open store");

    let user = store.create_user("nina", "password123", "critic").await.unwrap();
    let review = store
        .create_review(user.id, "m1", "Movie", None, 8, "A perfectly fine picture.", true)
        .await
        .unwrap();

    // A concurrent delete can land between a handler's ownership check and
    // the mutation; the mutators surface that as None, not an error
    store.delete_review(review.id).await.unwrap();

    assert!(
        store
            .update_review(review.id, 5, "Edited after deletion, somehow.")
            .await
            .unwrap()
            .is_none()
    );
    assert!(store.set_review_tags(review.id, "[]").await.unwrap().is_none());
    assert!(store.set_review_featured(review.id, false).await.unwrap().is_none());
    assert!(
        store
            .merge_critic_details(review.id, CriticDetailsUpdate::default())
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn non_owner_cannot_modify_review_but_admin_can() {
    let app = spawn_app().await;
    let (_, owner) = register(&app, "henry").await;
    let (_, other) = register(&app, "iris").await;
    let admin = admin_token(&app).await;

    let review = create_review(&app, &owner, "m7", 6).await;
    let review_id = review["id"].as_i64().unwrap();

    let update = json!({"rating": 3, "reviewText": "Changed my mind about this one."});

    let response = send(
        &app,
        request("PUT", &format!("/api/reviews/{review_id}"), Some(other.as_str()), Some(update.clone())),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(
        &app,
        request("PUT", &format!("/api/reviews/{review_id}"), Some(admin.as_str()), Some(update)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["rating"], 3);

    let response = send(
        &app,
        request("DELETE", &format!("/api/reviews/{review_id}"), Some(other.as_str()), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(
        &app,
        request("DELETE", &format!("/api/reviews/{review_id}"), Some(admin.as_str()), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, request("GET", "/api/reviews/movie/m7", None, None)).await;
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn critic_reviews_are_featured_at_creation() {
    let app = spawn_app().await;
    let (_, critic) = register_critic(&app, "pauline").await;
    let (_, user) = register(&app, "quinn").await;

    let critic_review = create_review(&app, &critic, "m100", 8).await;
    assert_eq!(critic_review["isFeatured"], true);

    let user_review = create_review(&app, &user, "m100", 5).await;
    assert_eq!(user_review["isFeatured"], false);

    let response = send(&app, request("GET", "/api/reviews/featured", None, None)).await;
    let body = body_json(response).await;
    let featured = body.as_array().unwrap();
    assert_eq!(featured.len(), 1);
    assert_eq!(featured[0]["id"], critic_review["id"]);
}

#[tokio::test]
async fn critic_tags_validate_vocabulary_and_role() {
    let app = spawn_app().await;
    let (_, critic) = register_critic(&app, "roger").await;
    let (_, user) = register(&app, "sasha").await;

    let review = create_review(&app, &critic, "m200", 9).await;
    let review_id = review["id"].as_i64().unwrap();

    // Regular users cannot tag, even their own reviews
    let user_review = create_review(&app, &user, "m201", 4).await;
    let user_review_id = user_review["id"].as_i64().unwrap();
    let response = send(
        &app,
        request(
            "POST",
            &format!("/api/reviews/{user_review_id}/tags"),
            Some(user.as_str()),
            Some(json!({"tags": ["classic"]})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Unknown tag value
    let response = send(
        &app,
        request(
            "POST",
            &format!("/api/reviews/{review_id}/tags"),
            Some(critic.as_str()),
            Some(json!({"tags": ["masterpiece", "mediocre"]})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(
        &app,
        request(
            "POST",
            &format!("/api/reviews/{review_id}/tags"),
            Some(critic.as_str()),
            Some(json!({"tags": ["masterpiece", "must-watch"]})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["criticTags"], json!(["masterpiece", "must-watch"]));
}

#[tokio::test]
async fn critic_details_merge_field_wise() {
    let app = spawn_app().await;
    let (_, critic) = register_critic(&app, "tessa").await;

    let review = create_review(&app, &critic, "m300", 10).await;
    let review_id = review["id"].as_i64().unwrap();
    let uri = format!("/api/reviews/{review_id}/critic-details");

    let response = send(
        &app,
        request("POST", &uri, Some(critic.as_str()), Some(json!({"screenplay": 9, "acting": 7}))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["criticDetails"]["screenplay"], 9);
    assert_eq!(body["criticDetails"]["acting"], 7);
    assert_eq!(body["criticDetails"]["directing"], Value::Null);

    // Partial update touches only the named field
    let response = send(
        &app,
        request("POST", &uri, Some(critic.as_str()), Some(json!({"acting": 8}))),
    )
    .await;
    let body = body_json(response).await;
    assert_eq!(body["criticDetails"]["screenplay"], 9);
    assert_eq!(body["criticDetails"]["acting"], 8);

    // Sub-scores share the 1..=10 range
    let response = send(
        &app,
        request("POST", &uri, Some(critic.as_str()), Some(json!({"soundtrack": 0}))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn critic_annotations_have_no_admin_bypass() {
    let app = spawn_app().await;
    let (_, critic) = register_critic(&app, "ursula").await;
    let admin = admin_token(&app).await;

    let review = create_review(&app, &critic, "m400", 8).await;
    let review_id = review["id"].as_i64().unwrap();

    // Admin holds the role but not ownership; annotation endpoints stay closed
    let response = send(
        &app,
        request(
            "POST",
            &format!("/api/reviews/{review_id}/tags"),
            Some(admin.as_str()),
            Some(json!({"tags": ["overrated"]})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(
        &app,
        request(
            "PUT",
            &format!("/api/reviews/{review_id}/feature"),
            Some(admin.as_str()),
            Some(json!({"featured": false})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The owning critic can unfeature their own review
    let response = send(
        &app,
        request(
            "PUT",
            &format!("/api/reviews/{review_id}/feature"),
            Some(critic.as_str()),
            Some(json!({"featured": false})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["isFeatured"], false);
}

#[tokio::test]
async fn recent_reviews_cap_at_ten_newest_first() {
    let app = spawn_app().await;
    let (_, token) = register(&app, "victor").await;

    for i in 1..=12 {
        create_review(&app, &token, &format!("movie-{i:02}"), 5).await;
    }

    let response = send(&app, request("GET", "/api/reviews/recent", None, None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let reviews = body.as_array().unwrap();
    assert_eq!(reviews.len(), 10);
    assert_eq!(reviews[0]["movieId"], "movie-12");
    // The two oldest fell off the page
    let ids: Vec<&str> = reviews.iter().map(|r| r["movieId"].as_str().unwrap()).collect();
    assert!(!ids.contains(&"movie-01"));
    assert!(!ids.contains(&"movie-02"));
}

#[tokio::test]
async fn follow_lifecycle_and_duplicate_rules() {
    let app = spawn_app().await;
    let (alice_id, alice) = register(&app, "alice").await;
    let (bob_id, bob) = register(&app, "bob").await;

    // Self-follow
    let response = send(
        &app,
        request("POST", &format!("/api/follows/{alice_id}"), Some(alice.as_str()), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Unknown target
    let response = send(&app, request("POST", "/api/follows/9999", Some(alice.as_str()), None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(
        &app,
        request("POST", &format!("/api/follows/{bob_id}"), Some(alice.as_str()), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Duplicate edge
    let response = send(
        &app,
        request("POST", &format!("/api/follows/{bob_id}"), Some(alice.as_str()), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Already following this user");

    let response = send(
        &app,
        request("GET", &format!("/api/follows/status/{bob_id}"), Some(alice.as_str()), None),
    )
    .await;
    assert_eq!(body_json(response).await["isFollowing"], true);

    // Direction matters
    let response = send(
        &app,
        request("GET", &format!("/api/follows/status/{alice_id}"), Some(bob.as_str()), None),
    )
    .await;
    assert_eq!(body_json(response).await["isFollowing"], false);

    let response = send(
        &app,
        request("GET", &format!("/api/users/{bob_id}/followers"), None, None),
    )
    .await;
    let body = body_json(response).await;
    let followers = body.as_array().unwrap();
    assert_eq!(followers.len(), 1);
    assert_eq!(followers[0]["username"], "alice");

    let response = send(
        &app,
        request("DELETE", &format!("/api/follows/{bob_id}"), Some(alice.as_str()), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Removing an absent edge is a 404
    let response = send(
        &app,
        request("DELETE", &format!("/api/follows/{bob_id}"), Some(alice.as_str()), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn profile_carries_stats_and_follow_flag() {
    let app = spawn_app().await;
    let (alice_id, alice) = register(&app, "alice").await;
    let (_, bob) = register(&app, "bob").await;

    create_review(&app, &alice, "m1", 7).await;
    create_review(&app, &alice, "m2", 8).await;

    let response = send(
        &app,
        request("POST", &format!("/api/follows/{alice_id}"), Some(bob.as_str()), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Anonymous view
    let response = send(&app, request("GET", &format!("/api/users/{alice_id}"), None, None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["username"], "alice");
    assert_eq!(body["stats"]["reviews"], 2);
    assert_eq!(body["stats"]["followers"], 1);
    assert_eq!(body["stats"]["following"], 0);
    assert_eq!(body["isFollowing"], false);

    // Follower's view
    let response = send(
        &app,
        request("GET", &format!("/api/users/{alice_id}"), Some(bob.as_str()), None),
    )
    .await;
    let body = body_json(response).await;
    assert_eq!(body["isFollowing"], true);

    let response = send(&app, request("GET", "/api/users/9999", None, None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn profile_updates_respect_ownership() {
    let app = spawn_app().await;
    let (alice_id, alice) = register(&app, "alice").await;
    let (_, bob) = register(&app, "bob").await;

    let update = json!({"bio": "Film enjoyer", "favoriteGenres": ["noir", "western"]});

    let response = send(
        &app,
        request("PUT", &format!("/api/users/{alice_id}"), Some(bob.as_str()), Some(update.clone())),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(
        &app,
        request("PUT", &format!("/api/users/{alice_id}"), Some(alice.as_str()), Some(update)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["bio"], "Film enjoyer");
    assert_eq!(body["favoriteGenres"], json!(["noir", "western"]));

    // Omitted fields keep their values
    let response = send(
        &app,
        request(
            "PUT",
            &format!("/api/users/{alice_id}"),
            Some(alice.as_str()),
            Some(json!({"isPrivate": true})),
        ),
    )
    .await;
    let body = body_json(response).await;
    assert_eq!(body["bio"], "Film enjoyer");
    assert_eq!(body["isPrivate"], true);

    // Role is not one of the four mutable fields; a role key in the
    // payload is dropped, not applied
    let response = send(
        &app,
        request(
            "PUT",
            &format!("/api/users/{alice_id}"),
            Some(alice.as_str()),
            Some(json!({"role": "admin", "bio": "Still just a viewer"})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["role"], "user");
    assert_eq!(body["bio"], "Still just a viewer");
}

#[tokio::test]
async fn role_changes_are_admin_only() {
    let app = spawn_app().await;
    let (alice_id, alice) = register(&app, "alice").await;
    let admin = admin_token(&app).await;

    let response = send(
        &app,
        request(
            "PUT",
            &format!("/api/users/{alice_id}/role"),
            Some(alice.as_str()),
            Some(json!({"role": "admin"})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(
        &app,
        request(
            "PUT",
            &format!("/api/users/{alice_id}/role"),
            Some(admin.as_str()),
            Some(json!({"role": "critic"})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["role"], "critic");

    let response = send(
        &app,
        request(
            "PUT",
            &format!("/api/users/{alice_id}/role"),
            Some(admin.as_str()),
            Some(json!({"role": "superuser"})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn user_listing_is_admin_only() {
    let app = spawn_app().await;
    let (_, alice) = register(&app, "alice").await;
    let admin = admin_token(&app).await;

    let response = send(&app, request("GET", "/api/users", Some(alice.as_str()), None)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(&app, request("GET", "/api/users", Some(admin.as_str()), None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    // Seeded admin plus alice
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn watchlist_lifecycle() {
    let app = spawn_app().await;
    let (_, token) = register(&app, "walter").await;

    let response = send(&app, request("GET", "/api/watchlist", Some(token.as_str()), None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["movies"].as_array().unwrap().len(), 0);

    let movie = json!({"movieId": "tt0068646", "movieTitle": "The Godfather"});
    let response = send(
        &app,
        request("POST", "/api/watchlist/add", Some(token.as_str()), Some(movie.clone())),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["movies"].as_array().unwrap().len(), 1);
    assert_eq!(body["movies"][0]["movieTitle"], "The Godfather");

    // Duplicate add
    let response = send(
        &app,
        request("POST", "/api/watchlist/add", Some(token.as_str()), Some(movie)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Movie already in watchlist");

    let response = send(
        &app,
        request("GET", "/api/watchlist/check/tt0068646", Some(token.as_str()), None),
    )
    .await;
    assert_eq!(body_json(response).await["inWatchlist"], true);

    let response = send(
        &app,
        request("DELETE", "/api/watchlist/remove/tt0068646", Some(token.as_str()), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["movies"].as_array().unwrap().len(), 0);

    // Removing an absent movie is a no-op
    let response = send(
        &app,
        request("DELETE", "/api/watchlist/remove/tt0068646", Some(token.as_str()), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Watchlists are private
    let response = send(&app, request("GET", "/api/watchlist", None, None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn movie_search_requires_query() {
    let app = spawn_app().await;

    let response = send(&app, request("GET", "/api/movies/search", None, None)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Query parameter is required");

    let response = send(&app, request("GET", "/api/movies/search?query=%20%20", None, None)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
