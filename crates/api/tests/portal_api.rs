//! Self-registration, direct messages, project withdrawal, the professor
//! dashboard and council visibility over HTTP.

mod common;

use axum::http::StatusCode;
use axum::Router;
use capstone_db::models::audit::AuditQuery;
use capstone_db::models::user::User;
use capstone_db::repositories::{AuditLogRepo, ProjectRepo};
use common::{
    body_json, create_user, delete_auth, get_auth, post_json, post_json_auth, token_for, ADMIN,
    PROFESSOR, STUDENT,
};
use serde_json::{json, Value};
use sqlx::PgPool;

async fn submit(app: &Router, student: &User, supervisor: &User) -> i64 {
    let response = post_json_auth(
        app.clone(),
        "/api/v1/projects",
        json!({ "title": "Campus parking tracker", "professor_id": supervisor.id }),
        &token_for(student),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

async fn approve(app: &Router, supervisor: &User, id: i64) {
    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/projects/{id}/approve"),
        json!({}),
        &token_for(supervisor),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

async fn create_council(app: &Router, admin: &User, juror: &User, project_id: i64) -> Value {
    let response = post_json_auth(
        app.clone(),
        "/api/v1/councils",
        json!({
            "name": "Council B",
            "defense_date": "2026-12-20T08:00:00Z",
            "members": [{ "professor_id": juror.id, "role": "chairman" }],
            "project_ids": [project_id],
        }),
        &token_for(admin),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn students_register_then_log_in(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let body = json!({
        "username": "new_student",
        "password": "long-enough-secret",
        "full_name": "New Student",
        "student_code": "SV-2026-001",
    });

    let response = post_json(app.clone(), "/api/v1/auth/register", body.clone()).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["data"]["role"], "student");
    assert!(created["data"].get("password_hash").is_none());
    let id = created["data"]["id"].as_i64().unwrap();

    let response = post_json(app.clone(), "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = post_json(
        app,
        "/api/v1/auth/login",
        json!({ "username": "new_student", "password": "long-enough-secret" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let audited = AuditLogRepo::count(
        &pool,
        &AuditQuery {
            user_id: Some(id),
            action_type: Some("user_register".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(audited, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn registration_needs_a_student_code_and_strong_password(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(
        app.clone(),
        "/api/v1/auth/register",
        json!({
            "username": "codeless",
            "password": "long-enough-secret",
            "full_name": "No Code",
            "student_code": "  ",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json(
        app,
        "/api/v1/auth/register",
        json!({
            "username": "weak",
            "password": "short",
            "full_name": "Weak Password",
            "student_code": "SV-2026-002",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn messages_flow_between_student_and_supervisor(pool: PgPool) {
    let student = create_user(&pool, "student", STUDENT).await;
    let supervisor = create_user(&pool, "supervisor", PROFESSOR).await;
    let app = common::build_test_app(pool);
    let supervisor_token = token_for(&supervisor);

    let response = post_json_auth(
        app.clone(),
        "/api/v1/messages",
        json!({ "receiver_id": supervisor.id, "content": "Draft chapter is uploaded" }),
        &token_for(&student),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let count = body_json(get_auth(app.clone(), "/api/v1/messages/unread-count", &supervisor_token).await).await;
    assert_eq!(count["data"]["count"], 1);

    let inbox = body_json(
        get_auth(
            app.clone(),
            &format!("/api/v1/messages?with_user={}&unread_only=true", student.id),
            &supervisor_token,
        )
        .await,
    )
    .await;
    assert_eq!(inbox["data"][0]["sender_name"], "student Tester");

    // The sender cannot mark their own outgoing message read.
    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/messages/{id}/read"),
        json!({}),
        &token_for(&student),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/messages/{id}/read"),
        json!({}),
        &supervisor_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let count = body_json(get_auth(app, "/api/v1/messages/unread-count", &supervisor_token).await).await;
    assert_eq!(count["data"]["count"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn messages_need_a_real_other_receiver(pool: PgPool) {
    let student = create_user(&pool, "student", STUDENT).await;
    let app = common::build_test_app(pool);
    let token = token_for(&student);

    let response = post_json_auth(
        app.clone(),
        "/api/v1/messages",
        json!({ "receiver_id": student.id, "content": "hi" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json_auth(
        app,
        "/api/v1/messages",
        json!({ "receiver_id": 987_654, "content": "hi" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Withdrawal
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn students_withdraw_only_their_open_proposals(pool: PgPool) {
    let student = create_user(&pool, "student", STUDENT).await;
    let other = create_user(&pool, "other", STUDENT).await;
    let supervisor = create_user(&pool, "supervisor", PROFESSOR).await;
    let app = common::build_test_app(pool.clone());

    let pending = submit(&app, &student, &supervisor).await;
    let uri = format!("/api/v1/projects/{pending}");

    let response = delete_auth(app.clone(), &uri, &token_for(&supervisor)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = delete_auth(app.clone(), &uri, &token_for(&other)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let response = delete_auth(app.clone(), &uri, &token_for(&student)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(ProjectRepo::find_by_id(&pool, pending).await.unwrap().is_none());

    let approved = submit(&app, &student, &supervisor).await;
    approve(&app, &supervisor, approved).await;
    let response = delete_auth(
        app,
        &format!("/api/v1/projects/{approved}"),
        &token_for(&student),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

// ---------------------------------------------------------------------------
// Professor dashboard and councils
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn professors_see_their_own_statistics_and_seats(pool: PgPool) {
    let admin = create_user(&pool, "admin", ADMIN).await;
    let student = create_user(&pool, "student", STUDENT).await;
    let supervisor = create_user(&pool, "supervisor", PROFESSOR).await;
    let juror = create_user(&pool, "juror", PROFESSOR).await;
    let app = common::build_test_app(pool);

    let id = submit(&app, &student, &supervisor).await;
    approve(&app, &supervisor, id).await;
    submit(&app, &student, &supervisor).await;
    let council = create_council(&app, &admin, &juror, id).await;

    let stats = body_json(
        get_auth(app.clone(), "/api/v1/professor/statistics", &token_for(&supervisor)).await,
    )
    .await;
    assert_eq!(stats["data"]["total"], 2);
    assert_eq!(stats["data"]["by_year"].as_array().unwrap().len(), 1);

    let stats = body_json(
        get_auth(app.clone(), "/api/v1/professor/statistics", &token_for(&juror)).await,
    )
    .await;
    assert_eq!(stats["data"]["total"], 0);

    let seats = body_json(get_auth(app.clone(), "/api/v1/professor/seats", &token_for(&juror)).await).await;
    assert_eq!(seats["data"][0]["id"], council["members"][0]["id"]);
    assert_eq!(seats["data"][0]["council_name"], "Council B");

    let response = get_auth(app, "/api/v1/professor/seats", &token_for(&student)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn council_detail_is_for_admins_and_seated_professors(pool: PgPool) {
    let admin = create_user(&pool, "admin", ADMIN).await;
    let student = create_user(&pool, "student", STUDENT).await;
    let supervisor = create_user(&pool, "supervisor", PROFESSOR).await;
    let juror = create_user(&pool, "juror", PROFESSOR).await;
    let app = common::build_test_app(pool);

    let id = submit(&app, &student, &supervisor).await;
    approve(&app, &supervisor, id).await;
    let council = create_council(&app, &admin, &juror, id).await;
    let uri = format!("/api/v1/councils/{}", council["id"]);

    let response = get_auth(app.clone(), &uri, &token_for(&juror)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let detail = body_json(response).await;
    assert_eq!(detail["data"]["projects"][0]["id"], id);
    assert_eq!(detail["data"]["projects"][0]["student_name"], "student Tester");
    assert!(detail["data"]["projects"][0]["scores"].as_array().unwrap().is_empty());

    let response = get_auth(app.clone(), &uri, &token_for(&admin)).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Not seated: not your council.
    let response = get_auth(app.clone(), &uri, &token_for(&supervisor)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get_auth(app, &uri, &token_for(&student)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
