//! Integration tests for the invitation lifecycle endpoints.

mod common;

use axum::http::{Method, StatusCode};
use common::{delete_request, get_request, invitation_body, json_request, TestContext};
use serde_json::{json, Value};

fn status_request(id: &str, status: &str) -> axum::http::Request<axum::body::Body> {
    json_request(
        Method::POST,
        &format!("/api/v1/invitations/{id}/status"),
        json!({ "status": status }),
    )
}

fn pending_uri(invitation: &Value) -> String {
    format!(
        "/api/v1/users/{}/invitations/pending",
        invitation["username"].as_str().unwrap()
    )
}

#[tokio::test]
async fn test_create_invitation_is_pending_and_cached() {
    let ctx = TestContext::new();
    let event_id = ctx.create_event().await;

    let invitation = ctx.invite(&event_id).await;
    assert_eq!(invitation["status"], "pending");
    assert_eq!(invitation["isAccepted"], false);
    assert!(invitation["acceptedDate"].is_null());
    assert_eq!(invitation["title"], "Rust Meetup");

    let username = invitation["username"].as_str().unwrap();
    assert_eq!(ctx.cache.event_ids(username).await, vec![event_id.clone()]);

    let (status, body) = ctx.send(get_request(&pending_uri(&invitation))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["eventId"], event_id.as_str());
}

#[tokio::test]
async fn test_duplicate_invitation_rejected() {
    let ctx = TestContext::new();
    let event_id = ctx.create_event().await;
    let body = invitation_body(&event_id);

    let (status, _) = ctx
        .send(json_request(Method::POST, "/api/v1/invitations", body.clone()))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, error) = ctx
        .send(json_request(Method::POST, "/api/v1/invitations", body))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["message"], "User already invited and awaiting approval");
    assert_eq!(ctx.invitations.len().await, 1);
}

#[tokio::test]
async fn test_invite_to_unknown_event() {
    let ctx = TestContext::new();

    let (status, body) = ctx
        .send(json_request(
            Method::POST,
            "/api/v1/invitations",
            invitation_body("missing"),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Event not found");
    assert!(ctx.invitations.is_empty().await);
}

#[tokio::test]
async fn test_invite_missing_fields() {
    let ctx = TestContext::new();

    let (status, body) = ctx
        .send(json_request(
            Method::POST,
            "/api/v1/invitations",
            json!({ "username": "jdoe" }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_accept_adds_participant_and_clears_pending() {
    let ctx = TestContext::new();
    let event_id = ctx.create_event().await;
    let invitation = ctx.invite(&event_id).await;
    let id = invitation["id"].as_str().unwrap();

    let (status, accepted) = ctx.send(status_request(id, "Accept")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(accepted["status"], "accepted");
    assert_eq!(accepted["isAccepted"], true);
    assert!(!accepted["acceptedDate"].is_null());

    let (_, event) = ctx
        .send(get_request(&format!("/api/v1/events/{event_id}")))
        .await;
    assert_eq!(event["participants"][0]["username"], invitation["username"]);

    let (_, pending) = ctx.send(get_request(&pending_uri(&invitation))).await;
    assert_eq!(pending["count"], 0);

    let (status, body) = ctx.send(status_request(id, "accept")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Event invitation already accepted");

    let (status, _) = ctx.send(status_request(id, "decline")).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_decline_clears_pending_and_is_repeatable() {
    let ctx = TestContext::new();
    let event_id = ctx.create_event().await;
    let invitation = ctx.invite(&event_id).await;
    let id = invitation["id"].as_str().unwrap();

    let (status, declined) = ctx.send(status_request(id, "decline")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(declined["status"], "declined");
    assert_eq!(declined["isAccepted"], false);
    assert!(declined["acceptedDate"].is_null());

    let (_, pending) = ctx.send(get_request(&pending_uri(&invitation))).await;
    assert_eq!(pending["count"], 0);

    let (status, _) = ctx.send(status_request(id, "decline")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = ctx.send(status_request(id, "accept")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Event invitation already declined");

    let (_, event) = ctx
        .send(get_request(&format!("/api/v1/events/{event_id}")))
        .await;
    assert_eq!(event["participants"], json!([]));
}

#[tokio::test]
async fn test_unknown_status_rejected() {
    let ctx = TestContext::new();
    let event_id = ctx.create_event().await;
    let invitation = ctx.invite(&event_id).await;

    let (status, body) = ctx
        .send(status_request(invitation["id"].as_str().unwrap(), "maybe"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Incorrect invitation status");
}

#[tokio::test]
async fn test_status_of_unknown_invitation() {
    let ctx = TestContext::new();

    let (status, body) = ctx.send(status_request("missing", "accept")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Invitation not found");
}

#[tokio::test]
async fn test_delete_invitation_twice() {
    let ctx = TestContext::new();
    let event_id = ctx.create_event().await;
    let invitation = ctx.invite(&event_id).await;
    let uri = format!("/api/v1/invitations/{}", invitation["id"].as_str().unwrap());

    let (status, _) = ctx.send(delete_request(&uri)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, pending) = ctx.send(get_request(&pending_uri(&invitation))).await;
    assert_eq!(pending["count"], 0);

    let (status, _) = ctx.send(delete_request(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx.send(get_request(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reinvite_after_decline() {
    let ctx = TestContext::new();
    let event_id = ctx.create_event().await;
    let body = invitation_body(&event_id);

    let (_, first) = ctx
        .send(json_request(Method::POST, "/api/v1/invitations", body.clone()))
        .await;
    ctx.send(status_request(first["id"].as_str().unwrap(), "decline"))
        .await;

    let (status, second) = ctx
        .send(json_request(Method::POST, "/api/v1/invitations", body))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_ne!(second["id"], first["id"]);
}

#[tokio::test]
async fn test_invite_existing_participant() {
    let ctx = TestContext::new();
    let event_id = ctx.create_event().await;
    let body = invitation_body(&event_id);

    let (_, first) = ctx
        .send(json_request(Method::POST, "/api/v1/invitations", body.clone()))
        .await;
    ctx.send(status_request(first["id"].as_str().unwrap(), "accept"))
        .await;

    let (status, error) = ctx
        .send(json_request(Method::POST, "/api/v1/invitations", body))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["message"], "User already part of event participants");
}

#[tokio::test]
async fn test_pending_served_from_store_when_cache_down() {
    let ctx = TestContext::new();
    let event_id = ctx.create_event().await;
    ctx.cache.set_fail_writes(true);

    let invitation = ctx.invite(&event_id).await;
    let username = invitation["username"].as_str().unwrap();
    assert!(ctx.cache.event_ids(username).await.is_empty());

    ctx.cache.set_fail_writes(false);
    let (status, pending) = ctx.send(get_request(&pending_uri(&invitation))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pending["count"], 1);
    assert_eq!(ctx.cache.event_ids(username).await, vec![event_id]);
}

#[tokio::test]
async fn test_relational_store_down() {
    let ctx = TestContext::new();
    let event_id = ctx.create_event().await;
    ctx.invitations.set_fail_writes(true);

    let (status, body) = ctx
        .send(json_request(
            Method::POST,
            "/api/v1/invitations",
            invitation_body(&event_id),
        ))
        .await;
    assert_eq!(status, StatusCode::FAILED_DEPENDENCY);
    assert_eq!(body["error"], "failed_dependency");
}

#[tokio::test]
async fn test_list_invitations_paginated() {
    let ctx = TestContext::new();
    let event_id = ctx.create_event().await;
    for _ in 0..25 {
        ctx.invite(&event_id).await;
    }
    let other_event = ctx.create_event().await;
    ctx.invite(&other_event).await;

    let (status, body) = ctx
        .send(get_request(&format!(
            "/api/v1/invitations?eventId={event_id}&page=3&pageSize=10"
        )))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 5);
    assert_eq!(body["pagination"]["page"], 3);
    assert_eq!(body["pagination"]["pageSize"], 10);
    assert_eq!(body["pagination"]["totalRecords"], 25);
    assert_eq!(body["pagination"]["totalPages"], 3);
}

#[tokio::test]
async fn test_list_invitations_by_acceptance() {
    let ctx = TestContext::new();
    let event_id = ctx.create_event().await;
    let accepted = ctx.invite(&event_id).await;
    ctx.invite(&event_id).await;
    ctx.send(status_request(accepted["id"].as_str().unwrap(), "accept"))
        .await;

    let (_, body) = ctx
        .send(get_request("/api/v1/invitations?isAccepted=true"))
        .await;
    assert_eq!(body["pagination"]["totalRecords"], 1);
    assert_eq!(body["data"][0]["id"], accepted["id"]);
}
