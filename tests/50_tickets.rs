mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn ticket_requires_an_existing_vehicle() -> Result<()> {
    let app = common::app().await?;
    let staff = common::mechanic_token(&app).await?;

    let (status, body) = common::post(
        &app,
        "/tickets",
        Some(&staff),
        json!({"vehicle_id": 31, "date": "2026-03-01", "status": "open", "cost": "10.00"}),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Vehicle ID 31 not found.");
    Ok(())
}

#[tokio::test]
async fn shape_failures_report_every_bad_field() -> Result<()> {
    let app = common::app().await?;
    let staff = common::mechanic_token(&app).await?;

    let (status, body) = common::post(
        &app,
        "/tickets",
        Some(&staff),
        json!({"vehicle_id": "one", "date": "03/01/2026", "cost": "free"}),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["field_errors"]["vehicle_id"], "Not a valid integer.");
    assert_eq!(body["field_errors"]["date"], "Not a valid date.");
    assert_eq!(body["field_errors"]["cost"], "Not a valid number.");
    assert_eq!(body["field_errors"]["status"], "Missing data for required field.");
    Ok(())
}

#[tokio::test]
async fn cost_round_trips_as_fixed_point() -> Result<()> {
    let app = common::app().await?;
    let staff = common::mechanic_token(&app).await?;
    let owner = common::seed_customer(&app, &staff, "o@t.test").await?;
    let vehicle = common::seed_vehicle(&app, &staff, "VIN-T", owner).await?;

    let (status, body) = common::post(
        &app,
        "/tickets",
        Some(&staff),
        json!({
            "vehicle_id": vehicle,
            "date": "2026-04-15",
            "status": "open",
            "cost": "249.90",
        }),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["cost"], "249.90");
    assert_eq!(body["date"], "2026-04-15");
    assert!(body["description"].is_null());
    Ok(())
}

#[tokio::test]
async fn update_merges_fields_and_checks_the_vehicle() -> Result<()> {
    let app = common::app().await?;
    let staff = common::mechanic_token(&app).await?;
    let owner = common::seed_customer(&app, &staff, "o@t.test").await?;
    let vehicle = common::seed_vehicle(&app, &staff, "VIN-T", owner).await?;
    let id = common::seed_ticket(&app, &staff, vehicle).await?;

    let (status, body) = common::put(
        &app,
        &format!("/tickets/{id}"),
        Some(&staff),
        json!({"status": "closed", "cost": "180.00"}),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "closed");
    assert_eq!(body["cost"], "180.00");
    assert_eq!(body["description"], "Brake inspection");

    let (status, body) =
        common::put(&app, &format!("/tickets/{id}"), Some(&staff), json!({"vehicle_id": 90}))
            .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Vehicle ID 90 not found.");
    Ok(())
}

#[tokio::test]
async fn reads_are_public_and_deletes_are_admin_only() -> Result<()> {
    let app = common::app().await?;
    let admin = common::admin_token(&app).await?;
    let staff = common::mechanic_token(&app).await?;
    let owner = common::seed_customer(&app, &staff, "o@t.test").await?;
    let vehicle = common::seed_vehicle(&app, &staff, "VIN-T", owner).await?;
    let id = common::seed_ticket(&app, &staff, vehicle).await?;

    let (status, body) = common::get(&app, "/tickets", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    let (status, _) = common::delete(&app, &format!("/tickets/{id}"), Some(&staff)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = common::delete(&app, &format!("/tickets/{id}"), Some(&admin)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], format!("Service ticket {id} deleted successfully"));

    let (status, body) = common::get(&app, &format!("/tickets/{id}"), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Service ticket not found.");

    let (status, body) = common::delete(&app, &format!("/tickets/{id}"), Some(&admin)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Service ticket not found.");
    Ok(())
}
