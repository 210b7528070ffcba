mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn vehicle_requires_an_existing_owner() -> Result<()> {
    let app = common::app().await?;
    let staff = common::mechanic_token(&app).await?;

    let (status, body) = common::post(
        &app,
        "/vehicles",
        Some(&staff),
        json!({"vin": "V1", "make": "Ford", "model": "Focus", "year": 2018, "customer_id": 77}),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Customer ID 77 not found.");
    Ok(())
}

#[tokio::test]
async fn duplicate_vin_conflicts() -> Result<()> {
    let app = common::app().await?;
    let staff = common::mechanic_token(&app).await?;
    let owner = common::seed_customer(&app, &staff, "owner@v.test").await?;
    common::seed_vehicle(&app, &staff, "SAME-VIN", owner).await?;

    let (status, body) = common::post(
        &app,
        "/vehicles",
        Some(&staff),
        json!({"vin": "SAME-VIN", "make": "Kia", "model": "Rio", "year": 2021, "customer_id": owner}),
    )
    .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "VIN already registered.");
    Ok(())
}

#[tokio::test]
async fn update_vin_conflicts_only_with_other_vehicles() -> Result<()> {
    let app = common::app().await?;
    let staff = common::mechanic_token(&app).await?;
    let owner = common::seed_customer(&app, &staff, "owner@v.test").await?;
    let id = common::seed_vehicle(&app, &staff, "VIN-A", owner).await?;
    common::seed_vehicle(&app, &staff, "VIN-B", owner).await?;

    // Resubmitting the vehicle's own VIN is a no-op, not a conflict.
    let (status, _) = common::put(
        &app,
        &format!("/vehicles/{id}"),
        Some(&staff),
        json!({"vin": "VIN-A", "model": "Civic Type R"}),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) =
        common::put(&app, &format!("/vehicles/{id}"), Some(&staff), json!({"vin": "VIN-B"}))
            .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "VIN already associated with another vehicle");
    Ok(())
}

#[tokio::test]
async fn update_validates_the_new_owner() -> Result<()> {
    let app = common::app().await?;
    let staff = common::mechanic_token(&app).await?;
    let owner = common::seed_customer(&app, &staff, "owner@v.test").await?;
    let id = common::seed_vehicle(&app, &staff, "VIN-A", owner).await?;

    let (status, body) =
        common::put(&app, &format!("/vehicles/{id}"), Some(&staff), json!({"customer_id": 404}))
            .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Customer ID 404 not found.");
    Ok(())
}

#[tokio::test]
async fn reads_are_public_and_missing_rows_are_404() -> Result<()> {
    let app = common::app().await?;
    let staff = common::mechanic_token(&app).await?;
    let owner = common::seed_customer(&app, &staff, "owner@v.test").await?;
    let id = common::seed_vehicle(&app, &staff, "VIN-A", owner).await?;

    let (status, body) = common::get(&app, "/vehicles", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    let (status, body) = common::get(&app, &format!("/vehicles/{id}"), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["vin"], "VIN-A");
    assert_eq!(body["customer_id"], owner);

    let (status, body) = common::get(&app, "/vehicles/999", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Vehicle not found.");
    Ok(())
}

#[tokio::test]
async fn delete_is_admin_only() -> Result<()> {
    let app = common::app().await?;
    let admin = common::admin_token(&app).await?;
    let staff = common::mechanic_token(&app).await?;
    let owner = common::seed_customer(&app, &staff, "owner@v.test").await?;
    let id = common::seed_vehicle(&app, &staff, "VIN-A", owner).await?;

    let (status, _) = common::delete(&app, &format!("/vehicles/{id}"), Some(&staff)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = common::delete(&app, &format!("/vehicles/{id}"), Some(&admin)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], format!("Vehicle {id} deleted successfully"));

    // Deleting the same id again, or one that never existed, is a 404.
    let (status, body) = common::delete(&app, &format!("/vehicles/{id}"), Some(&admin)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Vehicle not found.");
    Ok(())
}
