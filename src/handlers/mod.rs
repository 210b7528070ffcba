use axum::extract::State;
use axum::middleware::from_fn;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db::{self, AppState};
use crate::middleware::{authorize, ADMIN_ONLY, ANY_AUTHENTICATED, STAFF};

pub mod assignments;
pub mod customers;
pub mod inventory;
pub mod mechanics;
pub mod tickets;
pub mod users;
pub mod vehicles;

/// Assemble the full endpoint surface. Guards are attached per route, never
/// globally: registration, login, and the public listings take no credential.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(user_routes())
        .merge(customer_routes())
        .merge(vehicle_routes())
        .merge(mechanic_routes())
        .merge(ticket_routes())
        .merge(assignment_routes())
        .merge(inventory_routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/register", post(users::register))
        .route("/users/login", post(users::login))
        .route("/users", get(users::list).route_layer(from_fn(|r, n| authorize(ADMIN_ONLY, r, n))))
        .route(
            "/users/:id",
            get(users::show)
                .route_layer(from_fn(|r, n| authorize(STAFF, r, n)))
                .merge(put(users::update).route_layer(from_fn(|r, n| authorize(ADMIN_ONLY, r, n))))
                .merge(
                    delete(users::remove).route_layer(from_fn(|r, n| authorize(ADMIN_ONLY, r, n))),
                ),
        )
}

fn customer_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/customers",
            get(customers::list)
                .merge(post(customers::create).route_layer(from_fn(|r, n| authorize(STAFF, r, n)))),
        )
        .route(
            "/customers/my-tickets",
            get(customers::my_tickets)
                .route_layer(from_fn(|r, n| authorize(ANY_AUTHENTICATED, r, n))),
        )
        .route(
            "/customers/:id",
            get(customers::show)
                .merge(put(customers::update).route_layer(from_fn(|r, n| authorize(STAFF, r, n))))
                .merge(
                    delete(customers::remove)
                        .route_layer(from_fn(|r, n| authorize(ADMIN_ONLY, r, n))),
                ),
        )
}

fn vehicle_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/vehicles",
            get(vehicles::list)
                .merge(post(vehicles::create).route_layer(from_fn(|r, n| authorize(STAFF, r, n)))),
        )
        .route(
            "/vehicles/:id",
            get(vehicles::show)
                .merge(put(vehicles::update).route_layer(from_fn(|r, n| authorize(STAFF, r, n))))
                .merge(
                    delete(vehicles::remove)
                        .route_layer(from_fn(|r, n| authorize(ADMIN_ONLY, r, n))),
                ),
        )
}

fn mechanic_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/mechanics",
            get(mechanics::list)
                .merge(post(mechanics::create).route_layer(from_fn(|r, n| authorize(STAFF, r, n)))),
        )
        .route("/mechanics/ranked", get(mechanics::ranked))
        .route(
            "/mechanics/:id",
            get(mechanics::show)
                .merge(put(mechanics::update).route_layer(from_fn(|r, n| authorize(STAFF, r, n))))
                .merge(
                    delete(mechanics::remove)
                        .route_layer(from_fn(|r, n| authorize(ADMIN_ONLY, r, n))),
                ),
        )
}

fn ticket_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/tickets",
            get(tickets::list)
                .merge(post(tickets::create).route_layer(from_fn(|r, n| authorize(STAFF, r, n)))),
        )
        .route(
            "/tickets/:id",
            get(tickets::show)
                .merge(put(tickets::update).route_layer(from_fn(|r, n| authorize(STAFF, r, n))))
                .merge(
                    delete(tickets::remove)
                        .route_layer(from_fn(|r, n| authorize(ADMIN_ONLY, r, n))),
                ),
        )
        .route(
            "/tickets/:id/edit",
            put(tickets::edit_assignments).route_layer(from_fn(|r, n| authorize(STAFF, r, n))),
        )
        .route(
            "/tickets/:id/add_part",
            post(tickets::add_part).route_layer(from_fn(|r, n| authorize(STAFF, r, n))),
        )
}

fn assignment_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/assignments",
            get(assignments::list)
                .merge(
                    post(assignments::create).route_layer(from_fn(|r, n| authorize(STAFF, r, n))),
                ),
        )
        .route(
            "/assignments/:id",
            get(assignments::show)
                .merge(
                    put(assignments::update).route_layer(from_fn(|r, n| authorize(STAFF, r, n))),
                )
                .merge(
                    delete(assignments::remove)
                        .route_layer(from_fn(|r, n| authorize(ADMIN_ONLY, r, n))),
                ),
        )
}

fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/inventory",
            get(inventory::list)
                .route_layer(from_fn(|r, n| authorize(STAFF, r, n)))
                .merge(
                    post(inventory::create)
                        .route_layer(from_fn(|r, n| authorize(ADMIN_ONLY, r, n))),
                ),
        )
        .route(
            "/inventory/:id",
            get(inventory::show)
                .route_layer(from_fn(|r, n| authorize(STAFF, r, n)))
                .merge(
                    put(inventory::update)
                        .route_layer(from_fn(|r, n| authorize(ADMIN_ONLY, r, n))),
                )
                .merge(
                    delete(inventory::remove)
                        .route_layer(from_fn(|r, n| authorize(ADMIN_ONLY, r, n))),
                ),
        )
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Garage API",
        "version": version,
        "description": "Auto-repair shop management backend",
        "endpoints": {
            "users": "/users/register, /users/login (public), /users[/:id] (admin)",
            "customers": "/customers[/:id] (paginated list public), /customers/my-tickets (authenticated)",
            "vehicles": "/vehicles[/:id]",
            "mechanics": "/mechanics[/:id], /mechanics/ranked",
            "tickets": "/tickets[/:id], /tickets/:id/edit, /tickets/:id/add_part",
            "assignments": "/assignments[/:id]",
            "inventory": "/inventory[/:id] (staff read, admin write)",
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match db::health_check(&state.pool).await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "degraded",
                "timestamp": now,
                "database_error": e.to_string()
            })),
        ),
    }
}
