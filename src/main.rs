//! Arte do Sabor - storefront core service

use anyhow::Result;
use arte_do_sabor::checkout::{Checkout, CheckoutError};
use arte_do_sabor::delivery::{DeliveryError, DeliveryZone, FeeQuote, GeoPoint, ZoneCatalog};
use arte_do_sabor::domain::aggregates::cart::{Cart, CartItem, ChosenComplement};
use arte_do_sabor::domain::value_objects::Money;
use arte_do_sabor::pix::PixIdentity;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Clone)]
struct AppState {
    checkout: Arc<Checkout>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let state = AppState { checkout: Arc::new(checkout_from_env()?) };

    let app = Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "arte-do-sabor"})) }))
        .route("/api/v1/delivery/zones", get(list_zones))
        .route("/api/v1/delivery/quote", post(quote_delivery))
        .route("/api/v1/pix/charges", post(create_pix_charge))
        .route("/api/v1/checkout", post(run_checkout))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let port = std::env::var("PORT").unwrap_or_else(|_| "8083".to_string());
    tracing::info!("🍰 Arte do Sabor storefront core listening on 0.0.0.0:{}", port);
    axum::serve(tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?, app).await?;
    Ok(())
}

/// Static configuration: merchant identity, store coordinates and the zone
/// catalog. Everything has a default so the service runs out of the box.
fn checkout_from_env() -> Result<Checkout> {
    let key = std::env::var("PIX_KEY").unwrap_or_else(|_| "+5563981221181".into());
    let name = std::env::var("PIX_MERCHANT_NAME").unwrap_or_else(|_| "Arte do Sabor".into());
    let city = std::env::var("PIX_MERCHANT_CITY").unwrap_or_else(|_| "Palmas".into());
    let whatsapp = std::env::var("WHATSAPP_NUMBER").unwrap_or_else(|_| "+5563981221181".into());
    let lat: f64 = std::env::var("STORE_LAT").unwrap_or_else(|_| "-10.1846".into()).parse()?;
    let lng: f64 = std::env::var("STORE_LNG").unwrap_or_else(|_| "-48.3336".into()).parse()?;
    Ok(Checkout::new(
        PixIdentity::new(key, name, city),
        whatsapp,
        GeoPoint::new(lat, lng),
        ZoneCatalog::default(),
    ))
}

async fn list_zones(State(s): State<AppState>) -> Json<Vec<DeliveryZone>> {
    Json(s.checkout.zones().zones().to_vec())
}

#[derive(Debug, Deserialize)]
struct QuoteRequest {
    zone_id: String,
    destination: Option<GeoPoint>,
}

async fn quote_delivery(
    State(s): State<AppState>,
    Json(r): Json<QuoteRequest>,
) -> Result<Json<FeeQuote>, (StatusCode, String)> {
    s.checkout
        .quote_delivery(&r.zone_id, r.destination)
        .map(Json)
        .map_err(delivery_error)
}

#[derive(Debug, Deserialize)]
struct ChargeRequest {
    amount: Decimal,
    reference: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChargeResponse {
    payload: String,
}

async fn create_pix_charge(
    State(s): State<AppState>,
    Json(r): Json<ChargeRequest>,
) -> Result<Json<ChargeResponse>, (StatusCode, String)> {
    s.checkout
        .pix_charge(r.amount, r.reference.as_deref())
        .map(|payload| Json(ChargeResponse { payload }))
        .map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))
}

#[derive(Debug, Deserialize)]
struct CheckoutRequest {
    items: Vec<CheckoutItem>,
    zone_id: String,
    destination: Option<GeoPoint>,
    reference: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CheckoutItem {
    product_id: String,
    name: String,
    quantity: u32,
    unit_price: Decimal,
    #[serde(default)]
    complements: Vec<CheckoutComplement>,
    note: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CheckoutComplement {
    complement_id: String,
    name: String,
    price: Decimal,
}

async fn run_checkout(
    State(s): State<AppState>,
    Json(r): Json<CheckoutRequest>,
) -> Result<Json<arte_do_sabor::CheckoutSummary>, (StatusCode, String)> {
    let mut cart = Cart::new();
    for item in r.items {
        cart.add_item(CartItem {
            product_id: item.product_id,
            name: item.name,
            quantity: item.quantity,
            unit_price: Money::brl(item.unit_price),
            complements: item
                .complements
                .into_iter()
                .map(|c| ChosenComplement {
                    complement_id: c.complement_id,
                    name: c.name,
                    price: Money::brl(c.price),
                })
                .collect(),
            note: item.note,
        });
    }
    s.checkout
        .summarize(&cart, &r.zone_id, r.destination, r.reference.as_deref())
        .map(Json)
        .map_err(checkout_error)
}

fn delivery_error(e: DeliveryError) -> (StatusCode, String) {
    let status = match e {
        DeliveryError::UnknownZone(_) => StatusCode::NOT_FOUND,
        DeliveryError::MissingCoordinates | DeliveryError::CoordinatesOutOfRange => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
    };
    (status, e.to_string())
}

fn checkout_error(e: CheckoutError) -> (StatusCode, String) {
    match e {
        CheckoutError::Delivery(d) => delivery_error(d),
        CheckoutError::EmptyCart | CheckoutError::Pix(_) => {
            (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
        }
    }
}
