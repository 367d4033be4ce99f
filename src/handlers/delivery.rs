use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::delivery::DeliveryQuote;
use crate::AppState;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct QuoteParams {
    /// 6-digit delivery pincode.
    pub pincode: String,
    /// Cart subtotal in whole rupees. Defaults to 0.
    #[serde(default)]
    pub subtotal: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeliveryQuoteResponse {
    pub charge: i64,
    pub label: String,
    pub valid: bool,
    /// FREE, LOCAL, REGIONAL or NATIONAL; absent when the pincode is invalid.
    pub tier: Option<String>,
    pub transit_time: String,
}

impl DeliveryQuoteResponse {
    pub fn new(quote: DeliveryQuote, transit_time: &str) -> Self {
        Self {
            charge: quote.charge,
            label: quote.label,
            valid: quote.valid,
            tier: quote.tier.map(|t| t.to_string()),
            transit_time: transit_time.to_string(),
        }
    }
}

/// GET /delivery/quote
///
/// Prices delivery for a pincode and cart subtotal. An invalid pincode is
/// not an error here: the quote comes back with `valid: false` and checkout
/// must not proceed.
#[utoipa::path(
    get,
    path = "/delivery/quote",
    params(QuoteParams),
    responses(
        (status = 200, description = "Delivery quote", body = DeliveryQuoteResponse),
    ),
    tag = "delivery"
)]
pub async fn quote(state: web::Data<AppState>, query: web::Query<QuoteParams>) -> HttpResponse {
    let params = query.into_inner();
    let quote = state.delivery.calculate(&params.pincode, params.subtotal);
    let transit = state.delivery.estimate_transit_time(&params.pincode);
    HttpResponse::Ok().json(DeliveryQuoteResponse::new(quote, transit))
}
