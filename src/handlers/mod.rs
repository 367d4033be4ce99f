pub mod admin;
pub mod catalog;
pub mod delivery;
pub mod orders;

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        delivery::quote,
        orders::create_order,
        orders::get_order,
        orders::list_orders,
        orders::order_stats,
        orders::transition_status,
        orders::force_status,
        catalog::list_products,
        catalog::add_product,
        catalog::update_product,
        catalog::delete_product,
        catalog::list_categories,
        catalog::add_category,
        catalog::delete_category,
        admin::login,
    ),
    tags(
        (name = "delivery", description = "Delivery charge quotes"),
        (name = "orders", description = "Checkout, tracking and fulfilment"),
        (name = "catalog", description = "Products and categories"),
        (name = "admin", description = "Admin console"),
    )
)]
pub struct ApiDoc;
