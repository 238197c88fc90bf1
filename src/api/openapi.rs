//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{menu_handler, order_handler, user_handler};
use crate::config::USER_ID_HEADER;
use crate::services::{OrderEvent, OrderEventKind};
use domain::{CancelledBy, MenuItem, Order, OrderItem, OrderStatus, User, UserRole};

/// OpenAPI documentation for the restaurant ordering API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Restaurant Orders API",
        version = "0.1.0",
        description = "Menu, checkout and order lifecycle for a single restaurant",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        // User endpoints
        user_handler::sync_user,
        user_handler::get_current_user,
        // Menu endpoints
        menu_handler::list_menu_items,
        menu_handler::get_menu_item,
        menu_handler::create_menu_item,
        menu_handler::update_menu_item,
        menu_handler::delete_menu_item,
        // Order endpoints
        order_handler::place_order,
        order_handler::list_orders,
        order_handler::list_user_orders,
        order_handler::get_order,
        order_handler::update_order_status,
        order_handler::mark_guest_arrived,
        order_handler::cancel_order,
        order_handler::order_events,
    ),
    components(
        schemas(
            // Domain types
            UserRole,
            User,
            MenuItem,
            Order,
            OrderItem,
            OrderStatus,
            CancelledBy,
            // Events
            OrderEvent,
            OrderEventKind,
            // Request types
            user_handler::SyncUserRequest,
            menu_handler::CreateMenuItemRequest,
            menu_handler::UpdateMenuItemRequest,
            order_handler::OrderItemRequest,
            order_handler::PlaceOrderRequest,
            order_handler::UpdateStatusRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Users", description = "Profile sync for signed-in users"),
        (name = "Menu", description = "Public menu and admin menu management"),
        (name = "Orders", description = "Checkout, order lifecycle and live updates")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for the caller identity header
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "user_id",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    USER_ID_HEADER,
                    "Firebase UID of the signed-in user",
                ))),
            );
        }
    }
}
