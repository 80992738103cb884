//! Route registration.
//!
//! The single place the route table is assembled. Registration order
//! matters: it is the tie-break order of the matcher.

use crate::http::dispatch::{AuthPolicy, Route};
use crate::http::{client_errors, content, translations};
use crate::routing::RouteTable;

pub fn route_table() -> RouteTable<Route> {
    let mut table = RouteTable::new();

    table.register("/api/v1/init", Route::new(AuthPolicy::Public, content::init));
    table.register(
        "/api/v1/mobile-init",
        Route::new(AuthPolicy::Public, content::mobile_init),
    );

    table.register(
        "/get-cards-set/:language",
        Route::new(AuthPolicy::ClientKey, content::cards_set),
    );
    table.register(
        "/get-card-by-id/:language/:id",
        Route::new(AuthPolicy::ClientKey, content::card_by_id),
    );
    table.register(
        "/get-random-card/:language",
        Route::new(AuthPolicy::ClientKey, content::random_card),
    );
    table.register(
        "/get-all-pages/:language",
        Route::new(AuthPolicy::ClientKey, content::pages),
    );

    table.register(
        "/api/v1/client-errors",
        Route::new(AuthPolicy::ClientKey, client_errors::report),
    );

    table.register("/login", Route::new(AuthPolicy::Public, translations::login));
    table.register(
        "/api/v1/translations/status",
        Route::new(AuthPolicy::Session, translations::status),
    );
    table.register(
        "/api/v1/translations/get",
        Route::new(AuthPolicy::Session, translations::get_translations),
    );
    table.register(
        "/api/v1/translations/update",
        Route::new(AuthPolicy::SessionOrAutomation, translations::update),
    );
    table.register(
        "/api/v1/translations/import/:language",
        Route::new(AuthPolicy::Automation, translations::import),
    );
    table.register(
        "/api/v1/translations/upsert-user",
        Route::new(AuthPolicy::Automation, translations::upsert_user),
    );
    table.register(
        "/api/v1/translations/ws",
        Route::new(AuthPolicy::Session, translations::websocket),
    );

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_populated() {
        let table = route_table();
        assert!(!table.is_empty());
    }

    #[test]
    fn test_literal_routes_resolve_exactly() {
        let table = route_table();
        let (route, params) = table.lookup("/api/v1/translations/get").unwrap();
        assert_eq!(route.auth, AuthPolicy::Session);
        assert!(params.is_empty());
    }

    #[test]
    fn test_capture_routes_bind_params() {
        let table = route_table();
        let (route, params) = table.lookup("/get-card-by-id/en/the-fool").unwrap();
        assert_eq!(route.auth, AuthPolicy::ClientKey);
        assert_eq!(params.get("language").map(String::as_str), Some("en"));
        assert_eq!(params.get("id").map(String::as_str), Some("the-fool"));
    }

    #[test]
    fn test_import_is_automation_gated() {
        let table = route_table();
        let (route, params) = table.lookup("/api/v1/translations/import/en").unwrap();
        assert_eq!(route.auth, AuthPolicy::Automation);
        assert_eq!(params.get("language").map(String::as_str), Some("en"));
    }
}
