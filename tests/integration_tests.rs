//! Integration tests for configuration and sessions.
//!
//! These tests exercise the public API the way an app wires it up at startup.

use shopify_app_auth::auth::session_id::{offline_id, online_id, SessionIdMode};
use shopify_app_auth::{
    ApiKey, ApiSecretKey, AuthScopes, ConfigError, HostUrl, OAuthFlow, Session, ShopDomain,
    ShopifyConfig,
};

#[test]
fn test_full_workflow_create_newtypes_build_config_access_fields() {
    let api_key = ApiKey::new("test-api-key").unwrap();
    let api_secret = ApiSecretKey::new("test-api-secret").unwrap();
    let scopes: AuthScopes = "read_products, write_orders".parse().unwrap();
    let host = HostUrl::new("https://myapp.example.com").unwrap();

    let config = ShopifyConfig::builder()
        .api_key(api_key)
        .api_secret_key(api_secret)
        .scopes(scopes)
        .host(host)
        .is_embedded(false)
        .user_agent_prefix("TestApp/1.0")
        .build()
        .unwrap();

    assert_eq!(config.api_key().as_ref(), "test-api-key");
    assert!(!config.is_embedded());
    assert!(!config.is_private_app());
    assert_eq!(config.host().unwrap().as_ref(), "https://myapp.example.com");
    assert_eq!(config.user_agent_prefix(), Some("TestApp/1.0"));

    // write_orders implies read_orders
    assert!(config.scopes().has("read_orders"));
}

#[test]
fn test_multi_tenant_scenario_multiple_independent_configs() {
    let config_a = ShopifyConfig::builder()
        .api_key(ApiKey::new("store-a-key").unwrap())
        .api_secret_key(ApiSecretKey::new("store-a-secret").unwrap())
        .scopes("read_products".parse().unwrap())
        .build()
        .unwrap();

    let config_b = ShopifyConfig::builder()
        .api_key(ApiKey::new("store-b-key").unwrap())
        .api_secret_key(ApiSecretKey::new("store-b-secret").unwrap())
        .scopes("write_orders".parse().unwrap())
        .build()
        .unwrap();

    assert_eq!(config_a.api_key().as_ref(), "store-a-key");
    assert_eq!(config_b.api_key().as_ref(), "store-b-key");

    assert!(config_a.scopes().has("read_products"));
    assert!(!config_a.scopes().has("write_orders"));

    assert!(config_b.scopes().has("write_orders"));
    assert!(config_b.scopes().has("read_orders"));
}

#[test]
fn test_error_handling_invalid_inputs_produce_correct_errors() {
    assert!(matches!(ApiKey::new(""), Err(ConfigError::EmptyApiKey)));
    assert!(matches!(
        ApiSecretKey::new(""),
        Err(ConfigError::EmptyApiSecretKey)
    ));
    assert!(matches!(
        ShopDomain::new("invalid domain with spaces"),
        Err(ConfigError::InvalidShopDomain { .. })
    ));
    assert!(matches!(
        HostUrl::new("not-a-valid-url"),
        Err(ConfigError::InvalidHostUrl { .. })
    ));

    let result = ShopifyConfig::builder()
        .api_key(ApiKey::new("key").unwrap())
        .build();
    assert!(matches!(
        result,
        Err(ConfigError::MissingRequiredField {
            field: "api_secret_key"
        })
    ));
}

#[test]
fn test_config_can_be_cloned_and_shared() {
    let config = ShopifyConfig::builder()
        .api_key(ApiKey::new("key").unwrap())
        .api_secret_key(ApiSecretKey::new("secret").unwrap())
        .build()
        .unwrap();

    let config_clone = config.clone();
    assert_eq!(config.api_key().as_ref(), config_clone.api_key().as_ref());

    let handle = std::thread::spawn(move || {
        let _ = config_clone.api_key().as_ref();
    });
    handle.join().unwrap();
}

#[test]
fn test_secret_keys_yield_primary_before_old() {
    let config = ShopifyConfig::builder()
        .api_key(ApiKey::new("key").unwrap())
        .api_secret_key(ApiSecretKey::new("new-secret").unwrap())
        .old_api_secret_key(ApiSecretKey::new("old-secret").unwrap())
        .build()
        .unwrap();

    let keys: Vec<&str> = config.secret_keys().map(AsRef::as_ref).collect();
    assert_eq!(keys, vec!["new-secret", "old-secret"]);
}

#[test]
fn test_flow_from_config_is_shareable_across_threads() {
    let config = ShopifyConfig::builder()
        .api_key(ApiKey::new("key").unwrap())
        .api_secret_key(ApiSecretKey::new("secret").unwrap())
        .host(HostUrl::new("https://myapp.example.com").unwrap())
        .build()
        .unwrap();
    let flow = std::sync::Arc::new(OAuthFlow::from_config(config).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let flow = std::sync::Arc::clone(&flow);
            std::thread::spawn(move || {
                flow.begin("shop1.myshopify.io", "/auth/callback", false)
                    .unwrap()
                    .location
            })
        })
        .collect();

    let locations: std::collections::HashSet<String> =
        handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(locations.len(), 4, "each begin issues a fresh state");
}

#[test]
fn test_session_ids_match_stored_sessions() {
    let shop = ShopDomain::new("shop1.myshopify.io").unwrap();
    let session = Session::offline(
        offline_id(shop.as_ref()).unwrap(),
        shop.clone(),
        "state",
        "token",
        "read_products".parse().unwrap(),
    );

    assert_eq!(session.id(), "offline_shop1.myshopify.io");
    assert_eq!(
        online_id(shop.as_ref(), 42, SessionIdMode::Embedded).unwrap(),
        "shop1.myshopify.io_42"
    );
}

#[test]
fn test_session_survives_storage_round_trip() {
    let session = Session::offline(
        "offline_shop1.myshopify.io",
        ShopDomain::new("shop1").unwrap(),
        "state",
        "token",
        "read_products,write_orders".parse().unwrap(),
    );

    let stored = serde_json::to_value(&session).unwrap();
    assert_eq!(stored["shop"], "shop1.myshopify.com");
    assert_eq!(stored["is_online"], false);

    let restored: Session = serde_json::from_value(stored).unwrap();
    assert_eq!(restored, session);
    assert!(!restored.is_scope_changed(&"read_products,write_orders".parse().unwrap()));
    assert!(restored.is_scope_changed(&"write_customers".parse().unwrap()));
}
