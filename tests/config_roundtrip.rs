// Tests for configuration persistence.
use std::fs;
use uplink::client::Verbosity;
use uplink::config::Config;
use uplink::context::{AppContext, TestContext};

#[test]
fn test_save_and_load_round_trip() {
    let ctx = TestContext::new();
    let config = Config {
        base_url: "https://api.example.com/v2".to_string(),
        allow_insecure_certs: true,
        response_log: Verbosity::NotOk,
        image_cache_capacity: 50,
    };

    config.save(&ctx).unwrap();
    let loaded = Config::load(&ctx).unwrap();

    assert_eq!(loaded.base_url, "https://api.example.com/v2");
    assert!(loaded.allow_insecure_certs);
    assert_eq!(loaded.response_log, Verbosity::NotOk);
    assert_eq!(loaded.image_cache_capacity, 50);
}

#[test]
fn test_missing_config_is_detected() {
    let ctx = TestContext::new();
    let err = Config::load(&ctx).unwrap_err();
    assert!(Config::is_missing_config_error(&err));
}

#[test]
fn test_partial_file_gets_defaults() {
    let ctx = TestContext::new();
    let path = ctx.get_config_file_path().unwrap();
    fs::write(&path, "base_url = \"http://api.example.com\"\n").unwrap();

    let loaded = Config::load(&ctx).unwrap();
    assert_eq!(loaded.base_url, "http://api.example.com");
    assert!(!loaded.allow_insecure_certs);
    assert_eq!(loaded.response_log, Verbosity::None);
    assert_eq!(loaded.image_cache_capacity, 100);
}

#[test]
fn test_unparseable_file_is_not_reported_missing() {
    let ctx = TestContext::new();
    let path = ctx.get_config_file_path().unwrap();
    fs::write(&path, "this is not toml [[[").unwrap();

    let err = Config::load(&ctx).unwrap_err();
    assert!(!Config::is_missing_config_error(&err));
}
