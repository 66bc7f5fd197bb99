use pretty_assertions::assert_eq;
use privbin_client::{ClientConfig, ClientError};
use privbin_crypto::envelope::MAX_ITERATIONS;

#[test]
fn defaults_are_valid() {
    let config = ClientConfig::default();
    config.validate().unwrap();
    assert_eq!(config.default_expiration, "1week");
    assert_eq!(config.default_formatter, "plaintext");
    assert_eq!(config.pbkdf2_iterations, 10_000);
}

#[test]
fn for_base_url_keeps_defaults() {
    let config = ClientConfig::for_base_url("http://localhost:8080/paste/");
    assert_eq!(config.base_url, "http://localhost:8080/paste/");
    assert_eq!(config.request_timeout_secs, ClientConfig::default().request_timeout_secs);
    assert_eq!(config.parsed_base_url().unwrap().path(), "/paste/");
}

#[test]
fn rejects_bad_values() {
    let bad = [
        ClientConfig::for_base_url("not a url"),
        ClientConfig::for_base_url("ftp://paste.example.org/"),
        ClientConfig {
            request_timeout_secs: 0,
            ..ClientConfig::default()
        },
        ClientConfig {
            pbkdf2_iterations: 0,
            ..ClientConfig::default()
        },
        ClientConfig {
            pbkdf2_iterations: MAX_ITERATIONS + 1,
            ..ClientConfig::default()
        },
    ];
    for config in bad {
        assert!(
            matches!(config.validate(), Err(ClientError::Config(_))),
            "{config:?} should be rejected"
        );
        assert!(config.parsed_base_url().is_err());
    }
}

#[test]
fn partial_json_fills_defaults() {
    let config: ClientConfig =
        serde_json::from_str(r#"{"base_url": "https://bin.example.net/", "default_expiration": "1day"}"#)
            .unwrap();
    assert_eq!(config.base_url, "https://bin.example.net/");
    assert_eq!(config.default_expiration, "1day");
    assert_eq!(config.default_formatter, "plaintext");
}

#[test]
fn json_round_trip() {
    let config = ClientConfig::for_base_url("https://bin.example.net/");
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(serde_json::from_str::<ClientConfig>(&json).unwrap(), config);
}
