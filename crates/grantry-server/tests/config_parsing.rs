use std::{env, fs, time::Duration};

use grantry_server::config::loader::load_config;

#[test]
fn config_parsing_and_env_overrides_and_validation() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("grantry.toml");

    let toml_content = r#"
[server]
host = "127.0.0.1"
port = 8081

[logging]
level = "debug"

[auth.oauth]
authorization_code_lifetime = "5m"
access_token_lifetime = "90s"
implicit_owner_approval = true

[auth.registration]
allowed_description_tags = ["b", "p"]
"#;
    fs::write(&path, toml_content).expect("write toml");

    // 1) Valid config parses
    let cfg = load_config(path.to_str()).expect("should parse config");
    assert_eq!(cfg.server.port, 8081);
    assert_eq!(cfg.logging.level, "debug");
    assert_eq!(
        cfg.auth.oauth.authorization_code_lifetime,
        Duration::from_secs(300)
    );
    assert_eq!(cfg.auth.oauth.access_token_lifetime, Duration::from_secs(90));
    assert!(cfg.auth.oauth.implicit_owner_approval);
    assert_eq!(cfg.auth.registration.allowed_description_tags, ["b", "p"]);
    // Unset values keep their defaults
    assert_eq!(cfg.auth.oauth.reap_interval, Duration::from_secs(30));

    // 2) Env override should win over file
    unsafe {
        env::set_var("GRANTRY__SERVER__PORT", "9090");
        env::set_var("GRANTRY__AUTH__OAUTH__ACCESS_TOKEN_LIFETIME", "2m");
    }
    let cfg_env = load_config(path.to_str()).expect("should parse config with env overrides");
    assert_eq!(cfg_env.server.port, 9090);
    assert_eq!(
        cfg_env.auth.oauth.access_token_lifetime,
        Duration::from_secs(120)
    );
    unsafe {
        env::remove_var("GRANTRY__SERVER__PORT");
        env::remove_var("GRANTRY__AUTH__OAUTH__ACCESS_TOKEN_LIFETIME");
    }

    // 3) Invalid values are rejected
    let bad_path = dir.path().join("bad.toml");
    fs::write(
        &bad_path,
        r#"
[logging]
level = "chatty"
"#,
    )
    .expect("write bad toml");
    let err = load_config(bad_path.to_str()).unwrap_err();
    assert!(err.contains("logging.level"), "{err}");

    let zero_path = dir.path().join("zero.toml");
    fs::write(
        &zero_path,
        r#"
[auth.oauth]
access_token_lifetime = "0s"
"#,
    )
    .expect("write zero toml");
    assert!(load_config(zero_path.to_str()).is_err());

    // 4) Missing file falls back to defaults
    let missing = dir.path().join("absent.toml");
    let cfg_default = load_config(missing.to_str()).expect("defaults");
    assert_eq!(cfg_default.server.port, 8080);
    assert!(!cfg_default.auth.oauth.implicit_owner_approval);
}
