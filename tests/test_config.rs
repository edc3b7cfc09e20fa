use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use staticd::config::Config;

fn args(list: &[&str]) -> Vec<String> {
    std::iter::once("staticd")
        .chain(list.iter().copied())
        .map(String::from)
        .collect()
}

#[test]
fn test_config_defaults() {
    let cfg = Config::default();

    assert_eq!(cfg.bind_addr, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
    assert_eq!(cfg.root_dir, "www");
    assert_eq!(cfg.idle_timeout(), Duration::from_secs(1));
    assert_eq!(cfg.max_requests, 200);
    assert_eq!(cfg.keep_alive_timeout, 1);
    assert_eq!(cfg.keep_alive_max, 200);
    assert_eq!(cfg.log_level(), tracing::Level::INFO);
}

#[test]
fn test_config_port_from_args() {
    let cfg = Config::from_args(args(&["8080"])).unwrap();
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.root_dir, "www");
}

#[test]
fn test_config_wrong_argument_count() {
    assert!(Config::from_args(args(&[])).is_err());
    assert!(Config::from_args(args(&["80", "a.yaml", "extra"])).is_err());
}

#[test]
fn test_config_port_must_be_a_number() {
    let err = Config::from_args(args(&["http"])).unwrap_err();
    assert!(format!("{err:#}").contains("port must be a number"));

    assert!(Config::from_args(args(&["70000"])).is_err());
}

#[test]
fn test_config_from_yaml_overrides() {
    let cfg = Config::from_yaml(
        "root_dir: public\nbind_addr: 127.0.0.1\nidle_timeout_ms: 250\nmax_requests: 3\nlog_level: debug\n",
    )
    .unwrap();

    assert_eq!(cfg.root_dir, "public");
    assert_eq!(cfg.bind_addr, IpAddr::V4(Ipv4Addr::LOCALHOST));
    assert_eq!(cfg.idle_timeout(), Duration::from_millis(250));
    assert_eq!(cfg.max_requests, 3);
    assert_eq!(cfg.log_level(), tracing::Level::DEBUG);
    // untouched fields keep their defaults
    assert_eq!(cfg.keep_alive_max, 200);
    assert_eq!(cfg.server_name, "staticd");
}

#[test]
fn test_config_empty_yaml_is_default() {
    let cfg = Config::from_yaml("").unwrap();
    assert_eq!(cfg.root_dir, "www");
}

#[test]
fn test_config_rejects_zero_max_requests() {
    assert!(Config::from_yaml("max_requests: 0\n").is_err());
}

#[test]
fn test_config_file_argument() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("staticd.yaml");
    std::fs::write(&path, "root_dir: site\nkeep_alive_max: 50\n").unwrap();

    let cfg = Config::from_args(args(&["9000", path.to_str().unwrap()])).unwrap();
    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.root_dir, "site");
    assert_eq!(cfg.keep_alive_max, 50);
}

#[test]
fn test_config_missing_file_is_an_error() {
    assert!(Config::from_args(args(&["9000", "/nonexistent/staticd.yaml"])).is_err());
}
