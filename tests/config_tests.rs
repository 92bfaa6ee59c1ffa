//! Configuration loading tests

use deployconf::config::{LogFormat, load_config, load_config_from_str};
use deployconf::{ConfigError, EnvSnapshot};
use std::path::PathBuf;

const FULL_CONFIG: &str = r#"
build_output_directory = "./artifacts"
plugins = ["truffle-contract-size"]

[networks.matic]
chain_id = 137
rpc_endpoint_env = "MATIC_ENDPOINT_FINAL"
secret_env = "MATIC_DEPLOYER_FINAL"
timeout_blocks = 50
skip_dry_run = false
gas_limit = 8000000
gas_price = "250 gwei"

[networks.sepolia]
chain_id = 11155111
rpc_endpoint_env = "SEPOLIA_ENDPOINT"
secret_env = "SEPOLIA_DEPLOYER"
skip_dry_run = true
gas_price = 3000000000

[compiler]
version = "0.8.20"
evm_version = "shanghai"

[compiler.optimizer]
enabled = true
runs = 1000

[test_runner]
enable_timeouts = true
timeout_ms = 60000

[api_keys]
polygonscan = "POLYGONSCAN_API_KEY"

[logging]
level = "debug"
format = "json"
"#;

#[test]
fn test_defaults_without_file() {
    let config = load_config_from_str("").unwrap();

    assert_eq!(config.build_output_directory, PathBuf::from("./build"));
    assert_eq!(config.compiler.version.to_string(), "0.8.14");
    assert!(config.compiler.optimizer.enabled);
    assert_eq!(config.compiler.optimizer.runs, 20000);
    assert!(!config.test_runner.enable_timeouts);
    assert_eq!(config.plugins, vec!["truffle-contract-size"]);
    assert_eq!(config.networks.len(), 2);
}

#[test]
fn test_full_config() {
    let config = load_config_from_str(FULL_CONFIG).unwrap();

    assert_eq!(config.build_output_directory, PathBuf::from("./artifacts"));

    // Overridden network
    let matic = &config.networks["matic"];
    assert_eq!(matic.timeout_blocks, 50);
    assert_eq!(matic.gas_limit, 8_000_000);
    assert_eq!(matic.gas_price.wei(), 250_000_000_000);

    // Added network, integer gas price is wei
    let sepolia = &config.networks["sepolia"];
    assert_eq!(sepolia.chain_id, 11155111);
    assert_eq!(sepolia.gas_price.wei(), 3_000_000_000);
    assert!(sepolia.skip_dry_run);

    // Built-in network still present
    assert_eq!(config.networks["mumbai"].chain_id, 80001);

    // Compiler
    assert_eq!(config.compiler.version.to_string(), "0.8.20");
    assert_eq!(config.compiler.optimizer.runs, 1000);
    assert_eq!(config.compiler.evm_version.as_deref(), Some("shanghai"));

    // Test runner
    assert!(config.test_runner.enable_timeouts);
    assert_eq!(
        config.test_runner.effective_timeout(),
        Some(std::time::Duration::from_secs(60))
    );

    assert_eq!(config.api_keys["polygonscan"], "POLYGONSCAN_API_KEY");
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
fn test_gas_price_units() {
    let config = load_config_from_str("").unwrap();
    assert_eq!(config.networks["matic"].gas_price.wei(), 200 * 1_000_000_000);
    assert_eq!(config.networks["mumbai"].gas_price.wei(), 100 * 1_000_000_000);
}

#[test]
fn test_invalid_gas_price_unit() {
    let toml = r#"
[networks.mumbai]
gas_price = "100 gwie"
"#;
    let err = load_config_from_str(toml).unwrap_err();
    assert!(matches!(err, ConfigError::Load(_)));
    assert!(err.to_string().contains("gwie"));
}

#[test]
fn test_duplicate_chain_id_rejected() {
    let toml = r#"
[networks.polygon-testnet]
chain_id = 80001
rpc_endpoint_env = "TESTNET_ENDPOINT"
secret_env = "TESTNET_DEPLOYER"
gas_price = "1 gwei"
"#;
    let err = load_config_from_str(toml).unwrap_err();
    match err {
        ConfigError::DuplicateChainId {
            chain_id,
            first,
            second,
        } => {
            assert_eq!(chain_id, 80001);
            assert_eq!(first, "mumbai");
            assert_eq!(second, "polygon-testnet");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_private_key_literal_rejected() {
    let toml = r#"
[networks.matic]
secret_env = "0x4c0883a69102937d6231471b5dbb6204fe512961708279f1d7b1b3e0b1d2c3a4"
"#;
    let err = load_config_from_str(toml).unwrap_err();
    assert!(!err.to_string().contains("4c0883a6"));
}

#[test]
fn test_config_file_and_snapshot_overrides() {
    use std::fs;
    use tempfile::tempdir;

    let dir = tempdir().unwrap();
    let config_path = dir.path().join("deployconf.toml");
    fs::write(&config_path, FULL_CONFIG).unwrap();

    let env = EnvSnapshot::from_pairs([
        ("DEPLOYCONF__COMPILER__VERSION", "0.8.21"),
        ("DEPLOYCONF__TEST_RUNNER__ENABLE_TIMEOUTS", "false"),
        ("UNRELATED", "ignored"),
    ]);

    let config = load_config(config_path.to_str(), &env).unwrap();

    assert_eq!(config.compiler.version.to_string(), "0.8.21");
    assert!(!config.test_runner.enable_timeouts);
    // From file
    assert_eq!(config.compiler.optimizer.runs, 1000);
}

#[test]
fn test_config_path_with_tilde_missing() {
    let env = EnvSnapshot::new();
    let result = load_config(Some("~/deployconf-does-not-exist/deployconf.toml"), &env);
    assert!(result.is_err());
}

#[test]
#[serial_test::serial]
fn test_process_environment_overrides() {
    use std::env;
    use std::fs;
    use tempfile::tempdir;

    let dir = tempdir().unwrap();
    let config_path = dir.path().join("deployconf.toml");
    fs::write(&config_path, "[compiler.optimizer]\nruns = 500\n").unwrap();

    unsafe {
        env::set_var("DEPLOYCONF__COMPILER__OPTIMIZER__RUNS", "750");
    }

    let snapshot = EnvSnapshot::from_process();
    let config = load_config(config_path.to_str(), &snapshot).unwrap();
    assert_eq!(config.compiler.optimizer.runs, 750);

    // Changing the process environment after capture has no effect
    unsafe {
        env::set_var("DEPLOYCONF__COMPILER__OPTIMIZER__RUNS", "1");
    }
    let again = load_config(config_path.to_str(), &snapshot).unwrap();
    assert_eq!(again.compiler.optimizer.runs, 750);

    unsafe {
        env::remove_var("DEPLOYCONF__COMPILER__OPTIMIZER__RUNS");
    }
}

#[test]
#[serial_test::serial]
fn test_dotenv_layered_under_process() {
    use std::env;
    use std::fs;
    use tempfile::tempdir;

    let dir = tempdir().unwrap();
    let env_path = dir.path().join(".env");
    fs::write(
        &env_path,
        "DEPLOYCONF_TEST_ONLY_A=from-file\nDEPLOYCONF_TEST_ONLY_B=from-file\n",
    )
    .unwrap();

    unsafe {
        env::set_var("DEPLOYCONF_TEST_ONLY_A", "from-process");
    }

    let snapshot = EnvSnapshot::from_process_with_dotenv(&env_path).unwrap();
    assert_eq!(snapshot.get("DEPLOYCONF_TEST_ONLY_A"), Some("from-process"));
    assert_eq!(snapshot.get("DEPLOYCONF_TEST_ONLY_B"), Some("from-file"));

    // The .env file never leaks into the real process environment
    assert!(env::var("DEPLOYCONF_TEST_ONLY_B").is_err());

    unsafe {
        env::remove_var("DEPLOYCONF_TEST_ONLY_A");
    }
}
