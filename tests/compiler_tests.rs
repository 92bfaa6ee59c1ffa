//! Compiler settings tests

use deployconf::CompilerInvocation;
use deployconf::config::load_config_from_str;
use serde_json::json;
use std::collections::BTreeMap;

#[test]
fn test_version_and_runs_pass_through_unmodified() {
    let config = load_config_from_str("").unwrap();
    let invocation = CompilerInvocation::from_config(&config);

    assert_eq!(invocation.version, "0.8.14");
    assert_eq!(
        invocation.settings["optimizer"],
        json!({ "enabled": true, "runs": 20000 })
    );
}

#[test]
fn test_configured_values_pass_through() {
    let toml = r#"
build_output_directory = "./out"

[compiler]
version = "0.8.19"
evm_version = "paris"

[compiler.optimizer]
enabled = false
runs = 1
"#;
    let config = load_config_from_str(toml).unwrap();
    let invocation = CompilerInvocation::from_config(&config);

    assert_eq!(invocation.version, "0.8.19");
    assert_eq!(invocation.output_directory.to_str(), Some("./out"));
    assert_eq!(
        invocation.settings["optimizer"],
        json!({ "enabled": false, "runs": 1 })
    );
    assert_eq!(invocation.settings["evmVersion"], json!("paris"));
}

#[test]
fn test_standard_json_input_serializes() {
    let config = load_config_from_str("").unwrap();
    let invocation = CompilerInvocation::from_config(&config);

    let sources = BTreeMap::from([
        ("contracts/A.sol".to_string(), "contract A {}".to_string()),
        ("contracts/B.sol".to_string(), "contract B {}".to_string()),
    ]);
    let input = invocation.standard_json_input(&sources);

    let text = serde_json::to_string(&input).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed["sources"].as_object().unwrap().len(), 2);
    assert_eq!(parsed["settings"]["optimizer"]["runs"], json!(20000));
}
