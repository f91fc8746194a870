//! Engine configuration loading.

use std::collections::HashMap;

use bpmn_meta::config::{
    ConfigError, ENV_DEPLOYMENT_ID, ENV_FORM_SUFFIX, ENV_SERVICE_MODE, EngineConfig,
};
use bpmn_meta::host::{Bpmn2DataService, ProcessDataService};
use bpmn_meta::provider::ServiceMode;
use rstest::rstest;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn test_defaults() {
    let config = EngineConfig::default();
    assert_eq!(config.service_mode, ServiceMode::New);
    assert_eq!(config.deployment_id, "default");
    assert_eq!(config.form_suffix, "-taskform");
    assert_eq!(EngineConfig::from_lookup(lookup(&[])).unwrap(), config);
}

#[test]
fn test_lookup_overrides() {
    let config = EngineConfig::from_lookup(lookup(&[
        (ENV_SERVICE_MODE, "Singleton"),
        (ENV_DEPLOYMENT_ID, "hr-kjar"),
        (ENV_FORM_SUFFIX, ".frm"),
    ]))
    .unwrap();
    assert_eq!(config.service_mode, ServiceMode::Singleton);
    assert_eq!(config.deployment_id, "hr-kjar");
    assert_eq!(config.form_suffix, ".frm");
}

#[test]
fn test_unknown_mode_falls_back_to_new() {
    let config = EngineConfig::from_lookup(lookup(&[(ENV_SERVICE_MODE, "pooled")])).unwrap();
    assert_eq!(config.service_mode, ServiceMode::New);
}

#[rstest]
#[case(ENV_DEPLOYMENT_ID, "  ")]
#[case(ENV_FORM_SUFFIX, "")]
fn test_empty_values_are_rejected(#[case] key: &str, #[case] value: &str) {
    let err = EngineConfig::from_lookup(lookup(&[(key, value)])).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { key: k, .. } if k == key));
}

#[test]
fn test_form_suffix_reaches_service() {
    let config = EngineConfig::from_lookup(lookup(&[(ENV_FORM_SUFFIX, ".frm")])).unwrap();
    let service = ProcessDataService::from_config(&config);
    service
        .deploy("kb", r#"<process id="p"><userTask id="t" name="Sign"/></process>"#)
        .unwrap();
    assert_eq!(service.associated_forms("p"), vec!["Sign.frm"]);
}

#[cfg(feature = "interchange")]
mod yaml {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "service_mode: NONE\ndeployment_id: hr-kjar").unwrap();

        let config = EngineConfig::from_yaml_file(file.path()).unwrap();
        assert_eq!(config.service_mode, ServiceMode::None);
        assert_eq!(config.deployment_id, "hr-kjar");
        assert_eq!(config.form_suffix, "-taskform");
    }

    #[test]
    fn test_yaml_rejects_unknown_mode() {
        assert!(matches!(
            EngineConfig::from_yaml_str("service_mode: pooled"),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = EngineConfig::from_yaml_file(dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
