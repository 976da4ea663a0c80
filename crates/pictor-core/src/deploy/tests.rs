use super::*;

const PYTHON_WORKER: &str = r#"
services:
  - type: worker
    name: bot
    env: python
    buildCommand: pip install -r requirements.txt
    startCommand: python bot.py
    envVars:
      - key: TELEGRAM_BOT_TOKEN
        fromSecret: true
      - key: GOOGLE_API_KEY
        fromSecret: true
      - key: PYTHON_VERSION
        value: "3.11"
"#;

fn violations(findings: &[Finding]) -> Vec<Violation> {
    findings.iter().map(|f| f.violation.clone()).collect()
}

fn python_profile() -> WorkerProfile {
    WorkerProfile::telegram_bot(Runtime::Python)
}

#[test]
fn test_parse_python_worker() {
    let d = Descriptor::from_yaml(PYTHON_WORKER).unwrap();
    assert_eq!(d.services.len(), 1);
    let svc = &d.services[0];
    assert_eq!(svc.service_type, ServiceType::Worker);
    assert_eq!(svc.env, Runtime::Python);
    assert_eq!(svc.build_command, "pip install -r requirements.txt");
    assert_eq!(svc.start_command, "python bot.py");
    assert!(svc.env_var("TELEGRAM_BOT_TOKEN").unwrap().is_secret());
    assert_eq!(
        svc.env_var("PYTHON_VERSION").unwrap().literal_value(),
        Some("3.11")
    );
    assert!(d.check_worker(&python_profile()).is_empty());
}

#[test]
fn test_unquoted_version_is_read_as_text() {
    let yaml = PYTHON_WORKER.replace("value: \"3.11\"", "value: 3.11");
    let d = Descriptor::from_yaml(&yaml).unwrap();
    let pin = d.services[0].env_var("PYTHON_VERSION").unwrap();
    assert_eq!(pin.value.as_deref(), Some("3.11"));
    assert!(pin.unquoted_float);
}

#[test]
fn test_unquoted_float_version_pin_is_flagged() {
    let yaml = PYTHON_WORKER.replace("value: \"3.11\"", "value: 3.10");
    let d = Descriptor::from_yaml(&yaml).unwrap();
    assert_eq!(
        violations(&d.check_worker(&python_profile())),
        vec![Violation::UnquotedVersionPin {
            key: "PYTHON_VERSION".into(),
            value: "3.1".into()
        }]
    );
}

#[test]
fn test_quoted_and_integer_pins_are_not_flagged() {
    let quoted = Descriptor::from_yaml(PYTHON_WORKER).unwrap();
    assert!(!quoted.services[0].env_var("PYTHON_VERSION").unwrap().unquoted_float);

    let yaml = PYTHON_WORKER.replace("value: \"3.11\"", "value: 3");
    let integer = Descriptor::from_yaml(&yaml).unwrap();
    assert!(!integer.services[0].env_var("PYTHON_VERSION").unwrap().unquoted_float);
    assert!(integer.check_worker(&python_profile()).is_empty());
}

#[test]
fn test_secret_with_inline_value_is_parse_error() {
    let yaml = r#"
services:
  - type: worker
    name: bot
    env: python
    buildCommand: pip install -r requirements.txt
    startCommand: python bot.py
    envVars:
      - key: TELEGRAM_BOT_TOKEN
        fromSecret: true
        value: "123:leaked"
"#;
    let err = Descriptor::from_yaml(yaml).unwrap_err();
    assert!(
        matches!(err, PictorError::Descriptor(ref m) if m.contains("TELEGRAM_BOT_TOKEN")),
        "{err}"
    );
}

#[test]
fn test_env_var_without_source_is_parse_error() {
    let yaml = PYTHON_WORKER.replace("        value: \"3.11\"\n", "");
    let err = Descriptor::from_yaml(&yaml).unwrap_err();
    assert!(
        matches!(err, PictorError::Descriptor(ref m) if m.contains("neither fromSecret nor value")),
        "{err}"
    );
}

#[test]
fn test_explicit_from_secret_false_with_value_parses() {
    let yaml = PYTHON_WORKER.replace(
        "value: \"3.11\"",
        "fromSecret: false\n        value: \"3.11\"",
    );
    let d = Descriptor::from_yaml(&yaml).unwrap();
    assert_eq!(
        d.services[0].env_var("PYTHON_VERSION").unwrap().literal_value(),
        Some("3.11")
    );
}

#[test]
fn test_missing_services_key_is_error() {
    let err = Descriptor::from_yaml("databases: []").unwrap_err();
    assert!(matches!(err, PictorError::Descriptor(_)));
}

#[test]
fn test_malformed_yaml_is_error() {
    let err = Descriptor::from_yaml("services: [ {type: worker").unwrap_err();
    assert!(matches!(err, PictorError::Descriptor(_)));
}

#[test]
fn test_non_scalar_value_is_error() {
    let yaml = PYTHON_WORKER.replace("value: \"3.11\"", "value: [3, 11]");
    assert!(Descriptor::from_yaml(&yaml).is_err());
}

#[test]
fn test_unknown_enums_are_preserved_and_reported() {
    let yaml = PYTHON_WORKER
        .replace("type: worker", "type: daemon")
        .replace("env: python", "env: cobol");
    let d = Descriptor::from_yaml(&yaml).unwrap();
    let svc = &d.services[0];
    assert_eq!(svc.service_type, ServiceType::Other("daemon".into()));
    assert_eq!(svc.env.as_str(), "cobol");
    let v = svc.validate();
    assert!(v.contains(&Violation::UnknownServiceType("daemon".into())));
    assert!(v.contains(&Violation::UnknownRuntime("cobol".into())));

    let out = d.to_yaml().unwrap();
    assert!(out.contains("type: daemon"));
    assert!(out.contains("env: cobol"));
}

#[test]
fn test_duplicate_keys_reported() {
    let mut svc = ServiceSpec::telegram_worker();
    svc.env_vars.push(EnvVarSpec::secret("GOOGLE_API_KEY"));
    assert_eq!(
        svc.validate(),
        vec![Violation::DuplicateEnvKey("GOOGLE_API_KEY".into())]
    );
}

#[test]
fn test_inline_secret_and_missing_value_reported() {
    let mut svc = ServiceSpec::telegram_worker();
    svc.env_vars[0].value = Some("123:leaked".into());
    svc.env_vars.push(EnvVarSpec {
        key: "EMPTY".into(),
        from_secret: false,
        value: None,
        unquoted_float: false,
    });
    let v = svc.validate();
    assert!(v.contains(&Violation::InlineSecret("TELEGRAM_BOT_TOKEN".into())));
    assert!(v.contains(&Violation::MissingValue("EMPTY".into())));
}

#[test]
fn test_empty_fields_reported() {
    let mut svc = ServiceSpec::telegram_worker();
    svc.name = " ".into();
    svc.build_command.clear();
    svc.start_command.clear();
    svc.env_vars.push(EnvVarSpec::literal("", "x"));
    let v = svc.validate();
    assert!(v.contains(&Violation::EmptyName));
    assert!(v.contains(&Violation::EmptyCommand("buildCommand")));
    assert!(v.contains(&Violation::EmptyCommand("startCommand")));
    assert!(v.contains(&Violation::EmptyEnvKey));
}

#[test]
fn test_check_worker_service_count() {
    let empty = Descriptor { services: vec![] };
    assert_eq!(
        violations(&empty.check_worker(&python_profile())),
        vec![Violation::ServiceCount(0)]
    );

    let two = Descriptor {
        services: vec![ServiceSpec::telegram_worker(), ServiceSpec::pictor_worker()],
    };
    assert!(violations(&two.check_worker(&python_profile()))
        .contains(&Violation::ServiceCount(2)));
}

#[test]
fn test_check_worker_wrong_type_and_runtime() {
    let mut svc = ServiceSpec::telegram_worker();
    svc.service_type = ServiceType::Web;
    svc.env = Runtime::Node;
    let v = violations(&Descriptor::single(svc).check_worker(&python_profile()));
    assert!(v.contains(&Violation::WrongServiceType {
        expected: "worker".into(),
        found: "web".into()
    }));
    assert!(v.contains(&Violation::WrongRuntime {
        expected: "python".into(),
        found: "node".into()
    }));
}

#[test]
fn test_check_worker_key_set() {
    let mut svc = ServiceSpec::telegram_worker();
    svc.env_vars.retain(|v| v.key != "GOOGLE_API_KEY");
    svc.env_vars.push(EnvVarSpec::literal("DEBUG", "1"));
    let v = violations(&Descriptor::single(svc).check_worker(&python_profile()));
    assert!(v.contains(&Violation::MissingEnvVar("GOOGLE_API_KEY".into())));
    assert!(v.contains(&Violation::UnexpectedEnvVar("DEBUG".into())));
}

#[test]
fn test_check_worker_secret_given_as_literal() {
    let mut svc = ServiceSpec::telegram_worker();
    svc.env_vars[1] = EnvVarSpec::literal("GOOGLE_API_KEY", "AIza-oops");
    let v = violations(&Descriptor::single(svc).check_worker(&python_profile()));
    assert_eq!(v, vec![Violation::NotSecret("GOOGLE_API_KEY".into())]);
}

#[test]
fn test_check_worker_bad_version_pin() {
    let mut svc = ServiceSpec::telegram_worker();
    svc.env_vars[2] = EnvVarSpec::literal("PYTHON_VERSION", "latest");
    let v = violations(&Descriptor::single(svc.clone()).check_worker(&python_profile()));
    assert_eq!(
        v,
        vec![Violation::BadVersionPin {
            key: "PYTHON_VERSION".into(),
            value: Some("latest".into())
        }]
    );

    svc.env_vars[2] = EnvVarSpec::secret("PYTHON_VERSION");
    let v = violations(&Descriptor::single(svc).check_worker(&python_profile()));
    assert_eq!(
        v,
        vec![Violation::BadVersionPin {
            key: "PYTHON_VERSION".into(),
            value: None
        }]
    );
}

#[test]
fn test_version_literal_pattern() {
    assert!(is_version_literal("3"));
    assert!(is_version_literal("3.11"));
    assert!(is_version_literal("3.11.9"));
    assert!(!is_version_literal(""));
    assert!(!is_version_literal("3."));
    assert!(!is_version_literal("3.11.9.1"));
    assert!(!is_version_literal("v3.11"));
    assert!(!is_version_literal("3.x"));
}

#[test]
fn test_emit_uses_platform_keys() {
    let yaml = Descriptor::single(ServiceSpec::telegram_worker())
        .to_yaml()
        .unwrap();
    assert!(yaml.contains("buildCommand: pip install -r requirements.txt"));
    assert!(yaml.contains("startCommand: python bot.py"));
    assert!(yaml.contains("envVars:"));
    assert!(yaml.contains("fromSecret: true"));
    assert!(yaml.contains("type: worker"));
    assert!(!yaml.contains("from_secret"));
    // Literal vars carry no fromSecret key, secrets carry no value key.
    assert_eq!(yaml.matches("fromSecret").count(), 2);
    assert_eq!(yaml.matches("value:").count(), 1);
}

#[test]
fn test_emitted_descriptor_parses_back_equal() {
    let original = Descriptor::single(ServiceSpec::pictor_worker());
    let parsed = Descriptor::from_yaml(&original.to_yaml().unwrap()).unwrap();
    assert_eq!(parsed, original);
}

#[test]
fn test_rust_profile_pins_rust_version() {
    let profile = WorkerProfile::telegram_bot(Runtime::Rust);
    assert_eq!(profile.version_pin.as_deref(), Some("RUST_VERSION"));
    let d = Descriptor::single(ServiceSpec::pictor_worker());
    assert!(d.check_worker(&profile).is_empty());

    let mut unpinned = ServiceSpec::pictor_worker();
    unpinned.env_vars.retain(|v| v.key != "RUST_VERSION");
    assert_eq!(
        violations(&Descriptor::single(unpinned).check_worker(&profile)),
        vec![Violation::MissingEnvVar("RUST_VERSION".into())]
    );
}

#[test]
fn test_finding_display() {
    let f = Finding {
        service: Some("bot".into()),
        violation: Violation::NotSecret("GOOGLE_API_KEY".into()),
    };
    assert_eq!(
        f.to_string(),
        "service 'bot': env var 'GOOGLE_API_KEY' must be secret-sourced"
    );
    let f = Finding {
        service: None,
        violation: Violation::ServiceCount(0),
    };
    assert_eq!(f.to_string(), "expected exactly one service, found 0");
}

#[test]
fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("render.yaml");
    std::fs::write(&path, PYTHON_WORKER).unwrap();
    let d = Descriptor::load(&path).unwrap();
    assert_eq!(d.service("bot").unwrap().env, Runtime::Python);
    assert!(Descriptor::load(dir.path().join("missing.yaml")).is_err());
}
