use config_converter::{BatchInput, BatchResult, ConfigConverter, ConversionOptions, Format};

#[test]
fn one_failure_does_not_block_siblings() {
    let converter = ConfigConverter::new();
    let inputs = vec![
        BatchInput::new("service.json", r#"{"name":"api","port":8080}"#),
        BatchInput::new("broken.yaml", "invalid: yaml: content:"),
    ];
    let results = converter.convert_batch(&inputs, Format::Toml, &ConversionOptions::default());
    assert_eq!(results.len(), 2);

    match &results[0] {
        BatchResult::Success {
            original_name,
            new_name,
            content,
        } => {
            assert_eq!(original_name, "service.json");
            assert_eq!(new_name, "service.toml");
            let parsed: toml::Table = toml::from_str(content).expect("valid TOML");
            assert_eq!(parsed.get("port").and_then(|v| v.as_integer()), Some(8080));
        }
        other => panic!("expected success, got {other:?}"),
    }

    match &results[1] {
        BatchResult::Failure {
            original_name,
            error,
        } => {
            assert_eq!(original_name, "broken.yaml");
            assert!(error.starts_with("Failed to parse YAML"), "{error}");
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

#[test]
fn yaml_target_uses_long_extension() {
    let converter = ConfigConverter::new();
    let inputs = vec![BatchInput::new("app.ENV", "APP_NAME=demo")];
    let results = converter.convert_batch(&inputs, Format::Yaml, &ConversionOptions::default());
    match &results[0] {
        BatchResult::Success { new_name, content, .. } => {
            assert_eq!(new_name, "app.yaml");
            assert!(content.contains("name: demo"), "{content}");
        }
        other => panic!("expected success, got {other:?}"),
    }
}

#[test]
fn unknown_extension_is_reported_per_file() {
    let converter = ConfigConverter::new();
    let inputs = vec![
        BatchInput::new("data.csv", "a,b"),
        BatchInput::new("ok.ini", "[s]\nk = v\n"),
    ];
    let results = converter.convert_batch(&inputs, Format::Json, &ConversionOptions::default());
    assert!(!results[0].is_success());
    assert!(results[1].is_success());
    assert_eq!(results[0].original_name(), "data.csv");
    match &results[0] {
        BatchResult::Failure { error, .. } => {
            assert!(error.contains("Unsupported file extension: .csv"), "{error}")
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

#[test]
fn results_follow_input_order() {
    let converter = ConfigConverter::new();
    let inputs: Vec<BatchInput> = (0..32)
        .map(|i| BatchInput::new(format!("f{i}.json"), format!(r#"{{"i":{i}}}"#)))
        .collect();
    let results = converter.convert_batch(&inputs, Format::Env, &ConversionOptions::default());
    for (i, result) in results.iter().enumerate() {
        match result {
            BatchResult::Success { new_name, content, .. } => {
                assert_eq!(new_name, &format!("f{i}.env"));
                assert_eq!(content, &format!("I={i}"));
            }
            other => panic!("expected success, got {other:?}"),
        }
    }
}

#[test]
fn batch_inputs_deserialize_from_camel_case() {
    let inputs: Vec<BatchInput> =
        serde_json::from_str(r#"[{"originalName":"a.json","content":"{}"}]"#).unwrap();
    assert_eq!(inputs, vec![BatchInput::new("a.json", "{}")]);
}
