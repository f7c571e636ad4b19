use cuelane_core::{ChannelRef, CuelaneConfig, DispatchTable, Engine};

#[test]
fn toml_config_populates_every_section() {
    let temp = tempfile::tempdir().expect("tempdir should be creatable");
    let path = temp.path().join("cuelane.config.toml");
    std::fs::write(
        &path,
        r#"
discrete = [
    { track = 5, channel = 1 },
    { track = 4, channel = 0 },
]

[shake]
duration = 4.0
step_min = 0.2
step_max = 0.4
seed = 42

[sampling]
fps = 30.0

[diagnostics]
trace_file_prefix = "cuelane-test"
"#,
    )
    .expect("writing config should work");

    let config = CuelaneConfig::load_from(&path).expect("config should parse");

    assert_eq!(config.shake.duration, 4.0);
    assert_eq!(config.shake.seed, Some(42));
    assert_eq!(config.shake.range, 6.0, "unset keys keep defaults");
    assert_eq!(config.sampling.fps, 30.0);
    assert_eq!(config.diagnostics.trace_file_prefix, "cuelane-test");
    assert!(config.discrete.contains(4, 0));
    assert!(config.discrete.contains(5, 1));
    assert_eq!(
        config.discrete.iter().collect::<Vec<_>>(),
        vec![ChannelRef::new(4, 0), ChannelRef::new(5, 1)]
    );
}

#[test]
fn malformed_config_reports_an_error() {
    let temp = tempfile::tempdir().expect("tempdir should be creatable");
    let path = temp.path().join("cuelane.config.toml");
    std::fs::write(&path, "[shake]\nduration = \"long\"\n").expect("writing config should work");

    let err = CuelaneConfig::load_from(&path).expect_err("bad config should fail");
    assert!(format!("{err:#}").contains("failed to parse config TOML"));
}

#[test]
fn engine_builds_from_config() {
    let mut config = CuelaneConfig::default();
    config.shake.seed = Some(1);
    config.discrete = [ChannelRef::new(0, 1)].into_iter().collect();

    let mut engine = Engine::from_config(DispatchTable::with_shape([2]), &config)
        .expect("engine construction should succeed");
    engine.setup_shake();

    assert!(engine.shake_sequence().is_some());
    assert!(engine.discrete_spec().contains(0, 1));
}
