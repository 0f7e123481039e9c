use crate::sim::{ConfigError, GbnConfig, SimTime, parse_seq_list};

#[test]
fn defaults_match_the_classroom_setup() {
    let cfg = GbnConfig::default();
    assert_eq!(cfg.total_packets, 40);
    assert_eq!(cfg.window_size, 8);
    assert_eq!(cfg.timeout_secs, 7);
    assert_eq!(cfg.delay_secs, 3);
    assert_eq!(cfg.seq_space, 41);

    let valid = cfg.validate().expect("defaults are valid");
    assert_eq!(valid.timeout(), SimTime::from_secs(7));
    assert_eq!(valid.delay(), SimTime::from_secs(3));
}

#[test]
fn config_parses_minimal_json_with_defaults() {
    let raw = r#"{ "total_packets": 5, "loss_data": [2, 2, 4] }"#;
    let cfg = GbnConfig::from_json_str(raw).expect("parse config");
    assert_eq!(cfg.total_packets, 5);
    assert_eq!(cfg.window_size, 8);
    assert_eq!(cfg.loss_data.iter().copied().collect::<Vec<_>>(), vec![2, 4]);
    assert!(cfg.loss_ack.is_empty());
}

#[test]
fn config_rejects_malformed_json() {
    let err = GbnConfig::from_json_str(r#"{ "total_packets": -1 }"#).unwrap_err();
    assert!(matches!(err, ConfigError::Json(_)));
}

#[test]
fn config_rejects_misspelled_keys() {
    let err = GbnConfig::from_json_str(r#"{ "timeout": 2, "total_packets": 3 }"#).unwrap_err();
    assert!(matches!(err, ConfigError::Json(_)));
    assert!(err.to_string().contains("unknown field"), "got: {err}");
}

#[test]
fn validate_rejects_non_positive_sizes() {
    let zero_total = GbnConfig {
        total_packets: 0,
        ..GbnConfig::default()
    };
    assert!(matches!(zero_total.validate(), Err(ConfigError::ZeroTotalPackets)));

    let zero_window = GbnConfig {
        window_size: 0,
        ..GbnConfig::default()
    };
    assert!(matches!(zero_window.validate(), Err(ConfigError::ZeroWindow)));

    let zero_timeout = GbnConfig {
        timeout_secs: 0,
        ..GbnConfig::default()
    };
    assert!(matches!(zero_timeout.validate(), Err(ConfigError::ZeroTimeout)));
}

#[test]
fn validate_accepts_zero_delay() {
    let cfg = GbnConfig {
        delay_secs: 0,
        ..GbnConfig::default()
    };
    assert!(cfg.validate().is_ok());
}

#[test]
fn validate_rejects_sizes_inconsistent_with_sequence_space() {
    let wide = GbnConfig {
        window_size: 42,
        ..GbnConfig::default()
    };
    assert!(matches!(
        wide.validate(),
        Err(ConfigError::WindowExceedsSeqSpace {
            window: 42,
            seq_space: 41
        })
    ));

    let long = GbnConfig {
        total_packets: 50,
        ..GbnConfig::default()
    };
    assert!(matches!(
        long.validate(),
        Err(ConfigError::TotalExceedsSeqSpace { total: 50, .. })
    ));
}

#[test]
fn validate_rejects_loss_entries_outside_total_packets() {
    let cfg = GbnConfig {
        total_packets: 5,
        loss_ack: [1, 5].into_iter().collect(),
        ..GbnConfig::default()
    };
    let err = cfg.validate().unwrap_err();
    assert!(matches!(
        err,
        ConfigError::LossOutOfRange {
            list: "ack",
            seq: 5,
            total: 5
        }
    ));
    assert_eq!(err.to_string(), "ack loss entry 5 is outside [0, 5)");
}

#[test]
fn seq_list_parses_comma_separated_values() {
    let set = parse_seq_list(" 2, 5,8 ,, ").expect("parse list");
    assert_eq!(set.into_iter().collect::<Vec<_>>(), vec![2, 5, 8]);
    assert!(parse_seq_list("").expect("empty list").is_empty());
}

#[test]
fn seq_list_rejects_garbage_tokens() {
    let err = parse_seq_list("1, x, 3").unwrap_err();
    match err {
        ConfigError::MalformedSeqList { token, .. } => assert_eq!(token, "x"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(parse_seq_list("-1").is_err());
}

#[test]
fn config_file_that_does_not_exist_is_an_io_error() {
    let path = std::env::temp_dir().join("gbn-sim-missing-config-does-not-exist.json");
    let err = GbnConfig::from_json_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}
