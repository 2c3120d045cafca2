use super::*;
use serial_test::serial;
use std::env;
use std::path::PathBuf;

const ALL_VARS: &[&str] = &[
    "TA_DATA_DIR",
    "TA_EMBEDDING_BASE_URL",
    "TA_API_KEY",
    "OPENAI_API_KEY",
    "TA_EMBEDDING_MODEL",
    "TA_REQUEST_TIMEOUT_SECS",
    "TA_MAX_CHARS_PER_TEXT",
    "TA_MAX_CHARS_PER_BATCH",
    "TA_TOP_N",
    "TA_THRESHOLD",
    "TA_FORCE_REBUILD",
];

fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, value) in vars {
        unsafe { env::set_var(key, value) };
    }

    let result = f();

    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, _) in vars {
        unsafe { env::remove_var(key) };
    }

    result
}

fn clear_ta_env() {
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for key in ALL_VARS {
        unsafe { env::remove_var(key) };
    }
}

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.data_dir, PathBuf::from("./data"));
    assert_eq!(config.embedding_model, "text-embedding-3-small");
    assert_eq!(config.max_chars_per_text, 2000);
    assert_eq!(config.max_chars_per_batch, 10_000);
    assert_eq!(config.top_n, 1);
    assert!((config.threshold - 0.5).abs() < f32::EPSILON);
    assert!(!config.force_rebuild);
    assert!(config.api_key.is_none());
    assert!(config.validate().is_ok());
}

#[test]
fn test_corpus_dir() {
    let config = Config {
        data_dir: PathBuf::from("/srv/ta"),
        ..Default::default()
    };
    assert_eq!(config.corpus_dir(Corpus::Forum), PathBuf::from("/srv/ta/forum"));
    assert_eq!(
        config.corpus_dir(Corpus::Course),
        PathBuf::from("/srv/ta/course")
    );
}

#[test]
#[serial]
fn test_from_env_with_defaults() {
    clear_ta_env();

    let config = Config::from_env().expect("should parse with defaults");

    assert_eq!(config.top_n, 1);
    assert_eq!(config.request_timeout, Duration::from_secs(60));
    assert!(config.api_key.is_none());
}

#[test]
#[serial]
fn test_from_env_overrides() {
    clear_ta_env();

    with_env_vars(
        &[
            ("TA_DATA_DIR", "/tmp/ta-data"),
            ("TA_TOP_N", "3"),
            ("TA_THRESHOLD", "0.75"),
            ("TA_FORCE_REBUILD", "true"),
            ("TA_EMBEDDING_MODEL", "text-embedding-3-large"),
            ("TA_REQUEST_TIMEOUT_SECS", "5"),
        ],
        || {
            let config = Config::from_env().expect("should parse");
            assert_eq!(config.data_dir, PathBuf::from("/tmp/ta-data"));
            assert_eq!(config.top_n, 3);
            assert!((config.threshold - 0.75).abs() < f32::EPSILON);
            assert!(config.force_rebuild);
            assert_eq!(config.embedding_model, "text-embedding-3-large");
            assert_eq!(config.request_timeout, Duration::from_secs(5));
        },
    );
}

#[test]
#[serial]
fn test_from_env_api_key_fallback() {
    clear_ta_env();

    with_env_vars(&[("OPENAI_API_KEY", "sk-fallback")], || {
        let config = Config::from_env().expect("should parse");
        assert_eq!(config.api_key.as_deref(), Some("sk-fallback"));
    });

    with_env_vars(
        &[("OPENAI_API_KEY", "sk-fallback"), ("TA_API_KEY", "sk-primary")],
        || {
            let config = Config::from_env().expect("should parse");
            assert_eq!(config.api_key.as_deref(), Some("sk-primary"));
        },
    );
}

#[test]
#[serial]
fn test_from_env_blank_api_key_is_absent() {
    clear_ta_env();

    with_env_vars(&[("TA_API_KEY", "   ")], || {
        let config = Config::from_env().expect("should parse");
        assert!(config.api_key.is_none());
        assert!(matches!(
            config.require_api_key(),
            Err(ConfigError::MissingEnvVar { name: "TA_API_KEY" })
        ));
    });
}

#[test]
#[serial]
fn test_from_env_invalid_top_n() {
    clear_ta_env();

    with_env_vars(&[("TA_TOP_N", "many")], || {
        let err = Config::from_env().expect_err("should reject");
        assert!(matches!(err, ConfigError::InvalidNumber { name: "TA_TOP_N", .. }));
        assert!(err.to_string().contains("many"));
    });
}

#[test]
#[serial]
fn test_from_env_invalid_bool() {
    clear_ta_env();

    with_env_vars(&[("TA_FORCE_REBUILD", "maybe")], || {
        let err = Config::from_env().expect_err("should reject");
        assert!(matches!(err, ConfigError::InvalidBool { .. }));
    });
}

#[test]
#[serial]
fn test_from_env_bool_spellings() {
    clear_ta_env();

    for (value, expected) in [("1", true), ("YES", true), ("0", false), ("False", false)] {
        with_env_vars(&[("TA_FORCE_REBUILD", value)], || {
            let config = Config::from_env().expect("should parse");
            assert_eq!(config.force_rebuild, expected, "value {value}");
        });
    }
}

#[test]
fn test_validate_threshold_out_of_range() {
    let config = Config {
        threshold: 1.5,
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidThreshold { .. })
    ));

    let config = Config {
        threshold: f32::NAN,
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidThreshold { .. })
    ));
}

#[test]
fn test_validate_threshold_boundaries_accepted() {
    for threshold in [-1.0, 0.0, 1.0] {
        let config = Config {
            threshold,
            ..Default::default()
        };
        assert!(config.validate().is_ok(), "threshold {threshold}");
    }
}

#[test]
fn test_validate_zero_limits() {
    let config = Config {
        max_chars_per_text: 0,
        ..Default::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::ZeroLimit { .. })));

    let config = Config {
        max_chars_per_batch: 0,
        ..Default::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::ZeroLimit { .. })));
}

#[test]
fn test_validate_batch_smaller_than_text() {
    let config = Config {
        max_chars_per_text: 500,
        max_chars_per_batch: 100,
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::BatchBudgetTooSmall {
            batch: 100,
            text: 500
        })
    ));
}

#[test]
fn test_validate_bad_base_url() {
    for value in ["not a url", "ftp://example.com/v1"] {
        let config = Config {
            embedding_base_url: value.to_string(),
            ..Default::default()
        };
        assert!(
            matches!(config.validate(), Err(ConfigError::InvalidBaseUrl { .. })),
            "{value}"
        );
    }
}

#[test]
fn test_validate_data_dir_is_file() {
    let file = tempfile::NamedTempFile::new().expect("temp file");
    let config = Config {
        data_dir: file.path().to_path_buf(),
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::NotADirectory { .. })
    ));
}
