use super::*;
use serial_test::serial;

const REQUIRED_VARS: &[&str] = ["PRIMARY_API_URL", "PRIMARY_TOKEN", "BOARD_API_URL", "BOARD_TOKEN"];

const ALL_VARS: &[&str] = &[
    "PRIMARY_API_URL",
    "PRIMARY_TOKEN",
    "BOARD_API_URL",
    "BOARD_TOKEN",
    "LOCAL_CLI_PATH",
    "STACKS_DIR",
    "SYNC_INTERVAL_MS",
    "INCREMENTAL_SYNC",
    "PARALLEL_SYNC",
    "MAX_WORKERS",
    "DRY_RUN",
    "SKIP_EMPTY_PROJECTS",
    "HEALTH_PORT",
    "PROJECT_ALLOWLIST",
    "STATE_DB_PATH",
];

fn clear_all() {
    for var in ALL_VARS {
        std::env::remove_var(var);
    }
}

fn set_required() {
    std::env::set_var("PRIMARY_API_URL", "https://primary.example.com");
    std::env::set_var("PRIMARY_TOKEN", "primary-secret");
    std::env::set_var("BOARD_API_URL", "https://board.example.com");
    std::env::set_var("BOARD_TOKEN", "board-secret");
}

#[test]
#[serial]
fn missing_required_vars_is_a_fatal_error() {
    clear_all();
    assert_eq!(Config::load().unwrap_err(), ConfigError::MissingPrimaryApiUrl);

    std::env::set_var("PRIMARY_API_URL", "https://primary.example.com");
    assert_eq!(Config::load().unwrap_err(), ConfigError::MissingPrimaryToken);

    std::env::set_var("PRIMARY_TOKEN", "primary-secret");
    assert_eq!(Config::load().unwrap_err(), ConfigError::MissingBoardApiUrl);

    std::env::set_var("BOARD_API_URL", "https://board.example.com");
    assert_eq!(Config::load().unwrap_err(), ConfigError::MissingBoardToken);
    clear_all();
}

#[test]
#[serial]
fn loads_defaults_when_optional_vars_are_absent() {
    clear_all();
    set_required();

    let config = Config::load().expect("required vars are set");
    assert_eq!(config.local_cli_path, PathBuf::from("bd"));
    assert_eq!(config.sync_interval, Duration::from_millis(30_000));
    assert!(!config.incremental_sync);
    assert!(!config.parallel_sync);
    assert_eq!(config.max_workers, 4);
    assert!(!config.dry_run);
    assert!(!config.skip_empty_projects);
    assert_eq!(config.health_port, 8080);
    assert!(config.project_allowlist.is_empty());
    assert_eq!(config.state_db_path, PathBuf::from("./logs/sync-state.db"));
    clear_all();
}

#[test]
#[serial]
fn state_db_path_defaults_under_stacks_dir_when_set() {
    clear_all();
    set_required();
    std::env::set_var("STACKS_DIR", "/srv/stacks");

    let config = Config::load().expect("required vars are set");
    assert_eq!(config.state_db_path, PathBuf::from("/srv/stacks/logs/sync-state.db"));
    clear_all();
}

#[test]
#[serial]
fn project_allowlist_splits_and_trims_csv() {
    clear_all();
    set_required();
    std::env::set_var("PROJECT_ALLOWLIST", "ENG, OPS,  SEC");

    let config = Config::load().expect("required vars are set");
    let mut allowlist: Vec<_> = config.project_allowlist.into_iter().collect();
    allowlist.sort();
    assert_eq!(allowlist, vec!["ENG".to_string(), "OPS".to_string(), "SEC".to_string()]);
    clear_all();
}

#[test]
#[serial]
fn invalid_numeric_value_is_rejected() {
    clear_all();
    set_required();
    std::env::set_var("MAX_WORKERS", "not-a-number");

    assert_eq!(
        Config::load().unwrap_err(),
        ConfigError::InvalidValue { name: "MAX_WORKERS", value: "not-a-number".to_string() }
    );
    clear_all();
}

#[test]
#[serial]
fn boolean_vars_accept_common_spellings() {
    clear_all();
    set_required();
    std::env::set_var("DRY_RUN", "YES");

    let config = Config::load().expect("required vars are set");
    assert!(config.dry_run);
    clear_all();
}

#[test]
#[serial]
fn redacted_config_hides_tokens_but_keeps_urls() {
    clear_all();
    set_required();

    let config = Config::load().expect("required vars are set");
    let redacted = config.redacted();
    assert_eq!(redacted.primary_api_url, "https://primary.example.com");
    assert_eq!(redacted.primary_token, "<redacted>");
    assert_eq!(redacted.board_token, "<redacted>");
    clear_all();
}

#[test]
#[serial]
fn orchestrator_config_disables_parallelism_unless_requested() {
    clear_all();
    set_required();

    let config = Config::load().expect("required vars are set");
    assert_eq!(config.orchestrator_config().max_workers, None);

    std::env::set_var("PARALLEL_SYNC", "true");
    let config = Config::load().expect("required vars are set");
    assert_eq!(config.orchestrator_config().max_workers, Some(4));
    clear_all();
}

#[test]
#[serial]
fn every_required_var_name_is_covered_by_the_table() {
    for name in REQUIRED_VARS {
        assert!(ALL_VARS.contains(name));
    }
}
