use std::{collections::HashMap, path::PathBuf, time::Duration};

use super::{apply_env, apply_file, Settings};

fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn defaults_use_thirty_second_timeout() {
    let settings = Settings::default();
    assert_eq!(settings.move_timeout_secs, 30);
    assert!(!settings.log_move_to_height_failures);
    assert_eq!(settings.simulated_start_height_mm, 900);
    assert!(settings.data_dir.ends_with("desk-controller") || settings.data_dir.ends_with("data"));

    let options = settings.controller_options();
    assert_eq!(options.move_timeout, Some(Duration::from_secs(30)));
    assert!(!options.log_move_to_height_failures);
}

#[test]
fn file_values_override_defaults() {
    let mut settings = Settings::default();
    apply_file(
        &mut settings,
        r#"
data_dir = "/tmp/desk"
move_timeout_secs = "0"
log_move_to_height_failures = "yes"
simulated_start_height_mm = "1100"
"#,
    );

    assert_eq!(settings.data_dir, PathBuf::from("/tmp/desk"));
    assert_eq!(settings.move_timeout_secs, 0);
    assert!(settings.log_move_to_height_failures);
    assert_eq!(settings.simulated_start_height_mm, 1100);
    assert_eq!(settings.controller_options().move_timeout, None);
}

#[test]
fn unparsable_values_keep_previous_settings() {
    let mut settings = Settings::default();
    apply_file(
        &mut settings,
        r#"
move_timeout_secs = "soon"
log_move_to_height_failures = "maybe"
"#,
    );
    apply_file(&mut settings, "this is not toml [");

    assert_eq!(settings, Settings::default());
}

#[test]
fn env_overrides_file() {
    let mut settings = Settings::default();
    apply_file(&mut settings, "move_timeout_secs = \"10\"\n");
    apply_env(
        &mut settings,
        env_of(&[
            ("DESK_DATA_DIR", "/var/lib/desk"),
            ("APP__MOVE_TIMEOUT_SECS", "5"),
            ("APP__LOG_MOVE_TO_HEIGHT_FAILURES", "true"),
            ("APP__SIMULATED_START_HEIGHT_MM", "720"),
        ]),
    );

    assert_eq!(settings.data_dir, PathBuf::from("/var/lib/desk"));
    assert_eq!(
        settings.controller_options().move_timeout,
        Some(Duration::from_secs(5))
    );
    assert!(settings.log_move_to_height_failures);
    assert_eq!(settings.simulated_start_height_mm, 720);
}

#[test]
fn app_prefixed_data_dir_wins() {
    let mut settings = Settings::default();
    apply_env(
        &mut settings,
        env_of(&[("DESK_DATA_DIR", "/a"), ("APP__DATA_DIR", "/b")]),
    );
    assert_eq!(settings.data_dir, PathBuf::from("/b"));
}
