use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};

use super::env::{Env, parse_bool};
use super::schema::{ConfigFile, OutputFormat, OutputSettings, Profile, Settings};

#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
    pub profile: Option<String>,
    pub server: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub timeout_ms: Option<u64>,
    pub encrypt: Option<bool>,
    pub trust_cert: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub cli: CliOverrides,
    pub cwd: PathBuf,
    pub home_dir: Option<PathBuf>,
    pub xdg_config_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config_path: Option<PathBuf>,
    pub profile_name: String,
    pub connection: ConnectionSettings,
    pub settings: SettingsResolved,
}

#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub server: String,
    pub port: u16,
    pub database: String,
    pub user: Option<String>,
    pub password: Option<String>,
    pub encrypt: bool,
    pub trust_cert: bool,
    pub timeout_ms: u64,
    pub schema: String,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            server: "localhost".to_string(),
            port: 1433,
            database: "master".to_string(),
            user: None,
            password: None,
            encrypt: true,
            trust_cert: true,
            timeout_ms: 30_000,
            schema: "dbo".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SettingsResolved {
    pub allow_write_default: bool,
    pub output: OutputSettingsResolved,
}

#[derive(Debug, Clone)]
pub struct OutputSettingsResolved {
    pub default_format: OutputFormat,
    pub json_pretty: bool,
}

impl Default for SettingsResolved {
    fn default() -> Self {
        Self {
            allow_write_default: false,
            output: OutputSettingsResolved {
                default_format: OutputFormat::Pretty,
                json_pretty: true,
            },
        }
    }
}

pub fn load_config(options: &LoadOptions, env: &Env) -> Result<ResolvedConfig> {
    let config_path = resolve_config_path(options, env)?;
    let config_file = match &config_path {
        Some(path) => load_config_file(path)?,
        None => ConfigFile::default(),
    };

    let profile_name = resolve_profile_name(options, env, config_file.default_profile.as_deref());

    let mut connection = ConnectionSettings::default();
    let mut settings = SettingsResolved::default();

    if let Some(settings_cfg) = &config_file.settings {
        apply_settings(&mut settings, settings_cfg);
    }

    if let Some(profile) = config_file.profiles.get(&profile_name) {
        apply_profile(&mut connection, &mut settings, profile, env);
    }

    apply_env_overrides(&mut connection, env);
    apply_cli_overrides(&mut connection, &options.cli);

    Ok(ResolvedConfig {
        config_path,
        profile_name,
        connection,
        settings,
    })
}

fn resolve_profile_name(options: &LoadOptions, env: &Env, default_profile: Option<&str>) -> String {
    if let Some(profile) = options.cli.profile.as_deref() {
        return profile.to_string();
    }
    if let Some(profile) = env.get("SSEDIT_PROFILE") {
        return profile;
    }
    if let Some(profile) = default_profile {
        return profile.to_string();
    }
    "default".to_string()
}

fn resolve_config_path(options: &LoadOptions, env: &Env) -> Result<Option<PathBuf>> {
    if let Some(path) = &options.cli.config_path {
        if !path.exists() {
            return Err(anyhow!("Config file not found: {}", path.display()));
        }
        return Ok(Some(path.clone()));
    }

    if let Some(path) = env.get("SSEDIT_CONFIG") {
        let path = PathBuf::from(path);
        if !path.exists() {
            return Err(anyhow!("Config file not found: {}", path.display()));
        }
        return Ok(Some(path));
    }

    if let Some(path) = find_local_config(&options.cwd, options.home_dir.as_deref()) {
        return Ok(Some(path));
    }

    Ok(find_global_config(options.xdg_config_dir.as_deref()))
}

fn find_local_config(start: &Path, home: Option<&Path>) -> Option<PathBuf> {
    let candidates = [
        ".ssedit/config.yaml",
        ".ssedit/config.yml",
        ".ssedit/config.json",
    ];

    for dir in start.ancestors() {
        for candidate in &candidates {
            let path = dir.join(candidate);
            if path.is_file() {
                return Some(path);
            }
        }

        if let Some(home_dir) = home {
            if dir == home_dir {
                break;
            }
        }
    }

    None
}

fn find_global_config(xdg_config: Option<&Path>) -> Option<PathBuf> {
    let base = xdg_config?;
    let candidates = ["ssedit/config.yaml", "ssedit/config.yml", "ssedit/config.json"];

    for candidate in &candidates {
        let path = base.join(candidate);
        if path.is_file() {
            return Some(path);
        }
    }

    None
}

fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => {
            serde_yaml::from_str(&content).context("Failed to parse YAML config")
        }
        Some("json") => serde_json::from_str(&content).context("Failed to parse JSON config"),
        _ => Err(anyhow!("Unsupported config file extension")),
    }
}

/// Later layers overwrite earlier ones field by field; None leaves the
/// current value alone.
fn overlay<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

fn overlay_opt<T: Clone>(target: &mut Option<T>, value: Option<&T>) {
    if let Some(value) = value {
        *target = Some(value.clone());
    }
}

fn apply_profile(
    connection: &mut ConnectionSettings,
    settings: &mut SettingsResolved,
    profile: &Profile,
    env: &Env,
) {
    overlay(&mut connection.server, profile.server.clone());
    overlay(&mut connection.port, profile.port);
    overlay(&mut connection.database, profile.database.clone());
    overlay_opt(&mut connection.user, profile.user.as_ref());
    overlay(&mut connection.encrypt, profile.encrypt);
    overlay(&mut connection.trust_cert, profile.trust_cert);
    overlay(&mut connection.timeout_ms, profile.timeout);
    overlay(&mut connection.schema, profile.schema.clone());

    if let Some(password) = &profile.password {
        connection.password = Some(password.clone());
    } else if let Some(env_key) = &profile.password_env {
        overlay_opt(&mut connection.password, env.get(env_key).as_ref());
    }

    if let Some(settings_profile) = &profile.settings {
        apply_settings(settings, settings_profile);
    }
}

fn apply_settings(settings: &mut SettingsResolved, overrides: &Settings) {
    overlay(
        &mut settings.allow_write_default,
        overrides.allow_write_default,
    );
    if let Some(output) = &overrides.output {
        apply_output_settings(&mut settings.output, output);
    }
}

fn apply_output_settings(settings: &mut OutputSettingsResolved, overrides: &OutputSettings) {
    overlay(&mut settings.default_format, overrides.default_format);
    overlay(&mut settings.json_pretty, overrides.json_pretty);
}

fn apply_env_overrides(connection: &mut ConnectionSettings, env: &Env) {
    overlay(
        &mut connection.server,
        env.get_any(&["SQL_SERVER", "SQLSERVER_HOST", "DB_HOST"]),
    );
    overlay(
        &mut connection.port,
        env.get_any(&["SQL_PORT", "SQLSERVER_PORT", "DB_PORT"])
            .and_then(|v| v.parse::<u16>().ok()),
    );
    overlay(
        &mut connection.database,
        env.get_any(&["SQL_DATABASE", "SQLSERVER_DB", "DB_NAME"]),
    );
    overlay_opt(
        &mut connection.user,
        env.get_any(&["SQL_USER", "SQLSERVER_USER", "DB_USER"]).as_ref(),
    );
    overlay_opt(
        &mut connection.password,
        env.get_any(&["SQL_PASSWORD", "SQLSERVER_PASSWORD", "DB_PASSWORD"])
            .as_ref(),
    );
    overlay(
        &mut connection.encrypt,
        env.get("SQL_ENCRYPT").and_then(|v| parse_bool(&v)),
    );
    overlay(
        &mut connection.trust_cert,
        env.get("SQL_TRUST_SERVER_CERTIFICATE")
            .and_then(|v| parse_bool(&v)),
    );
    overlay(
        &mut connection.timeout_ms,
        env.get_any(&["SQL_CONNECT_TIMEOUT", "DB_CONNECT_TIMEOUT"])
            .and_then(|v| v.parse::<u64>().ok()),
    );
    overlay(
        &mut connection.schema,
        env.get_any(&["SQL_SCHEMA", "DB_SCHEMA"]),
    );
}

fn apply_cli_overrides(connection: &mut ConnectionSettings, cli: &CliOverrides) {
    overlay(&mut connection.server, cli.server.clone());
    overlay(&mut connection.port, cli.port);
    overlay(&mut connection.database, cli.database.clone());
    overlay_opt(&mut connection.user, cli.user.as_ref());
    overlay_opt(&mut connection.password, cli.password.as_ref());
    overlay(&mut connection.timeout_ms, cli.timeout_ms);
    overlay(&mut connection.encrypt, cli.encrypt);
    overlay(&mut connection.trust_cert, cli.trust_cert);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn temp_dir(name: &str) -> PathBuf {
        let mut dir = env::temp_dir();
        dir.push(format!("ssedit-test-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    fn options_with_config(config_path: PathBuf, cwd: PathBuf) -> LoadOptions {
        LoadOptions {
            cli: CliOverrides {
                config_path: Some(config_path),
                ..CliOverrides::default()
            },
            cwd,
            home_dir: None,
            xdg_config_dir: None,
        }
    }

    #[test]
    fn loads_config_from_cli_path() {
        let dir = temp_dir("config");
        let config_path = dir.join("config.yaml");
        fs::write(
            &config_path,
            "defaultProfile: test\nprofiles:\n  test:\n    server: example\n    schema: sales\n",
        )
        .expect("write config");

        let env = Env::from_pairs(&[]);
        let resolved =
            load_config(&options_with_config(config_path, dir), &env).expect("load config");
        assert_eq!(resolved.connection.server, "example");
        assert_eq!(resolved.connection.schema, "sales");
    }

    #[test]
    fn env_overrides_config_profile() {
        let dir = temp_dir("env-override");
        let config_path = dir.join("config.yml");
        fs::write(
            &config_path,
            "defaultProfile: test\nprofiles:\n  test:\n    server: config-host\n",
        )
        .expect("write config");

        let env = Env::from_pairs(&[("SQL_SERVER", "env-host")]);
        let resolved =
            load_config(&options_with_config(config_path, dir), &env).expect("load config");
        assert_eq!(resolved.connection.server, "env-host");
    }

    #[test]
    fn cli_overrides_env() {
        let dir = temp_dir("cli-override");
        let options = LoadOptions {
            cli: CliOverrides {
                server: Some("cli-host".to_string()),
                ..CliOverrides::default()
            },
            cwd: dir,
            home_dir: None,
            xdg_config_dir: None,
        };
        let env = Env::from_pairs(&[("SQL_SERVER", "env-host")]);
        let resolved = load_config(&options, &env).expect("load config");
        assert_eq!(resolved.connection.server, "cli-host");
    }

    #[test]
    fn profile_password_env_is_used() {
        let dir = temp_dir("password-env");
        let config_path = dir.join("config.yml");
        fs::write(
            &config_path,
            "defaultProfile: test\nprofiles:\n  test:\n    passwordEnv: TEST_DB_PASS\n",
        )
        .expect("write config");

        let env = Env::from_pairs(&[("TEST_DB_PASS", "secret")]);
        let resolved =
            load_config(&options_with_config(config_path, dir), &env).expect("load config");
        assert_eq!(resolved.connection.password.as_deref(), Some("secret"));
    }

    #[test]
    fn default_profile_used_when_missing() {
        let dir = temp_dir("defaults");
        let options = LoadOptions {
            cli: CliOverrides::default(),
            cwd: dir,
            home_dir: None,
            xdg_config_dir: None,
        };
        let env = Env::from_pairs(&[]);
        let resolved = load_config(&options, &env).expect("load config");
        assert_eq!(resolved.profile_name, "default");
        assert_eq!(resolved.connection.schema, "dbo");
        assert!(!resolved.settings.allow_write_default);
    }

    #[test]
    fn allow_write_default_from_settings() {
        let dir = temp_dir("allow-write");
        let config_path = dir.join("config.yaml");
        fs::write(&config_path, "settings:\n  allowWriteDefault: true\n").expect("write config");

        let env = Env::from_pairs(&[]);
        let resolved =
            load_config(&options_with_config(config_path, dir), &env).expect("load config");
        assert!(resolved.settings.allow_write_default);
    }
}
