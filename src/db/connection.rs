use anyhow::{Result, anyhow};

use crate::config::ConnectionSettings;

pub fn build_config(settings: &ConnectionSettings) -> Result<tiberius::Config> {
    let mut config = tiberius::Config::new();
    config.host(&settings.server);
    config.port(settings.port);
    config.database(&settings.database);

    match (&settings.user, &settings.password) {
        (Some(user), Some(pass)) => {
            config.authentication(tiberius::AuthMethod::sql_server(user, pass));
        }
        (Some(user), None) => {
            return Err(anyhow!(
                "Password is required for SQL authentication (user: {})",
                user
            ));
        }
        _ => {}
    }

    if settings.encrypt {
        config.encryption(tiberius::EncryptionLevel::Required);
    } else {
        config.encryption(tiberius::EncryptionLevel::NotSupported);
    }

    if settings.trust_cert {
        config.trust_cert();
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_without_password_is_rejected() {
        let settings = ConnectionSettings {
            user: Some("sa".to_string()),
            password: None,
            ..ConnectionSettings::default()
        };
        let err = build_config(&settings).unwrap_err();
        assert!(err.to_string().contains("Password is required"));
    }

    #[test]
    fn windows_style_trusted_connection_builds() {
        let settings = ConnectionSettings::default();
        assert!(build_config(&settings).is_ok());
    }
}
