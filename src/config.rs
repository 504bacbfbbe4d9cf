use std::env;

use secrecy::{ExposeSecret, SecretString};

use crate::{
    errors::{AppError, AppResult},
    models::domain::certificate::is_valid_number_prefix,
};

const DEV_JWT_SECRET: &str = "dev_secret_key_change_in_production";

#[derive(Clone, Debug)]
pub struct Config {
    pub mongo_conn_string: String,
    pub mongo_db_name: String,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub jwt_secret: SecretString,
    pub jwt_expiration_hours: i64,
    pub frontend_url: String,
    pub certificate_prefix: String,
    pub certificate_issuer: String,
    pub app_env: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            mongo_conn_string: env::var("MONGO_CONN_STRING")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            mongo_db_name: env::var("MONGO_DB_NAME").unwrap_or_else(|_| "academy-local".to_string()),
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
            web_server_port: env::var("WEB_SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            jwt_secret: SecretString::from(
                env::var("JWT_SECRET").unwrap_or_else(|_| DEV_JWT_SECRET.to_string()),
            ),
            jwt_expiration_hours: env::var("JWT_EXPIRATION_HOURS")
                .ok()
                .and_then(|h| h.parse().ok())
                .unwrap_or(24),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            certificate_prefix: env::var("CERTIFICATE_PREFIX").unwrap_or_else(|_| "IIT".to_string()),
            certificate_issuer: env::var("CERTIFICATE_ISSUER")
                .unwrap_or_else(|_| "Isaac Institute of Technology".to_string()),
            app_env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        }
    }

    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }

    /// Checks that hold in every environment.
    pub fn validate(&self) -> AppResult<()> {
        if !is_valid_number_prefix(&self.certificate_prefix) {
            return Err(AppError::InternalError(format!(
                "CERTIFICATE_PREFIX '{}' may only contain letters, digits, '-', '_' and '.'",
                self.certificate_prefix
            )));
        }

        Ok(())
    }

    /// Rejects secrets that are only fit for local development.
    pub fn validate_for_production(&self) -> AppResult<()> {
        let jwt_secret = self.jwt_secret.expose_secret();

        if jwt_secret == DEV_JWT_SECRET {
            return Err(AppError::InternalError(
                "JWT_SECRET is using the default value; set it to a secure random string"
                    .to_string(),
            ));
        }

        if jwt_secret.len() < 32 {
            return Err(AppError::InternalError(format!(
                "JWT_SECRET is too short ({}); it must be at least 32 characters",
                jwt_secret.len()
            )));
        }

        Ok(())
    }

    pub fn test_config() -> Self {
        Self {
            mongo_conn_string: "mongodb://localhost:27017".to_string(),
            mongo_db_name: "academy-test".to_string(),
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
            jwt_secret: SecretString::from("test_jwt_secret_key".to_string()),
            jwt_expiration_hours: 1,
            frontend_url: "https://academy.example.com".to_string(),
            certificate_prefix: "IIT".to_string(),
            certificate_issuer: "Isaac Institute of Technology".to_string(),
            app_env: "test".to_string(),
        }
    }
}
