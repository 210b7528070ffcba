use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Request-level policy values. Enforcement (rate limiter, response cache)
/// is wired in front of the handlers by the deployment; the values here are
/// the contract the handlers were written against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_rate_limiting: bool,
    /// Writes per hour on /customers and /vehicles.
    pub write_limit_per_hour: u32,
    /// Writes per day on /tickets and /assignments.
    pub write_limit_per_day: u32,
    /// Cache TTLs (seconds) for public collection listings.
    pub customer_list_cache_secs: u64,
    pub vehicle_list_cache_secs: u64,
    pub ticket_list_cache_secs: u64,
    pub assignment_list_cache_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub enable_cors: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("API_ENABLE_RATE_LIMITING") {
            self.api.enable_rate_limiting = v.parse().unwrap_or(self.api.enable_rate_limiting);
        }
        if let Ok(v) = env::var("SECRET_KEY") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: "sqlite:garage.db".to_string(),
                max_connections: 5,
            },
            api: ApiConfig {
                enable_rate_limiting: false,
                write_limit_per_hour: 10,
                write_limit_per_day: 20,
                customer_list_cache_secs: 60,
                vehicle_list_cache_secs: 120,
                ticket_list_cache_secs: 30,
                assignment_list_cache_secs: 45,
            },
            security: SecurityConfig {
                jwt_secret: "dev-secret".to_string(),
                jwt_expiry_hours: 8,
                enable_cors: true,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                url: "sqlite:garage.db".to_string(),
                max_connections: 20,
            },
            api: ApiConfig {
                enable_rate_limiting: true,
                write_limit_per_hour: 10,
                write_limit_per_day: 20,
                customer_list_cache_secs: 60,
                vehicle_list_cache_secs: 120,
                ticket_list_cache_secs: 30,
                assignment_list_cache_secs: 45,
            },
            security: SecurityConfig {
                jwt_secret: "dev-secret".to_string(),
                jwt_expiry_hours: 8,
                enable_cors: true,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert!(!config.api.enable_rate_limiting);
        assert_eq!(config.security.jwt_expiry_hours, 8);
        assert_eq!(config.api.write_limit_per_hour, 10);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(config.api.enable_rate_limiting);
        assert_eq!(config.security.jwt_expiry_hours, 8);
    }
}
