//! Configuration validation module

use url::Url;

use crate::config::cors::configured_origins;
use crate::config::{
    AppSettings, Config, DatabaseConfig, Environment, JwtConfig, LoggingConfig, SeedConfig,
    ServerConfig,
};

/// Trait for validating configuration sections
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("{message}")]
    MissingKeys { message: String },

    #[error("Server configuration error: {message}")]
    Server { message: String },

    #[error("Database configuration error: {message}")]
    Database { message: String },

    #[error("JWT configuration error: {message}")]
    Jwt { message: String },

    #[error("CORS configuration error: {message}")]
    Cors { message: String },

    #[error("Seed configuration error: {message}")]
    Seed { message: String },

    #[error("Logging configuration error: {message}")]
    Logging { message: String },
}

impl ValidationError {
    pub fn missing_keys(message: impl Into<String>) -> Self {
        Self::MissingKeys {
            message: message.into(),
        }
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::Server {
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    pub fn jwt(message: impl Into<String>) -> Self {
        Self::Jwt {
            message: message.into(),
        }
    }

    pub fn cors(message: impl Into<String>) -> Self {
        Self::Cors {
            message: message.into(),
        }
    }

    pub fn seed(message: impl Into<String>) -> Self {
        Self::Seed {
            message: message.into(),
        }
    }

    pub fn logging(message: impl Into<String>) -> Self {
        Self::Logging {
            message: message.into(),
        }
    }
}

/// Fragments that mark a signing key as a placeholder
const WEAK_JWT_KEYS: &[&str] = &[
    "your-secret-key",
    "your-256-bit-secret",
    "supersecretkey",
    "default",
    "secret",
];

pub const MIN_JWT_KEY_LENGTH: usize = 32;
pub const MAX_PRODUCTION_EXPIRATION_MINUTES: i64 = 1440;
/// One year
pub const MAX_EXPIRATION_MINUTES: i64 = 525_600;
/// Seed day offsets in either direction
pub const MAX_SEED_DAY_OFFSET: i64 = 3650;
pub const MAX_SEED_JOB_HOURS: f64 = 8760.0;

impl Config {
    /// Keys that must be non-blank before the server can start
    pub fn missing_required_keys(&self) -> Vec<&'static str> {
        let required: [(&'static str, &str); 6] = [
            ("jwt.key", &self.jwt.key),
            ("jwt.issuer", &self.jwt.issuer),
            ("jwt.audience", &self.jwt.audience),
            ("google.client_id", &self.google.client_id),
            ("google.client_secret", &self.google.client_secret),
            ("app.frontend_url", &self.app.frontend_url),
        ];

        required
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(key, _)| key)
            .collect()
    }

    fn validate_required_keys(&self) -> Result<(), ValidationError> {
        let missing = self.missing_required_keys();
        if missing.is_empty() {
            return Ok(());
        }

        let hint = match self.environment {
            Environment::Development => {
                "Please set them in config/local.toml or a .env file (PRODSCHED__SECTION__KEY)."
            }
            Environment::Production | Environment::Staging => {
                "Please set the corresponding PRODSCHED__SECTION__KEY environment variables."
            }
            _ => "Check your configuration setup.",
        };

        Err(ValidationError::missing_keys(format!(
            "Missing configuration keys: {}. {}",
            missing.join(", "),
            hint
        )))
    }
}

/// Validate configured origins for the given environment
pub fn validate_cors(app: &AppSettings, environment: &Environment) -> Result<(), ValidationError> {
    let mut invalid = Vec::new();
    let mut http_in_production = Vec::new();

    for origin in configured_origins(app, environment) {
        // Scheme strictness is reported separately below
        if !super::cors::is_valid_origin(&origin, &Environment::Development) {
            invalid.push(origin);
        } else if environment.is_production()
            && Url::parse(origin.trim()).is_ok_and(|url| url.scheme() == "http")
        {
            http_in_production.push(origin);
        }
    }

    if !invalid.is_empty() {
        return Err(ValidationError::cors(format!(
            "Invalid CORS origins found: {}. Origins must be valid HTTP or HTTPS URLs.",
            invalid.join(", ")
        )));
    }

    if !http_in_production.is_empty() {
        return Err(ValidationError::cors(format!(
            "HTTP origins not allowed in production: {}. All origins must use HTTPS in production.",
            http_in_production.join(", ")
        )));
    }

    Ok(())
}

/// Validate signing key strength and token lifetime for the given environment
pub fn validate_jwt(jwt: &JwtConfig, environment: &Environment) -> Result<(), ValidationError> {
    if !jwt.key.trim().is_empty() {
        if jwt.key.chars().count() < MIN_JWT_KEY_LENGTH {
            return Err(ValidationError::jwt(format!(
                "JWT key is too short. Minimum length is {} characters, current length: {}",
                MIN_JWT_KEY_LENGTH,
                jwt.key.chars().count()
            )));
        }

        if environment.is_production() {
            let lowered = jwt.key.to_lowercase();
            if WEAK_JWT_KEYS.iter().any(|weak| lowered.contains(weak)) {
                return Err(ValidationError::jwt(
                    "JWT key appears to use a weak or default value. Use a cryptographically secure random key in production.",
                ));
            }
        }
    }

    if jwt.expiration_minutes <= 0 {
        return Err(ValidationError::jwt(
            "JWT expiration_minutes must be greater than 0",
        ));
    }

    if jwt.expiration_minutes > MAX_EXPIRATION_MINUTES {
        return Err(ValidationError::jwt(format!(
            "JWT expiration_minutes cannot exceed {}, got {}",
            MAX_EXPIRATION_MINUTES, jwt.expiration_minutes
        )));
    }

    if environment.is_production() && jwt.expiration_minutes > MAX_PRODUCTION_EXPIRATION_MINUTES {
        return Err(ValidationError::jwt(format!(
            "JWT expiration_minutes should not exceed {} in production",
            MAX_PRODUCTION_EXPIRATION_MINUTES
        )));
    }

    if environment.is_production() && !jwt.issuer.is_empty() && !jwt.issuer.contains('.') {
        tracing::warn!(
            issuer = %jwt.issuer,
            "JWT issuer should typically be a URI in production"
        );
    }

    Ok(())
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        // u16 cannot exceed 65535, so only 0 is out of range
        if self.port == 0 {
            return Err(ValidationError::server(format!(
                "Port must be in range 1-65535, got {}",
                self.port
            )));
        }

        if self.host.is_empty() {
            return Err(ValidationError::server("Host cannot be empty"));
        }

        if self.request_timeout_seconds == 0 {
            return Err(ValidationError::server(
                "Request timeout must be greater than 0",
            ));
        }

        Ok(())
    }
}

impl Validate for DatabaseConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.url.trim().is_empty() {
            return Err(ValidationError::database("Database url cannot be empty"));
        }

        if self.max_connections == 0 {
            return Err(ValidationError::database(
                "max_connections must be greater than 0",
            ));
        }

        if let Some(min_idle) = self.min_idle
            && min_idle > self.max_connections
        {
            return Err(ValidationError::database(format!(
                "min_idle ({}) cannot exceed max_connections ({})",
                min_idle, self.max_connections
            )));
        }

        Ok(())
    }
}

impl Validate for LoggingConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        match self.format.as_str() {
            "json" | "text" => Ok(()),
            other => Err(ValidationError::logging(format!(
                "Unknown log format '{}', expected 'json' or 'text'",
                other
            ))),
        }
    }
}

impl Validate for Config {
    fn validate(&self) -> Result<(), ValidationError> {
        self.validate_required_keys()?;
        validate_cors(&self.app, &self.environment)?;
        validate_jwt(&self.jwt, &self.environment)?;
        self.server.validate()?;
        if !matches!(self.environment, Environment::Testing) {
            self.database.validate()?;
        }
        self.logging.validate()?;
        validate_seed(&self.seed, &self.environment)?;
        Ok(())
    }
}

fn validate_seed(seed: &SeedConfig, environment: &Environment) -> Result<(), ValidationError> {
    if seed.enable_cleanup && environment.is_production() {
        return Err(ValidationError::seed(
            "enable_cleanup cannot be used in production",
        ));
    }

    let check_days = |owner: &str, field: &str, days: i64| {
        if days.abs() > MAX_SEED_DAY_OFFSET {
            Err(ValidationError::seed(format!(
                "{} {} must be within {} days, got {}",
                owner, field, MAX_SEED_DAY_OFFSET, days
            )))
        } else {
            Ok(())
        }
    };

    for machine in &seed.machines {
        let owner = format!("machine '{}'", machine.name);
        check_days(&owner, "last_maintenance_days_ago", machine.last_maintenance_days_ago)?;
        check_days(&owner, "next_maintenance_days_ahead", machine.next_maintenance_days_ahead)?;
    }

    for order in &seed.orders {
        let owner = format!("order '{}'", order.order_number);
        check_days(&owner, "due_date_days_ahead", order.due_date_days_ahead)?;
    }

    for job in &seed.jobs {
        let owner = format!("job '{}'", job.job_name);
        check_days(&owner, "scheduled_start_days_ahead", job.scheduled_start_days_ahead)?;
        if !job.duration.is_finite() || job.duration < 0.0 || job.duration > MAX_SEED_JOB_HOURS {
            return Err(ValidationError::seed(format!(
                "{} duration must be between 0 and {} hours",
                owner, MAX_SEED_JOB_HOURS
            )));
        }
    }

    Ok(())
}
