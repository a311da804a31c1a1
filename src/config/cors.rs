//! CORS origin resolution
//!
//! Origins come from `app.allowed_origins`, falling back to `app.frontend_url`
//! and finally to per-environment defaults.

use url::Url;

use super::{AppSettings, Environment};

/// Default origins when nothing usable is configured
pub fn environment_default_origins(environment: &Environment) -> Vec<String> {
    let origins: &[&str] = match environment {
        Environment::Development => &["http://localhost:5173", "https://localhost:5173"],
        Environment::Staging => &["https://staging.your-domain.com"],
        Environment::Production => &["https://your-production-domain.com"],
        _ => &["http://localhost:5173"],
    };
    origins.iter().map(|o| o.to_string()).collect()
}

/// Browsers send `Origin` without a trailing slash
fn normalize_origin(origin: &str) -> String {
    origin.trim().trim_end_matches('/').to_string()
}

/// Origins as configured, before any validation
pub fn configured_origins(app: &AppSettings, environment: &Environment) -> Vec<String> {
    if !app.allowed_origins.is_empty() {
        return app.allowed_origins.iter().map(|o| normalize_origin(o)).collect();
    }

    if !app.frontend_url.trim().is_empty() {
        return vec![normalize_origin(&app.frontend_url)];
    }

    match environment {
        Environment::Development => vec!["http://localhost:5173".to_string()],
        other => environment_default_origins(other),
    }
}

/// An absolute http(s) URL with a host. Production additionally requires https.
pub fn is_valid_origin(origin: &str, environment: &Environment) -> bool {
    if origin.trim().is_empty() {
        return false;
    }

    let Ok(url) = Url::parse(origin.trim()) else {
        return false;
    };

    if url.scheme() != "http" && url.scheme() != "https" {
        return false;
    }

    if url.host_str().is_none_or(|h| h.is_empty()) {
        return false;
    }

    !(environment.is_production() && url.scheme() != "https")
}

/// The same origin over the other protocol
///
/// `localhost` keeps its explicit port so dev servers on both schemes line up;
/// any other host falls back to the scheme's default port.
pub fn alternate_protocol_origin(origin: &str) -> Option<String> {
    let url = Url::parse(origin.trim()).ok()?;
    let host = url.host_str()?;

    let scheme = match url.scheme() {
        "http" => "https",
        "https" => "http",
        _ => return None,
    };

    let port = match url.port() {
        Some(port) if host == "localhost" => format!(":{}", port),
        _ => String::new(),
    };

    let path = url.path().trim_end_matches('/');
    Some(format!("{}://{}{}{}", scheme, host, port, path))
}

/// Effective CORS allow-list
///
/// Keeps configured origins valid for the environment; development also
/// allows each origin's alternate-protocol twin. Falls back to environment
/// defaults when nothing survives. Duplicates are removed, order preserved.
pub fn get_allowed_origins(app: &AppSettings, environment: &Environment) -> Vec<String> {
    let mut validated = Vec::new();

    for origin in configured_origins(app, environment) {
        if !is_valid_origin(&origin, environment) {
            continue;
        }

        let alternate = if matches!(environment, Environment::Development) {
            alternate_protocol_origin(&origin).filter(|alt| is_valid_origin(alt, environment))
        } else {
            None
        };

        validated.push(origin);
        validated.extend(alternate);
    }

    if validated.is_empty() {
        validated = environment_default_origins(environment);
    }

    let mut seen = std::collections::HashSet::new();
    validated.retain(|origin| seen.insert(origin.clone()));
    validated
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn app_with(origins: &[&str], frontend_url: &str) -> AppSettings {
        AppSettings {
            frontend_url: frontend_url.to_string(),
            allowed_origins: origins.iter().map(|o| o.to_string()).collect(),
            ..AppSettings::default()
        }
    }

    #[test]
    fn test_valid_origins() {
        let dev = Environment::Development;
        assert!(is_valid_origin("http://localhost:5173", &dev));
        assert!(is_valid_origin("https://example.com", &dev));
        assert!(!is_valid_origin("", &dev));
        assert!(!is_valid_origin("not-a-url", &dev));
        assert!(!is_valid_origin("ftp://example.com", &dev));
        assert!(!is_valid_origin("localhost:5173", &dev));
    }

    #[test]
    fn test_production_requires_https() {
        let prod = Environment::Production;
        assert!(is_valid_origin("https://example.com", &prod));
        assert!(!is_valid_origin("http://example.com", &prod));
    }

    #[test]
    fn test_alternate_protocol_keeps_localhost_port() {
        assert_eq!(
            alternate_protocol_origin("http://localhost:5173").as_deref(),
            Some("https://localhost:5173")
        );
        assert_eq!(
            alternate_protocol_origin("https://example.com:8443").as_deref(),
            Some("http://example.com")
        );
        assert_eq!(alternate_protocol_origin("ftp://example.com"), None);
    }

    #[test]
    fn test_development_adds_alternate_protocol() {
        let app = app_with(&["http://localhost:3000"], "");
        let origins = get_allowed_origins(&app, &Environment::Development);
        assert_eq!(
            origins,
            vec!["http://localhost:3000", "https://localhost:3000"]
        );
    }

    #[test]
    fn test_frontend_url_is_fallback() {
        let app = app_with(&[], "https://app.example.com");
        let origins = get_allowed_origins(&app, &Environment::Staging);
        assert_eq!(origins, vec!["https://app.example.com"]);
    }

    #[test]
    fn test_trailing_slash_is_stripped() {
        let app = app_with(&[], "http://localhost:5173/");
        assert_eq!(
            get_allowed_origins(&app, &Environment::Development),
            vec!["http://localhost:5173", "https://localhost:5173"]
        );

        let app = app_with(&["https://app.example.com/", "https://app.example.com"], "");
        assert_eq!(
            get_allowed_origins(&app, &Environment::Staging),
            vec!["https://app.example.com"]
        );
    }

    #[test]
    fn test_invalid_origins_fall_back_to_defaults() {
        let app = app_with(&["nonsense", "http://insecure.example.com"], "");
        let origins = get_allowed_origins(&app, &Environment::Production);
        assert_eq!(origins, vec!["https://your-production-domain.com"]);
    }

    #[test]
    fn test_duplicates_removed() {
        let app = app_with(
            &["http://localhost:5173", "https://localhost:5173", "http://localhost:5173"],
            "",
        );
        let origins = get_allowed_origins(&app, &Environment::Development);
        assert_eq!(
            origins,
            vec!["http://localhost:5173", "https://localhost:5173"]
        );
    }

    #[test]
    fn test_unconfigured_environments_use_defaults() {
        let app = app_with(&[], "");
        assert_eq!(
            get_allowed_origins(&app, &Environment::Development),
            vec!["http://localhost:5173", "https://localhost:5173"]
        );
        assert_eq!(
            get_allowed_origins(&app, &Environment::Testing),
            vec!["http://localhost:5173"]
        );
    }

    proptest! {
        #[test]
        fn prop_allowed_origins_never_empty_and_unique(
            origins in proptest::collection::vec("[a-z:/.0-9]{0,24}", 0..6)
        ) {
            let refs: Vec<&str> = origins.iter().map(String::as_str).collect();
            let app = app_with(&refs, "");
            for env in [Environment::Development, Environment::Staging, Environment::Production] {
                let result = get_allowed_origins(&app, &env);
                prop_assert!(!result.is_empty());
                let unique: std::collections::HashSet<_> = result.iter().collect();
                prop_assert_eq!(unique.len(), result.len());
                if env.is_production() {
                    let all_https = result.iter().all(|o| {
                        Url::parse(o).is_ok_and(|u| u.scheme() == "https")
                    });
                    prop_assert!(all_https);
                }
            }
        }
    }
}
