use serde::{Deserialize, Serialize};

use crate::config::{BaseUrls, Environment};

/// An entry of an OpenAPI document's top-level `servers` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerEntry {
    pub url: String,
    pub description: String,
}

/// Whether documentation built for `active` may advertise servers of `target`.
///
/// Clients built against local or dev also work against prod, but not the
/// other way round, so lower environments are hidden from higher ones.
fn is_visible(active: Environment, target: Environment) -> bool {
    match active {
        Environment::Prod => target == Environment::Prod,
        Environment::Dev => target != Environment::Local,
        Environment::Local => true,
    }
}

/// Build the server list for a path prefix such as `/v1/trade`.
pub fn build_servers(prefix: &str, env: Environment, base_urls: &BaseUrls) -> Vec<ServerEntry> {
    let mut targets: Vec<Environment> = Environment::ALL
        .into_iter()
        .filter(|target| is_visible(env, *target))
        .collect();

    // The active target leads when running locally.
    if env == Environment::Local {
        targets.sort_by_key(|target| *target != Environment::Local);
    }

    targets
        .into_iter()
        .map(|target| ServerEntry {
            url: format!("{}{}", base_urls.get(target).trim_end_matches('/'), prefix),
            description: target.description().to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptions(servers: &[ServerEntry]) -> Vec<&str> {
        servers.iter().map(|s| s.description.as_str()).collect()
    }

    #[test]
    fn test_prod_only_shows_production() {
        let servers = build_servers("/v1/trade", Environment::Prod, &BaseUrls::default());
        assert_eq!(
            servers,
            vec![ServerEntry {
                url: "https://api.crypticorn.com/v1/trade".to_string(),
                description: "Production".to_string(),
            }]
        );
    }

    #[test]
    fn test_prod_never_leaks_lower_environments() {
        for prefix in ["", "/", "/v1/trade", "/v2/auth/", "local"] {
            let servers = build_servers(prefix, Environment::Prod, &BaseUrls::default());
            for entry in &servers {
                assert_ne!(entry.description, "Local");
                assert_ne!(entry.description, "Development");
            }
        }
    }

    #[test]
    fn test_dev_hides_local() {
        let servers = build_servers("/v1/pay", Environment::Dev, &BaseUrls::default());
        assert_eq!(descriptions(&servers), vec!["Development", "Production"]);
        assert_eq!(servers[0].url, "https://api.crypticorn.dev/v1/pay");
    }

    #[test]
    fn test_local_shows_all_with_local_first() {
        let servers = build_servers("/v1/hive", Environment::Local, &BaseUrls::default());
        assert_eq!(
            descriptions(&servers),
            vec!["Local", "Development", "Production"]
        );
        assert_eq!(servers[0].url, "http://localhost/v1/hive");
    }

    #[test]
    fn test_custom_base_urls_with_trailing_slash() {
        let base_urls = BaseUrls {
            local: "http://127.0.0.1:8080/".to_string(),
            dev: "https://dev.example.com".to_string(),
            prod: "https://example.com".to_string(),
        };
        let servers = build_servers("/v1/auth", Environment::Local, &base_urls);
        assert_eq!(servers[0].url, "http://127.0.0.1:8080/v1/auth");
        assert_eq!(servers[2].url, "https://example.com/v1/auth");
    }
}
