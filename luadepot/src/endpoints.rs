//! Source endpoint providers.

/// Supplies the ordered list of source repositories to try.
pub trait EndpointProvider: Send + Sync {
    /// Sources in priority order. May be empty.
    fn download_endpoints(&self) -> Vec<String>;
}

/// Fixed endpoint list, typically taken from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticEndpoints {
    repositories: Vec<String>,
}

impl StaticEndpoints {
    /// Create a provider from a list; blank entries are dropped.
    pub fn new<I, S>(repositories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            repositories: repositories
                .into_iter()
                .map(Into::into)
                .map(|r: String| r.trim().to_string())
                .filter(|r| !r.is_empty())
                .collect(),
        }
    }

    /// Parse a comma-separated list (the config file format).
    pub fn from_list(list: &str) -> Self {
        Self::new(list.split(','))
    }
}

impl EndpointProvider for StaticEndpoints {
    fn download_endpoints(&self) -> Vec<String> {
        self.repositories.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_list_trims_and_keeps_order() {
        let endpoints = StaticEndpoints::from_list(" b/two , a/one,,c/three ");
        assert_eq!(
            endpoints.download_endpoints(),
            vec!["b/two", "a/one", "c/three"]
        );
    }

    #[test]
    fn test_empty_list() {
        assert!(StaticEndpoints::from_list("").download_endpoints().is_empty());
        assert!(StaticEndpoints::default().download_endpoints().is_empty());
    }
}
