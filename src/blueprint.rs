//! Named route groups and the endpoint registry
//!
//! Each feature module exposes a [`Blueprint`]: a router plus the names of
//! its endpoints. Endpoints are registered as `<blueprint>.<endpoint>` so
//! the application can resolve a name to its path, and a name registered
//! twice stops startup.

use axum::{routing::MethodRouter, Router};
use indexmap::IndexMap;

use crate::{
    error::{AppError, AppResult},
    AppState,
};

pub struct Blueprint {
    name: &'static str,
    prefix: &'static str,
    router: Router<AppState>,
    endpoints: Vec<(&'static str, String)>,
}

impl Blueprint {
    pub fn new(name: &'static str, prefix: &'static str) -> Self {
        Self {
            name,
            prefix,
            router: Router::new(),
            endpoints: Vec::new(),
        }
    }

    /// Add a route. Several endpoints may share a path with different methods.
    pub fn route(mut self, endpoint: &'static str, path: &str, handler: MethodRouter<AppState>) -> Self {
        let full_path = join_path(self.prefix, path);
        self.router = self.router.route(&full_path, handler);
        self.endpoints.push((endpoint, full_path));
        self
    }
}

fn join_path(prefix: &str, path: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    match (prefix.is_empty(), path.is_empty()) {
        (true, true) => "/".to_string(),
        (false, true) => prefix.to_string(),
        _ => format!("{}/{}", prefix, path),
    }
}

/// Endpoint name to path, in registration order
#[derive(Debug, Default, Clone)]
pub struct EndpointRegistry {
    endpoints: IndexMap<String, String>,
}

impl EndpointRegistry {
    pub fn url_for(&self, endpoint: &str) -> Option<&str> {
        self.endpoints.get(endpoint).map(String::as_str)
    }

    /// First endpoint of `candidates` that is registered
    pub fn first_registered(&self, candidates: &[&str]) -> Option<&str> {
        candidates.iter().find_map(|endpoint| self.url_for(endpoint))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.endpoints.iter().map(|(name, path)| (name.as_str(), path.as_str()))
    }
}

/// Collects blueprints into one router
#[derive(Default)]
pub struct RouterBuilder {
    registry: EndpointRegistry,
    router: Router<AppState>,
}

impl RouterBuilder {
    pub fn register(mut self, blueprint: Blueprint) -> AppResult<Self> {
        for (endpoint, path) in &blueprint.endpoints {
            let qualified = format!("{}.{}", blueprint.name, endpoint);
            if self.registry.endpoints.contains_key(&qualified) {
                return Err(AppError::Internal(format!(
                    "Endpoint {} registered twice",
                    qualified
                )));
            }
            tracing::debug!("Registered {} -> {}", qualified, path);
            self.registry.endpoints.insert(qualified, path.clone());
        }

        self.router = self.router.merge(blueprint.router);
        Ok(self)
    }

    pub fn finish(self) -> (EndpointRegistry, Router<AppState>) {
        (self.registry, self.router)
    }
}
