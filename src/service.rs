use url::Url;

/// Connection metadata of the embedded service, produced once per bootstrap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceHandle {
    address: String,
    port: u16,
    routes: Vec<String>,
}

impl ServiceHandle {
    pub fn new(address: impl Into<String>, port: u16, routes: Vec<String>) -> Self {
        Self {
            address: address.into(),
            port,
            routes,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn routes(&self) -> &[String] {
        &self.routes
    }

    /// `http://{address}:{port}`, the only URL a window is pointed at.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", host_for_url(&self.address), self.port)
    }

    pub fn route_url(&self, route: &str) -> String {
        let trimmed = route.trim().trim_matches('/');
        if trimmed.is_empty() {
            format!("{}/", self.base_url())
        } else {
            format!("{}/{}", self.base_url(), trimmed)
        }
    }
}

// IPv6 literals need brackets inside a URL authority.
fn host_for_url(address: &str) -> String {
    if address.contains(':') && !address.starts_with('[') {
        format!("[{address}]")
    } else {
        address.to_string()
    }
}

pub fn parse_service_url(raw_url: &str) -> Result<Url, String> {
    let parsed = Url::parse(raw_url).map_err(|error| format!("Invalid service URL: {error}"))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(format!(
            "Unsupported service URL scheme '{scheme}', only http/https are allowed."
        )),
    }
}

/// Starts the embedded service. Called at most once per process.
pub trait ServiceBootstrapper: Send + Sync {
    fn bootstrap(&self) -> Result<ServiceHandle, String>;

    fn shutdown(&self) -> Result<(), String> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_has_no_path() {
        let handle = ServiceHandle::new("127.0.0.1", 8009, vec!["".to_string()]);
        assert_eq!(handle.base_url(), "http://127.0.0.1:8009");
    }

    #[test]
    fn base_url_brackets_ipv6_addresses() {
        let handle = ServiceHandle::new("::1", 8009, Vec::new());
        assert_eq!(handle.base_url(), "http://[::1]:8009");
        assert!(parse_service_url(&handle.base_url()).is_ok());
    }

    #[test]
    fn route_url_joins_trimmed_route() {
        let handle = ServiceHandle::new("localhost", 80, Vec::new());
        assert_eq!(handle.route_url(""), "http://localhost:80/");
        assert_eq!(handle.route_url("/widget/"), "http://localhost:80/widget");
        assert_eq!(handle.route_url("api"), "http://localhost:80/api");
    }

    #[test]
    fn parse_service_url_rejects_non_http_schemes() {
        assert!(parse_service_url("http://127.0.0.1:8009").is_ok());
        assert!(parse_service_url("file:///etc/passwd").is_err());
        assert!(parse_service_url("not a url").is_err());
    }
}
