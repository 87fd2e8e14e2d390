use crate::config::Config;
use crate::errors::AppError;
use url::Url;

/// Logical upstream services the gateway can address.
///
/// A closed enum: routing to an unknown service is unrepresentable rather
/// than a request-time failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Listing,
    User,
}

impl Service {
    /// Label used in client-facing error messages and logs.
    pub fn label(self) -> &'static str {
        match self {
            Service::Listing => "Listing service",
            Service::User => "User service",
        }
    }
}

/// Maps logical services to their configured base addresses and builds
/// fully-qualified request URLs.
#[derive(Debug, Clone)]
pub struct ServiceRouter {
    listing_base: String,
    user_base: String,
}

impl ServiceRouter {
    /// Validates the configured base addresses and builds the router.
    ///
    /// A bad address is a configuration error and aborts startup; requests
    /// never see it.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        for (name, value) in [
            ("LISTING_SERVICE_URL", &config.listing_service_url),
            ("USER_SERVICE_URL", &config.user_service_url),
        ] {
            Url::parse(value).map_err(|e| {
                anyhow::anyhow!("{} is not a valid base URL ({}): {}", name, value, e)
            })?;
        }

        Ok(Self {
            listing_base: config.listing_service_url.trim_end_matches('/').to_string(),
            user_base: config.user_service_url.trim_end_matches('/').to_string(),
        })
    }

    fn base(&self, service: Service) -> &str {
        match service {
            Service::Listing => &self.listing_base,
            Service::User => &self.user_base,
        }
    }

    /// Resolves a logical path against a service's base address.
    pub fn resolve(&self, service: Service, path: &str) -> Result<Url, AppError> {
        Url::parse(&format!("{}{}", self.base(service), path)).map_err(|e| {
            AppError::InternalError(format!(
                "Failed to build {} URL for {}: {}",
                service.label(),
                path,
                e
            ))
        })
    }

    /// Resolves a path and appends properly encoded query parameters.
    pub fn resolve_with_params(
        &self,
        service: Service,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Url, AppError> {
        Url::parse_with_params(&format!("{}{}", self.base(service), path), params).map_err(|e| {
            AppError::InternalError(format!(
                "Failed to build {} URL for {}: {}",
                service.label(),
                path,
                e
            ))
        })
    }
}
