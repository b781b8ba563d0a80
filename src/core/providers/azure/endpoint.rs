//! Resolution of user-supplied endpoints into a synthesis URL.
//!
//! Users typically paste one of three things:
//!
//! - the portal "Endpoint" value, `https://{region}.api.cognitive.microsoft.com/sts/v1.0/issuetoken`
//! - a regional TTS host, `https://{region}.tts.speech.microsoft.com[/path]`
//! - a private or custom endpoint
//!
//! Azure hosts are normalized to the regional synthesis endpoint. Anything
//! else is used verbatim.

use url::Url;

use super::region::{AzureRegion, TTS_HOST_SUFFIX};

/// Endpoint resolution failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EndpointError {
    #[error("either an endpoint or a region must be provided")]
    Missing,

    #[error("invalid endpoint URL '{0}': {1}")]
    InvalidUrl(String, String),

    #[error("unsupported endpoint scheme '{0}', expected http or https")]
    UnsupportedScheme(String),

    #[error("endpoint '{0}' has no host")]
    MissingHost(String),
}

/// A resolved synthesis endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechEndpoint {
    url: Url,
    region: Option<AzureRegion>,
}

impl SpeechEndpoint {
    /// Resolves an endpoint string, falling back to a region identifier.
    ///
    /// ```rust
    /// use azure_speech_cli::core::providers::azure::SpeechEndpoint;
    ///
    /// let endpoint = SpeechEndpoint::resolve(
    ///     Some("https://eastasia.api.cognitive.microsoft.com/sts/v1.0/issuetoken"),
    ///     None,
    /// )
    /// .unwrap();
    /// assert_eq!(
    ///     endpoint.as_str(),
    ///     "https://eastasia.tts.speech.microsoft.com/cognitiveservices/v1"
    /// );
    /// ```
    pub fn resolve(endpoint: Option<&str>, region: Option<&str>) -> Result<Self, EndpointError> {
        let endpoint = endpoint.map(str::trim).filter(|e| !e.is_empty());
        let region = region.map(str::trim).filter(|r| !r.is_empty());

        match (endpoint, region) {
            (Some(endpoint), _) => Self::from_endpoint(endpoint),
            (None, Some(region)) => {
                let Ok(region) = region.parse::<AzureRegion>();
                Self::from_region(region)
            }
            (None, None) => Err(EndpointError::Missing),
        }
    }

    /// Builds the regional synthesis endpoint.
    pub fn from_region(region: AzureRegion) -> Result<Self, EndpointError> {
        let raw = region.tts_rest_url();
        let url = Url::parse(&raw).map_err(|e| EndpointError::InvalidUrl(raw, e.to_string()))?;
        Ok(Self {
            url,
            region: Some(region),
        })
    }

    fn from_endpoint(endpoint: &str) -> Result<Self, EndpointError> {
        let url = Url::parse(endpoint)
            .map_err(|e| EndpointError::InvalidUrl(endpoint.to_string(), e.to_string()))?;

        let scheme = url.scheme().to_string();
        if !matches!(scheme.as_str(), "http" | "https" | "ws" | "wss") {
            return Err(EndpointError::UnsupportedScheme(scheme));
        }

        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| EndpointError::MissingHost(endpoint.to_string()))?
            .to_string();

        if let Some(region) = AzureRegion::from_hostname(&host) {
            let is_tts_host = host.to_ascii_lowercase().ends_with(TTS_HOST_SUFFIX);
            let has_path = !matches!(url.path(), "" | "/");
            if is_tts_host && scheme == "https" && has_path {
                return Ok(Self {
                    url,
                    region: Some(region),
                });
            }
            return Self::from_region(region);
        }

        if !matches!(scheme.as_str(), "http" | "https") {
            return Err(EndpointError::UnsupportedScheme(scheme));
        }

        Ok(Self { url, region: None })
    }

    /// The synthesis URL.
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// The Azure region, when the endpoint is a regional Azure host.
    pub fn region(&self) -> Option<&AzureRegion> {
        self.region.as_ref()
    }
}
