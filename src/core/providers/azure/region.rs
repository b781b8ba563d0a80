//! Microsoft Azure Speech Service region configuration.
//!
//! Regions determine which regional host serves synthesis requests. The
//! subscription key is tied to the region its Speech resource was created in,
//! so the region must match the key.
//!
//! # Example
//!
//! ```rust
//! use azure_speech_cli::core::providers::azure::AzureRegion;
//!
//! let region = AzureRegion::WestEurope;
//! assert_eq!(region.tts_hostname(), "westeurope.tts.speech.microsoft.com");
//! ```
//!
//! See: <https://learn.microsoft.com/en-us/azure/ai-services/speech-service/regions>

use std::fmt;

/// Host suffix of the regional Text-to-Speech REST service.
pub const TTS_HOST_SUFFIX: &str = ".tts.speech.microsoft.com";

/// Host suffix of the regional Cognitive Services API endpoint.
pub const COGNITIVE_API_HOST_SUFFIX: &str = ".api.cognitive.microsoft.com";

/// Microsoft Azure Speech Service regions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AzureRegion {
    /// East US (Virginia)
    #[default]
    EastUS,
    /// East US 2 (Virginia)
    EastUS2,
    /// West US (California)
    WestUS,
    /// West US 2 (Washington)
    WestUS2,
    /// West US 3 (Arizona)
    WestUS3,
    /// Central US (Iowa)
    CentralUS,
    /// North Central US (Illinois)
    NorthCentralUS,
    /// South Central US (Texas)
    SouthCentralUS,
    /// West Europe (Netherlands)
    WestEurope,
    /// North Europe (Ireland)
    NorthEurope,
    /// UK South (London)
    UKSouth,
    /// France Central (Paris)
    FranceCentral,
    /// Germany West Central (Frankfurt)
    GermanyWestCentral,
    /// Switzerland North (Zurich)
    SwitzerlandNorth,
    /// East Asia (Hong Kong)
    EastAsia,
    /// Southeast Asia (Singapore)
    SoutheastAsia,
    /// Japan East (Tokyo)
    JapanEast,
    /// Japan West (Osaka)
    JapanWest,
    /// Korea Central (Seoul)
    KoreaCentral,
    /// Australia East (Sydney)
    AustraliaEast,
    /// Canada Central (Toronto)
    CanadaCentral,
    /// Brazil South (Sao Paulo)
    BrazilSouth,
    /// India Central (Pune)
    IndiaCentral,
    /// Region not explicitly listed above.
    Custom(String),
}

impl AzureRegion {
    /// Region identifier as used in Azure hostnames.
    #[inline]
    pub fn as_str(&self) -> &str {
        match self {
            Self::EastUS => "eastus",
            Self::EastUS2 => "eastus2",
            Self::WestUS => "westus",
            Self::WestUS2 => "westus2",
            Self::WestUS3 => "westus3",
            Self::CentralUS => "centralus",
            Self::NorthCentralUS => "northcentralus",
            Self::SouthCentralUS => "southcentralus",
            Self::WestEurope => "westeurope",
            Self::NorthEurope => "northeurope",
            Self::UKSouth => "uksouth",
            Self::FranceCentral => "francecentral",
            Self::GermanyWestCentral => "germanywestcentral",
            Self::SwitzerlandNorth => "switzerlandnorth",
            Self::EastAsia => "eastasia",
            Self::SoutheastAsia => "southeastasia",
            Self::JapanEast => "japaneast",
            Self::JapanWest => "japanwest",
            Self::KoreaCentral => "koreacentral",
            Self::AustraliaEast => "australiaeast",
            Self::CanadaCentral => "canadacentral",
            Self::BrazilSouth => "brazilsouth",
            Self::IndiaCentral => "centralindia",
            Self::Custom(region) => region.as_str(),
        }
    }

    /// Extracts the region from an Azure Speech or Cognitive Services hostname.
    ///
    /// Recognizes `{region}.tts.speech.microsoft.com` and
    /// `{region}.api.cognitive.microsoft.com`. Returns `None` for any other host.
    ///
    /// ```rust
    /// use azure_speech_cli::core::providers::azure::AzureRegion;
    ///
    /// assert_eq!(
    ///     AzureRegion::from_hostname("eastasia.api.cognitive.microsoft.com"),
    ///     Some(AzureRegion::EastAsia)
    /// );
    /// assert_eq!(AzureRegion::from_hostname("localhost"), None);
    /// ```
    pub fn from_hostname(host: &str) -> Option<Self> {
        let host = host.to_ascii_lowercase();
        let prefix = host
            .strip_suffix(TTS_HOST_SUFFIX)
            .or_else(|| host.strip_suffix(COGNITIVE_API_HOST_SUFFIX))?;

        if prefix.is_empty() || prefix.contains('.') {
            return None;
        }

        prefix.parse().ok()
    }

    /// TTS hostname for this region: `<region>.tts.speech.microsoft.com`.
    #[inline]
    pub fn tts_hostname(&self) -> String {
        format!("{}{}", self.as_str(), TTS_HOST_SUFFIX)
    }

    /// Synthesis endpoint: `https://<region>.tts.speech.microsoft.com/cognitiveservices/v1`.
    ///
    /// ```rust
    /// use azure_speech_cli::core::providers::azure::AzureRegion;
    ///
    /// assert_eq!(
    ///     AzureRegion::EastUS.tts_rest_url(),
    ///     "https://eastus.tts.speech.microsoft.com/cognitiveservices/v1"
    /// );
    /// ```
    #[inline]
    pub fn tts_rest_url(&self) -> String {
        format!("https://{}/cognitiveservices/v1", self.tts_hostname())
    }
}

impl fmt::Display for AzureRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AzureRegion {
    type Err = std::convert::Infallible;

    /// Known identifiers map to explicit variants, anything else becomes `Custom`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let region = match s.to_lowercase().as_str() {
            "eastus" => Self::EastUS,
            "eastus2" => Self::EastUS2,
            "westus" => Self::WestUS,
            "westus2" => Self::WestUS2,
            "westus3" => Self::WestUS3,
            "centralus" => Self::CentralUS,
            "northcentralus" => Self::NorthCentralUS,
            "southcentralus" => Self::SouthCentralUS,
            "westeurope" => Self::WestEurope,
            "northeurope" => Self::NorthEurope,
            "uksouth" => Self::UKSouth,
            "francecentral" => Self::FranceCentral,
            "germanywestcentral" => Self::GermanyWestCentral,
            "switzerlandnorth" => Self::SwitzerlandNorth,
            "eastasia" => Self::EastAsia,
            "southeastasia" => Self::SoutheastAsia,
            "japaneast" => Self::JapanEast,
            "japanwest" => Self::JapanWest,
            "koreacentral" => Self::KoreaCentral,
            "australiaeast" => Self::AustraliaEast,
            "canadacentral" => Self::CanadaCentral,
            "brazilsouth" => Self::BrazilSouth,
            "centralindia" => Self::IndiaCentral,
            other => Self::Custom(other.to_string()),
        };
        Ok(region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_azure_region_default() {
        assert_eq!(AzureRegion::default(), AzureRegion::EastUS);
    }

    #[test]
    fn test_azure_region_tts_endpoints() {
        let region = AzureRegion::SoutheastAsia;
        assert_eq!(region.tts_hostname(), "southeastasia.tts.speech.microsoft.com");
        assert_eq!(
            region.tts_rest_url(),
            "https://southeastasia.tts.speech.microsoft.com/cognitiveservices/v1"
        );
    }

    #[test]
    fn test_azure_region_from_str_case_insensitive() {
        assert_eq!("EASTUS".parse::<AzureRegion>().unwrap(), AzureRegion::EastUS);
        assert_eq!(
            "WestEurope".parse::<AzureRegion>().unwrap(),
            AzureRegion::WestEurope
        );
        assert_eq!(
            "centralindia".parse::<AzureRegion>().unwrap(),
            AzureRegion::IndiaCentral
        );
    }

    #[test]
    fn test_azure_region_from_str_unknown_is_custom() {
        assert_eq!(
            "newregion".parse::<AzureRegion>().unwrap(),
            AzureRegion::Custom("newregion".to_string())
        );
    }

    #[test]
    fn test_azure_region_from_hostname() {
        assert_eq!(
            AzureRegion::from_hostname("westus2.tts.speech.microsoft.com"),
            Some(AzureRegion::WestUS2)
        );
        assert_eq!(
            AzureRegion::from_hostname("EastAsia.API.Cognitive.Microsoft.com"),
            Some(AzureRegion::EastAsia)
        );
        assert_eq!(
            AzureRegion::from_hostname("myregion.tts.speech.microsoft.com"),
            Some(AzureRegion::Custom("myregion".to_string()))
        );
    }

    #[test]
    fn test_azure_region_from_hostname_rejects_other_hosts() {
        assert_eq!(AzureRegion::from_hostname("example.com"), None);
        assert_eq!(AzureRegion::from_hostname(".tts.speech.microsoft.com"), None);
        assert_eq!(
            AzureRegion::from_hostname("a.b.tts.speech.microsoft.com"),
            None
        );
    }

    #[test]
    fn test_azure_region_display() {
        assert_eq!(AzureRegion::JapanEast.to_string(), "japaneast");
        assert_eq!(AzureRegion::Custom("x".to_string()).to_string(), "x");
    }
}
