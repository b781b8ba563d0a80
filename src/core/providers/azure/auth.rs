//! Azure Speech Services authentication headers.
//!
//! Requests authenticate with the subscription key passed in the
//! `Ocp-Apim-Subscription-Key` header. Exchanging the key for a bearer token
//! through the token endpoint is not needed for the REST synthesis API.
//!
//! See: <https://learn.microsoft.com/en-us/azure/ai-services/speech-service/rest-text-to-speech#authentication>

/// The HTTP header name for Azure subscription key authentication.
///
/// ```rust
/// use azure_speech_cli::core::providers::azure::AZURE_SUBSCRIPTION_KEY_HEADER;
///
/// assert_eq!(AZURE_SUBSCRIPTION_KEY_HEADER, "Ocp-Apim-Subscription-Key");
/// ```
pub const AZURE_SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

const VISIBLE_SUFFIX_LEN: usize = 4;
const MIN_PARTIALLY_VISIBLE_LEN: usize = 8;

/// Returns a printable form of a subscription key with everything but the
/// last four characters masked.
///
/// Keys too short to hide most of their characters are masked completely.
/// Used wherever the key ends up in logs.
pub fn mask_subscription_key(key: &str) -> String {
    let len = key.chars().count();
    if len <= MIN_PARTIALLY_VISIBLE_LEN {
        return "*".repeat(len);
    }

    let visible: String = key.chars().skip(len - VISIBLE_SUFFIX_LEN).collect();
    format!("{}{}", "*".repeat(len - VISIBLE_SUFFIX_LEN), visible)
}
