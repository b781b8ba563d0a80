//! Microsoft Azure Speech Services provider infrastructure.
//!
//! Shared pieces used by the Azure synthesizer:
//!
//! - **region**: regional hostnames and endpoint URLs
//! - **endpoint**: normalization of user-supplied endpoints
//! - **auth**: subscription key header
//!
//! See: <https://learn.microsoft.com/en-us/azure/ai-services/speech-service/>

pub mod auth;
pub mod endpoint;
pub mod region;

pub use auth::{AZURE_SUBSCRIPTION_KEY_HEADER, mask_subscription_key};
pub use endpoint::{EndpointError, SpeechEndpoint};
pub use region::AzureRegion;
