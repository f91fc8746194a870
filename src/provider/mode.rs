use std::fmt;
use std::str::FromStr;

use super::ProviderError;

/// Lifecycle of the services a [`ServiceProducer`](super::ServiceProducer) hands out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "interchange", serde(try_from = "String", into = "String"))]
pub enum ServiceMode {
    /// Produce nothing.
    None,
    /// One shared instance, created on first use and never torn down.
    Singleton,
    /// A fresh instance per request.
    #[default]
    New,
}

impl ServiceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Singleton => "singleton",
            Self::New => "new",
        }
    }
}

impl fmt::Display for ServiceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceMode {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "singleton" => Ok(Self::Singleton),
            "new" => Ok(Self::New),
            _ => Err(ProviderError::UnknownMode {
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for ServiceMode {
    type Error = ProviderError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ServiceMode> for String {
    fn from(mode: ServiceMode) -> Self {
        mode.as_str().to_string()
    }
}
