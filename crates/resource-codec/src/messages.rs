//! Protocol-buffer payloads of the built-in resources.
//!
//! Only the fields this layer reads are declared; unknown fields in a
//! server payload are skipped by the decoder.

/// Application configuration served by the distribution endpoint.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ApplicationConfiguration {
    #[prost(message, optional, tag = "1")]
    pub min_version: Option<SemanticVersion>,
    #[prost(message, optional, tag = "2")]
    pub latest_version: Option<SemanticVersion>,
    #[prost(string, repeated, tag = "3")]
    pub supported_countries: Vec<String>,
    #[prost(message, optional, tag = "4")]
    pub app_features: Option<AppFeatures>,
}

impl ApplicationConfiguration {
    /// Look up a feature flag by label.
    pub fn feature(&self, label: &str) -> Option<i32> {
        self.app_features
            .as_ref()?
            .app_features
            .iter()
            .find(|f| f.label == label)
            .map(|f| f.value)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ::prost::Message)]
pub struct SemanticVersion {
    #[prost(uint32, tag = "1")]
    pub major: u32,
    #[prost(uint32, tag = "2")]
    pub minor: u32,
    #[prost(uint32, tag = "3")]
    pub patch: u32,
}

impl std::fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AppFeatures {
    #[prost(message, repeated, tag = "1")]
    pub app_features: Vec<AppFeature>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AppFeature {
    #[prost(string, tag = "1")]
    pub label: String,
    #[prost(int32, tag = "2")]
    pub value: i32,
}

/// Key figure statistics.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Statistics {
    /// Display order of the cards below.
    #[prost(int32, repeated, tag = "1")]
    pub card_id_sequence: Vec<i32>,
    #[prost(message, repeated, tag = "2")]
    pub key_figure_cards: Vec<KeyFigureCard>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct KeyFigureCard {
    #[prost(message, optional, tag = "1")]
    pub header: Option<CardHeader>,
    #[prost(message, repeated, tag = "2")]
    pub key_figures: Vec<KeyFigure>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CardHeader {
    #[prost(int32, tag = "1")]
    pub card_id: i32,
    /// Unix timestamp (seconds) of the last update.
    #[prost(int64, tag = "2")]
    pub updated_at: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct KeyFigure {
    #[prost(double, tag = "1")]
    pub value: f64,
    #[prost(int32, tag = "2")]
    pub decimals: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_lookup() {
        let config = ApplicationConfiguration {
            app_features: Some(AppFeatures {
                app_features: vec![AppFeature {
                    label: "isDeviceTimeCheckEnabled".to_string(),
                    value: 1,
                }],
            }),
            ..Default::default()
        };
        assert_eq!(config.feature("isDeviceTimeCheckEnabled"), Some(1));
        assert_eq!(config.feature("unknown"), None);
    }

    #[test]
    fn test_semantic_version_ordering() {
        let older = SemanticVersion { major: 2, minor: 9, patch: 3 };
        let newer = SemanticVersion { major: 2, minor: 10, patch: 0 };
        assert!(older < newer);
        assert_eq!(newer.to_string(), "2.10.0");
    }
}
