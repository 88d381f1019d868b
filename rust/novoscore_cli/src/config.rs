use novoscore::ScoringConfig;
use serde::{
    Deserialize,
    Serialize,
};
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    pub input: Option<InputConfig>,
    #[serde(default)]
    pub analysis: ScoringConfig,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct InputConfig {
    pub spectra: PathBuf,
    #[serde(default)]
    pub database: Option<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OutputConfig {
    pub directory: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use novoscore::models::InstrumentClass;

    #[test]
    fn test_partial_analysis_config() {
        let text = r#"{
            "input": {"spectra": "batch.json"},
            "analysis": {"instrument": "ftms", "fragment_tolerance": 0.02, "mass_multiplier": 10000},
            "output": {"directory": "out"}
        }"#;
        let config: Config = serde_json::from_str(text).unwrap();
        assert_eq!(config.analysis.instrument, InstrumentClass::Ftms);
        assert_eq!(config.analysis.output_count, 10);
        assert!(config.input.unwrap().database.is_none());
    }

    #[test]
    fn test_analysis_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.analysis, ScoringConfig::default());
        assert!(config.input.is_none());
    }
}
