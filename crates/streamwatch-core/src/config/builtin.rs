use crate::config::parse_config_str;
use crate::config::schema::DatasetConfig;
use crate::error::StreamwatchError;

const BIOMONITORING_JSON: &str = include_str!("../../../../presets/biomonitoring.json");
const PWQMN_JSON: &str = include_str!("../../../../presets/pwqmn.json");
const TEMPERATURE_JSON: &str = include_str!("../../../../presets/temperature.json");
const TEMPERATURE_SITES_JSON: &str = include_str!("../../../../presets/temperature-sites.json");

/// Available predefined dataset configs.
pub const PRESETS: &[&str] = &["biomonitoring", "pwqmn", "temperature", "temperature-sites"];

/// Raw JSON of a preset, as compiled in.
pub fn preset_json(name: &str) -> Result<&'static str, StreamwatchError> {
    match name {
        "biomonitoring" => Ok(BIOMONITORING_JSON),
        "pwqmn" => Ok(PWQMN_JSON),
        "temperature" => Ok(TEMPERATURE_JSON),
        "temperature-sites" => Ok(TEMPERATURE_SITES_JSON),
        _ => Err(StreamwatchError::ConfigInvalid(format!(
            "unknown preset '{}'. Available: {}",
            name,
            PRESETS.join(", ")
        ))),
    }
}

/// Load a predefined dataset config by name.
pub fn load_preset(name: &str) -> Result<DatasetConfig, StreamwatchError> {
    parse_config_str(preset_json(name)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_all_presets_load() {
        for name in PRESETS {
            let config = load_preset(name).unwrap();
            assert_eq!(config.name, *name);
        }
    }

    #[test]
    fn test_unknown_preset() {
        assert!(load_preset("xyz").is_err());
    }

    #[test]
    fn test_biomonitoring_bands() {
        let config = load_preset("biomonitoring").unwrap();
        assert_eq!(config.classifications.len(), 2);
        let index = &config.classifications[0];
        assert_eq!(index.bands.len(), 7);
        assert_eq!(index.bands[0].upper, Some(dec!(3.75)));
        assert_eq!(index.bands[6].upper, Some(dec!(10)));
        let organisms = &config.classifications[1];
        assert_eq!(organisms.bands.len(), 2);
        assert!(!organisms.bands[0].inclusive);
        assert_eq!(organisms.bands[1].upper, None);
    }

    #[test]
    fn test_pwqmn_keeps_trailing_space_code() {
        let config = load_preset("pwqmn").unwrap();
        let allow = config.allow_list.unwrap();
        assert!(allow.codes.iter().any(|c| c == "RSP "));
        assert!(!allow.codes.iter().any(|c| c == "RSP"));
        let thresholds = config.thresholds.unwrap();
        let pput = thresholds.rules.iter().find(|r| r.parameter == "PPUT").unwrap();
        assert_eq!(pput.cutoff, dec!(30));
    }
}
