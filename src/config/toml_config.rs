use crate::core::rules::OfficeRules;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{validate_range, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Rules file layout:
///
/// ```toml
/// [office]
/// shift_start = "10:00"
/// grace_limit = "10:15"
/// max_grace_per_month = 4
/// min_full_day_hours = 9.0
/// min_half_day_hours = 8.0
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RulesConfig {
    pub office: OfficeRules,
}

impl RulesConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;
        let config: Self = toml::from_str(&processed_content)?;
        Ok(config)
    }

    /// 替換環境變數 (例如 ${GRACE_LIMIT})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl Validate for RulesConfig {
    fn validate(&self) -> Result<()> {
        let office = &self.office;

        if office.grace_limit <= office.shift_start {
            return Err(EtlError::InvalidConfigValueError {
                field: "office.grace_limit".to_string(),
                value: office.grace_limit.to_string(),
                reason: format!("Must be later than shift_start ({})", office.shift_start),
            });
        }

        validate_range("office.min_full_day_hours", office.min_full_day_hours, 0.0, 24.0)?;
        validate_range("office.min_half_day_hours", office.min_half_day_hours, 0.0, 24.0)?;

        if office.min_half_day_hours > office.min_full_day_hours {
            return Err(EtlError::InvalidConfigValueError {
                field: "office.min_half_day_hours".to_string(),
                value: office.min_half_day_hours.to_string(),
                reason: format!(
                    "Must not exceed min_full_day_hours ({})",
                    office.min_full_day_hours
                ),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = RulesConfig::from_toml_str("").unwrap();
        assert_eq!(config, RulesConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_override() {
        let config = RulesConfig::from_toml_str(
            r#"
            [office]
            grace_limit = "10:30"
            max_grace_per_month = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.office.grace_limit, NaiveTime::from_hms_opt(10, 30, 0).unwrap());
        assert_eq!(config.office.shift_start, NaiveTime::from_hms_opt(10, 0, 0).unwrap());
        assert_eq!(config.office.max_grace_per_month, 3);
        assert_eq!(config.office.min_full_day_hours, 9.0);
    }

    #[test]
    fn test_env_substitution() {
        std::env::set_var("ATTENDANCE_TEST_MAX_GRACE", "6");
        let config = RulesConfig::from_toml_str(
            "[office]\nmax_grace_per_month = ${ATTENDANCE_TEST_MAX_GRACE}\n",
        )
        .unwrap();
        assert_eq!(config.office.max_grace_per_month, 6);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = RulesConfig::from_toml_str("[office]\nlunch_break = 30\n").unwrap_err();
        assert!(matches!(err, EtlError::TomlError(_)));
    }

    #[test]
    fn test_validate_rejects_inverted_values() {
        let mut config = RulesConfig::default();
        config.office.grace_limit = NaiveTime::from_hms_opt(9, 45, 0).unwrap();
        assert!(config.validate().is_err());

        let mut config = RulesConfig::default();
        config.office.min_half_day_hours = 9.5;
        assert!(config.validate().is_err());

        let mut config = RulesConfig::default();
        config.office.min_full_day_hours = 30.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_nan_hours() {
        let config = RulesConfig::from_toml_str(
            "[office]\nmin_full_day_hours = nan\nmin_half_day_hours = nan\n",
        )
        .unwrap();
        assert!(config.office.min_full_day_hours.is_nan());

        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            EtlError::InvalidConfigValueError { ref field, .. } if field == "office.min_full_day_hours"
        ));
    }
}
