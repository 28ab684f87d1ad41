use crate::utils::error::{EtlError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

/// Case-insensitive suffix check: `REPORT.CSV` and `.csv` both pass for `csv`.
pub fn validate_file_extension(
    field_name: &str,
    file: &str,
    allowed_extensions: &[&str],
) -> Result<()> {
    let lowered = file.to_ascii_lowercase();
    let matches = allowed_extensions
        .iter()
        .any(|ext| lowered.ends_with(&format!(".{}", ext.to_ascii_lowercase())));

    if matches {
        return Ok(());
    }

    Err(EtlError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: file.to_string(),
        reason: format!(
            "Unsupported file type. Allowed extensions: {}",
            allowed_extensions.join(", ")
        ),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    // Written so NaN fails too.
    if !(value >= min && value <= max) {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("output_dir", "./output").is_ok());
        assert!(validate_path("output_dir", "").is_err());
        assert!(validate_path("output_dir", "out\0put").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("max_upload_mb", 5, 1).is_ok());
        assert!(validate_positive_number("max_upload_mb", 0, 1).is_err());
    }

    #[test]
    fn test_validate_file_extension() {
        assert!(validate_file_extension("file", "march.csv", &["csv"]).is_ok());
        assert!(validate_file_extension("file", "MARCH.CSV", &["csv"]).is_ok());
        assert!(validate_file_extension("file", "march.xlsx", &["csv"]).is_err());
        assert!(validate_file_extension("file", "march", &["csv"]).is_err());
        assert!(validate_file_extension("file", ".csv", &["csv"]).is_ok());
        assert!(validate_file_extension("file", "march.csv.bak", &["csv"]).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("hours", 8.0, 0.0, 24.0).is_ok());
        assert!(validate_range("hours", 25.0, 0.0, 24.0).is_err());
        assert!(validate_range("hours", f64::NAN, 0.0, 24.0).is_err());
        assert!(validate_range("hours", f64::INFINITY, 0.0, 24.0).is_err());
        assert!(validate_non_empty_string("name", "  ").is_err());
    }
}
