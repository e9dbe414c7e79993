use serde::{Deserialize, Serialize};

/// How the metadata store treats a record that was already written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum WriteMode {
    /// Insert every call; a retried store produces a duplicate row
    #[default]
    Append,
    /// Insert only when no identical row exists
    SkipDuplicate,
}

impl std::fmt::Display for WriteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteMode::Append => write!(f, "append"),
            WriteMode::SkipDuplicate => write!(f, "skip-duplicate"),
        }
    }
}

impl std::str::FromStr for WriteMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "append" => Ok(WriteMode::Append),
            "skip-duplicate" | "skip_duplicate" => Ok(WriteMode::SkipDuplicate),
            _ => Err(format!("Invalid write mode: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_write_mode() {
        assert_eq!("append".parse::<WriteMode>().unwrap(), WriteMode::Append);
        assert_eq!(
            "Skip-Duplicate".parse::<WriteMode>().unwrap(),
            WriteMode::SkipDuplicate
        );
        assert!("upsert".parse::<WriteMode>().is_err());
    }

    #[test]
    fn test_display_parses_back() {
        for mode in [WriteMode::Append, WriteMode::SkipDuplicate] {
            assert_eq!(mode.to_string().parse::<WriteMode>().unwrap(), mode);
        }
    }
}
