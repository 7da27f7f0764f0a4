pub mod errors;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub use errors::{Error, Result};

/// Severity attached to a detected change.
///
/// `Major`, `Minor` and `Patch` map onto semantic version bump levels.
/// `Warn` marks advisory findings that never influence the recommended level.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Copy, Ord, PartialOrd)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warn,
    Patch,
    Minor,
    Major,
}

impl Severity {
    /// Levels that participate in bump selection, strongest first.
    pub const BUMP_LEVELS: [Severity; 3] = [Severity::Major, Severity::Minor, Severity::Patch];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Warn => "warn",
            Severity::Patch => "patch",
            Severity::Minor => "minor",
            Severity::Major => "major",
        }
    }

    pub fn affects_bump(&self) -> bool {
        !matches!(self, Severity::Warn)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "warn" => Ok(Severity::Warn),
            "patch" => Ok(Severity::Patch),
            "minor" => Ok(Severity::Minor),
            "major" => Ok(Severity::Major),
            other => Err(Error::Configuration(format!(
                "unknown severity '{other}' (expected major, minor, patch or warn)"
            ))),
        }
    }
}

/// One severity-tagged difference between the base and head snapshots.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Impact {
    pub severity: Severity,
    pub symbol: String,
    pub reason: String,
}

impl Impact {
    pub fn new(severity: Severity, symbol: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            severity,
            symbol: symbol.into(),
            reason: reason.into(),
        }
    }

    pub fn major(symbol: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(Severity::Major, symbol, reason)
    }

    pub fn minor(symbol: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(Severity::Minor, symbol, reason)
    }

    pub fn warn(symbol: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(Severity::Warn, symbol, reason)
    }
}

impl std::fmt::Display for Impact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.severity.as_str().to_uppercase(),
            self.symbol,
            self.reason
        )
    }
}

/// Aggregated bump recommendation for one run.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Decision {
    /// Recommended level, `None` when nothing bump-worthy was found.
    pub level: Option<Severity>,
    /// Share of bump-affecting impacts that carry `level`, in `[0, 1]`.
    pub confidence: f64,
    pub reasons: Vec<String>,
}

impl Decision {
    pub fn none() -> Self {
        Self {
            level: None,
            confidence: 0.0,
            reasons: Vec::new(),
        }
    }

    pub fn level_label(&self) -> &'static str {
        self.level.map(|l| l.as_str()).unwrap_or("none")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Major > Severity::Minor);
        assert!(Severity::Minor > Severity::Patch);
        assert!(Severity::Patch > Severity::Warn);
    }

    #[test]
    fn test_severity_from_str() {
        assert_eq!("MAJOR".parse::<Severity>().unwrap(), Severity::Major);
        assert_eq!(" minor ".parse::<Severity>().unwrap(), Severity::Minor);
        assert!("huge".parse::<Severity>().is_err());
    }

    #[test]
    fn test_severity_serde_lowercase() {
        let json = serde_json::to_string(&Severity::Major).unwrap();
        assert_eq!(json, "\"major\"");
        let back: Severity = serde_json::from_str("\"warn\"").unwrap();
        assert_eq!(back, Severity::Warn);
    }

    #[test]
    fn test_impact_display() {
        let impact = Impact::major("m:f", "Removed public symbol");
        assert_eq!(impact.to_string(), "[MAJOR] m:f: Removed public symbol");
    }

    #[test]
    fn test_decision_none_label() {
        assert_eq!(Decision::none().level_label(), "none");
    }
}
