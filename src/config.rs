//! Engine-wide configuration shared with binding layers.

use std::path::{Path, PathBuf};

/// Output file used when a caller does not name one.
pub const DEFAULT_OUTPUT: &str = "dpa_out.parquet";

/// Settings a binding layer (CLI, scripting host) applies before calling into the engine.
///
/// Engine operations always take an explicit output path; bindings call
/// [`EngineConfig::output_or_default`] to fill one in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Substituted for a missing output path. Parquet by default.
    pub default_output: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_output: PathBuf::from(DEFAULT_OUTPUT),
        }
    }
}

impl EngineConfig {
    /// `requested` if present, else the configured default.
    pub fn output_or_default(&self, requested: Option<&Path>) -> PathBuf {
        requested.map_or_else(|| self.default_output.clone(), Path::to_path_buf)
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::EngineConfig;

    #[test]
    fn substitutes_only_missing_outputs() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.output_or_default(None), PathBuf::from("dpa_out.parquet"));
        assert_eq!(
            cfg.output_or_default(Some(Path::new("x.csv"))),
            PathBuf::from("x.csv")
        );

        let custom = EngineConfig {
            default_output: PathBuf::from("/tmp/out.csv"),
        };
        assert_eq!(custom.output_or_default(None), PathBuf::from("/tmp/out.csv"));
    }
}
