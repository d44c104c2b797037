use pathfit_analysis::pipeline::AnalysisConfig;
use serde::{Deserialize, Serialize};

/// Analysis settings as read from a `--config` file.
///
/// Missing fields take their default values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    #[serde(flatten)]
    pub analysis: AnalysisConfig,
    /// Random seed for bootstrap resampling; drawn from the OS when absent
    pub seed: Option<u64>,
}
