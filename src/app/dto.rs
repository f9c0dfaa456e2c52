use serde::{Deserialize, Serialize};

/// Serializable result of one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub node_count: usize,
    pub edge_count: usize,
    /// Present when the type-scope rank computation failed on a cycle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_rank_error: Option<String>,
    /// Present when the package-scope rank computation failed on a cycle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_rank_error: Option<String>,
    pub artifacts: Vec<ArtifactRankDto>,
    pub packages: Vec<PackageCouplingDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactRankDto {
    pub key: String,
    pub name: String,
    pub cr: f64,
    pub rcr: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageCouplingDto {
    pub name: String,
    pub ca: usize,
    pub ce: usize,
    pub total_classes: u32,
    pub concrete_classes: u32,
    pub abstract_classes: u32,
    pub abstractness: f64,
    pub instability: f64,
    pub distance: f64,
    pub afferent: Vec<String>,
    pub efferent: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle: Option<Vec<String>>,
}
