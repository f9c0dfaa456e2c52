use anyhow::Result;

use crate::domain::model::SourceModel;

/// Resolved-model source port (implemented by an adapter).
pub trait ModelSource {
    fn load(&self) -> Result<SourceModel>;
}
