use serde::{Deserialize, Serialize};

/// Size summary of a committed index snapshot.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexStats {
    pub classes: usize,
    pub members: usize,
    pub short_names: usize,
    pub archives: usize,
}
