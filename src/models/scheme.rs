use serde::{Deserialize, Serialize};

/// A government-scheme record in the scheme registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scheme {
    pub scheme_name: String,
    pub description: String,
    #[serde(default)]
    pub ministry: Option<String>,
    #[serde(default)]
    pub benefits: Option<Vec<String>>,
}
