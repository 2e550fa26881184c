use crate::properties::PropertyStore;

/// State carried between init phases.
///
/// Holds the store of the configuration being initialized and the decisions
/// taken so far, which the closing summary reports.
#[derive(Debug)]
pub struct Session {
    pub configuration: String,
    pub properties: PropertyStore,
    pub account: Option<String>,
    pub project: Option<String>,
    pub zone: Option<String>,
    pub region: Option<String>,
}

impl Session {
    pub fn new(configuration: impl Into<String>, properties: PropertyStore) -> Self {
        Self {
            configuration: configuration.into(),
            properties,
            account: None,
            project: None,
            zone: None,
            region: None,
        }
    }
}
