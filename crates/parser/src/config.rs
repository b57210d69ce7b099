//! Converter configuration

/// Knobs for one conversion run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterConfig {
    /// Schemas with any other version tag are ignored
    pub supported_version: String,

    /// Column at which long single-line descriptions are wrapped
    pub wrap_width: usize,

    /// Parent of every node type
    pub root_node_type: String,

    /// Parent of object data types, and the type of untyped object properties
    pub root_data_type: String,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            supported_version: "v1".to_string(),
            wrap_width: 70,
            root_node_type: "tosca.nodes.Root".to_string(),
            root_data_type: "tosca.datatypes.Root".to_string(),
        }
    }
}

impl ConverterConfig {
    pub fn with_supported_version(mut self, version: impl Into<String>) -> Self {
        self.supported_version = version.into();
        self
    }

    pub fn with_wrap_width(mut self, width: usize) -> Self {
        self.wrap_width = width;
        self
    }
}
