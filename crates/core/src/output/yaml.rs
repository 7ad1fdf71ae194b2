use super::FormatError;
use crate::models::SymbolMap;

/// Convert SymbolMap to YAML
pub fn to_yaml(map: &SymbolMap) -> Result<String, FormatError> {
    serde_yaml::to_string(map).map_err(FormatError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ScanMetadata, SymbolStats};
    use std::path::PathBuf;

    #[test]
    fn test_to_yaml() {
        let map = SymbolMap {
            root: PathBuf::from("/test"),
            files: vec![],
            stats: SymbolStats::default(),
            metadata: ScanMetadata::default(),
        };

        let yaml = to_yaml(&map).unwrap();
        assert!(yaml.contains("root: /test"));
        assert!(yaml.contains("files: []"));
        assert!(yaml.contains("by_symbol: {}"));
    }
}
