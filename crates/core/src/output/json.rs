use super::FormatError;
use crate::models::SymbolMap;

/// Convert SymbolMap to pretty-printed JSON
pub fn to_json(map: &SymbolMap) -> Result<String, FormatError> {
    serde_json::to_string_pretty(map).map_err(FormatError::from)
}
