use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BLOCK_VERSION, DEFAULT_DATA_INPUT_COST, DEFAULT_INPUT_COST, DEFAULT_MAX_BLOCK_COST,
    DEFAULT_OUTPUT_COST, DEFAULT_TOKEN_ACCESS_COST, MAX_BLOCK_VERSION, MIN_BLOCK_VERSION,
};
use crate::error::TxError;

/// Adjustable per-block parameters the pipeline charges costs against.
///
/// Missing fields fall back to the launch values, so a partial JSON document
/// such as `{"max_block_cost": 8000000}` is a valid configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockParameters {
    pub max_block_cost: u64,
    pub input_cost: u64,
    pub data_input_cost: u64,
    pub output_cost: u64,
    pub token_access_cost: u64,
    pub block_version: u8,
}

impl Default for BlockParameters {
    fn default() -> Self {
        Self {
            max_block_cost: DEFAULT_MAX_BLOCK_COST,
            input_cost: DEFAULT_INPUT_COST,
            data_input_cost: DEFAULT_DATA_INPUT_COST,
            output_cost: DEFAULT_OUTPUT_COST,
            token_access_cost: DEFAULT_TOKEN_ACCESS_COST,
            block_version: DEFAULT_BLOCK_VERSION,
        }
    }
}

impl BlockParameters {
    pub fn from_json_str(s: &str) -> Result<Self, TxError> {
        let params: BlockParameters =
            serde_json::from_str(s).map_err(|e| TxError::Params(e.to_string()))?;
        params.validate()?;
        Ok(params)
    }

    pub fn to_json_string(&self) -> Result<String, TxError> {
        serde_json::to_string_pretty(self).map_err(|e| TxError::Params(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), TxError> {
        if self.max_block_cost == 0 {
            return Err(TxError::Params("max_block_cost must be non-zero".into()));
        }
        VersionContext::for_block_version(self.block_version)?;
        Ok(())
    }

    pub fn version_context(&self) -> Result<VersionContext, TxError> {
        VersionContext::for_block_version(self.block_version)
    }
}

/// Script versions in force while reducing or decoding.
///
/// Always passed explicitly; nothing in the crate reads a process-wide
/// version.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VersionContext {
    pub activated_script_version: u8,
    pub ergo_tree_version: u8,
}

impl VersionContext {
    pub fn for_block_version(block_version: u8) -> Result<Self, TxError> {
        if !(MIN_BLOCK_VERSION..=MAX_BLOCK_VERSION).contains(&block_version) {
            return Err(TxError::Params(format!(
                "unsupported block version {block_version}"
            )));
        }
        let script_version = block_version - 1;
        Ok(Self {
            activated_script_version: script_version,
            ergo_tree_version: script_version,
        })
    }

    /// Whether a tree of `tree_version` may be decoded under this context.
    pub fn accepts_tree_version(&self, tree_version: u8) -> bool {
        tree_version <= self.activated_script_version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_uses_defaults() {
        let p = BlockParameters::from_json_str(r#"{"max_block_cost": 8000000}"#).unwrap();
        assert_eq!(p.max_block_cost, 8_000_000);
        assert_eq!(p.input_cost, DEFAULT_INPUT_COST);
        assert_eq!(p.block_version, DEFAULT_BLOCK_VERSION);
    }

    #[test]
    fn json_round_trip() {
        let p = BlockParameters {
            token_access_cost: 7,
            ..BlockParameters::default()
        };
        let s = p.to_json_string().unwrap();
        assert_eq!(BlockParameters::from_json_str(&s).unwrap(), p);
    }

    #[test]
    fn zero_limit_rejected() {
        let err = BlockParameters::from_json_str(r#"{"max_block_cost": 0}"#).unwrap_err();
        assert_eq!(err.code(), crate::ErrorCode::TxErrParams);
    }

    #[test]
    fn version_context_from_block_version() {
        let v = VersionContext::for_block_version(3).unwrap();
        assert_eq!(v.activated_script_version, 2);
        assert!(v.accepts_tree_version(2));
        assert!(!v.accepts_tree_version(3));
        assert!(VersionContext::for_block_version(0).is_err());
        assert!(VersionContext::for_block_version(MAX_BLOCK_VERSION + 1).is_err());
    }
}
