//! Run configuration.

use crate::core::ledger::DEFAULT_LEDGER_FILE_NAME;
use crate::core::scanner::ScanConfig;
use crate::error::BatchCopyError;

/// Copies per run when nothing else is configured
pub const DEFAULT_BATCH_SIZE: usize = 2;

/// Configuration for a copy run
#[derive(Debug, Clone)]
pub struct CopyConfig {
    /// Maximum files copied per run
    pub batch_size: usize,
    /// Ledger file name, created inside the source root
    pub ledger_file_name: String,
    /// Scanner configuration
    pub scan: ScanConfig,
}

impl Default for CopyConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            ledger_file_name: DEFAULT_LEDGER_FILE_NAME.to_string(),
            scan: ScanConfig::default(),
        }
    }
}

impl CopyConfig {
    /// Reject settings that would make a run meaningless
    pub fn validate(&self) -> Result<(), BatchCopyError> {
        if self.batch_size == 0 {
            return Err(BatchCopyError::Config(
                "batch size must be at least 1".to_string(),
            ));
        }

        let name = self.ledger_file_name.as_str();
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(BatchCopyError::Config(format!(
                "ledger file name must be a plain file name, got {:?}",
                name
            )));
        }

        if let Some(extensions) = &self.scan.extensions {
            if extensions.iter().all(|e| e.trim().trim_start_matches('.').is_empty()) {
                return Err(BatchCopyError::Config(
                    "at least one media extension is required".to_string(),
                ));
            }
        }

        Ok(())
    }
}
