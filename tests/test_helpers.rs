// Test helpers for isolated testing
// Provides on-disk database fixtures that don't touch the system databases

use std::path::PathBuf;
use tempfile::TempDir;

/// Isolated dpkg/apt database fixture in a temporary directory
/// Automatically cleaned up when dropped (RAII pattern)
pub struct DatabaseFixture {
    #[allow(dead_code)]
    temp_dir: TempDir,
    pub admin_dir: PathBuf,
    pub apt_state_dir: PathBuf,
}

impl DatabaseFixture {
    /// Write a status database and (optionally) an extended_states file
    /// into a fresh temporary directory tree:
    /// - temp/dpkg/status
    /// - temp/apt/extended_states
    pub fn new(status: &str, extended_states: Option<&str>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let admin_dir = temp_dir.path().join("dpkg");
        let apt_state_dir = temp_dir.path().join("apt");

        std::fs::create_dir_all(&admin_dir).unwrap();
        std::fs::create_dir_all(&apt_state_dir).unwrap();

        std::fs::write(admin_dir.join("status"), status).unwrap();
        if let Some(extended) = extended_states {
            std::fs::write(apt_state_dir.join("extended_states"), extended).unwrap();
        }

        Self {
            temp_dir,
            admin_dir,
            apt_state_dir,
        }
    }
}
