use crate::player::error::Result;

/// Runs AppleScript and inspects processes for the scripted helpers.
pub trait ScriptRunner: Send + Sync {
    /// Returns trimmed stdout
    fn run(&self, script: &str) -> Result<String>;
    fn is_running(&self, app_name: &str) -> bool;
}
