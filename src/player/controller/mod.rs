pub mod generic;
pub mod macos;
pub mod traits;

use std::sync::Arc;

use crate::notification::NotificationCenter;
use crate::player::PlayerHelper;

pub use generic::DummyHelper;
pub use macos::{MusicHelper, Osascript, SpotifyHelper};
pub use traits::ScriptRunner;

/// Factory for the helpers available on this OS
pub fn platform_helpers(center: &NotificationCenter) -> Vec<Arc<dyn PlayerHelper>> {
    #[cfg(target_os = "macos")]
    {
        let runner: Arc<dyn ScriptRunner> = Arc::new(Osascript);
        vec![
            Arc::new(MusicHelper::new(runner.clone(), center.clone())),
            Arc::new(SpotifyHelper::new(runner, center.clone())),
        ]
    }
    #[cfg(not(target_os = "macos"))]
    {
        let _ = center;
        crate::player::PlayerId::ALL
            .iter()
            .map(|&id| Arc::new(DummyHelper::new(id)) as Arc<dyn PlayerHelper>)
            .collect()
    }
}
