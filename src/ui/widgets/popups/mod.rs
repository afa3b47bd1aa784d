use crate::app::App;
use ratatui::Frame;

pub mod overlay;
pub mod toast;

pub fn render(f: &mut Frame, app: &App) {
    if app.toast.is_some() {
        toast::render(f, app);
    }
}
