pub mod detailed;
pub mod simple;

pub use detailed::DetailedScreen;
pub use simple::SimpleScreen;

use crate::app::InputMode;
use crate::ui::Theme;
use ratatui::text::{Line, Span};

/// Key hints for the bottom row
pub fn nav_bar(mode: InputMode) -> Line<'static> {
    let keys: &[(&str, &str)] = match mode {
        InputMode::Browse => &[
            ("[/]", "Search "),
            ("[←/→]", "Day "),
            ("[d]", "Detail "),
            ("[u]", "Units "),
            ("[l]", "Locate "),
            ("[q]", "Quit"),
        ],
        InputMode::Search => &[
            ("[↑/↓]", "Pick "),
            ("[Enter]", "Select "),
            ("[Esc]", "Cancel"),
        ],
    };

    Line::from(
        keys.iter()
            .flat_map(|(key, label)| {
                [
                    Span::styled(*key, Theme::nav_key()),
                    Span::styled(*label, Theme::nav_label()),
                ]
            })
            .collect::<Vec<_>>(),
    )
}
