//! Reusable pieces of the chat window

mod audio_player;
mod conversation;
mod input_bar;
mod notices;
mod sidebar;

pub use audio_player::AudioPlayer;
pub use conversation::Conversation;
pub use input_bar::InputBar;
pub use notices::Notices;
pub use sidebar::Sidebar;
