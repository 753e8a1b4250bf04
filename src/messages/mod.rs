pub mod history;
pub mod notice;

pub use history::{ConversationHistory, Turn};
pub use notice::{Notice, NoticeLevel};
