//! External collaborators: SMTP delivery, Telegram notifications and the
//! INGV earthquake feed.

pub mod earthquakes;
pub mod email;
pub mod telegram;
