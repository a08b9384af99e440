pub mod notices;
pub mod notifier;
pub mod oauth;
pub mod status;
