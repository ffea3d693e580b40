pub mod client;
pub mod protocol;
#[cfg(test)]
pub(crate) mod testing;

pub use client::BotClient;
