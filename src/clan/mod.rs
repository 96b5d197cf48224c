pub mod api;
pub mod client;
mod member;
mod roster;
mod war;

pub use api::RoyaleApi;
pub use client::{create_client, DEFAULT_API_ENDPOINT};
pub use member::{Member, MemberRatings, Role, SeasonStats};
pub use roster::Clan;
pub use war::{CurrentWar, Participation, PeriodId, WarLog};
