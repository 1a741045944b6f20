pub mod badges;
pub mod flow;
pub mod health;
pub mod knowledge;
pub mod pipeline;
pub mod progress;
pub mod referral;
pub mod screenshots;
pub mod util;
