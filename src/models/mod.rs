pub mod answer;
pub mod ids;
pub mod question;
pub mod subscription;
pub mod test_attempt;
pub mod user;
