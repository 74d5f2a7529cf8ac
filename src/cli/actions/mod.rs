pub mod session;
pub mod strength;

#[derive(Debug)]
pub enum Action {
    Session(session::Args),
    Strength(strength::Args),
}
