pub mod locate;
pub mod search;
pub mod suggest;
