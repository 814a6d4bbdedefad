pub mod arrange;
pub mod edit;
pub mod inspect;
pub mod resolve;
