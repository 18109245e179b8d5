pub mod catalogue;
pub mod recommendation;
