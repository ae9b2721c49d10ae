pub mod poster;
pub mod recommender;
pub mod transport;
