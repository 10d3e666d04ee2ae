mod articles;

pub use articles::router;
