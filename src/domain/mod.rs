pub mod entities;
pub mod value_objects;

pub use entities::Post;
pub use value_objects::{MutationKind, PostId, PostPatch, TeamId, UserId, ViewKey};
