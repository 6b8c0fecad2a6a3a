pub mod mutation;
pub mod post_id;
pub mod team_id;
pub mod user_id;
pub mod view_key;

pub use mutation::{MutationKind, PostPatch};
pub use post_id::PostId;
pub use team_id::TeamId;
pub use user_id::UserId;
pub use view_key::ViewKey;
