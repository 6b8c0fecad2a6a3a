pub mod gateway;

pub use gateway::{
    BookmarkOutcome, CancelRepostOutcome, LikeOutcome, PostGateway, RepostOutcome,
};
