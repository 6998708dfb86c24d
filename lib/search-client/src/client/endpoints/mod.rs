//! Typed endpoints.
//!
//! Each endpoint adds a low-level `*_dispatch` method to [`Transport`](crate::Transport) and a
//! blocking plus an async method to [`SearchClient`](crate::SearchClient).

pub mod cat;

mod clear_scroll;
pub use self::clear_scroll::{
    ALL_SCROLLS, ClearScrollRequest, ClearScrollRequestParameters, EmptyResponse,
    patch_clear_scroll,
};

mod refresh;
pub use self::refresh::{
    RefreshRequest, RefreshRequestParameters, ShardFailure, ShardsMetadata,
    ShardsOperationResponse,
};
