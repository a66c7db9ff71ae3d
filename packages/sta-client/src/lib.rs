//! Client core of the test archive: debounced subject search, the facet selection state
//! machine, and an async session driver over any [`ArchiveApi`].

pub mod api;
pub mod autocomplete;
pub mod http;
pub mod selection;
pub mod session;
pub mod tokens;

mod error;

pub use api::{ArchiveApi, BoxFuture};
pub use autocomplete::{Autocomplete, MAX_SUGGESTIONS, Suggestion};
pub use error::{Error, Result};
pub use http::HttpArchiveApi;
pub use selection::{Phase, Request, Selection, Target, Ticket, Update};
pub use session::{Session, SessionEvent};
pub use tokens::RequestTokens;
