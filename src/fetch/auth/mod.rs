//! Request decorators that attach credentials obtained elsewhere.

mod url_param;

pub use url_param::UrlParam;
