pub mod auth;
pub mod config;
pub(crate) mod connection;
pub(crate) mod errors;
pub(crate) mod executor;
pub mod functions;
pub(crate) mod http;
#[cfg(feature = "server")]
pub mod logging;
pub mod pedidos;
pub(crate) mod query;
pub mod result;
pub mod service;

#[cfg(test)]
mod testing;

pub(crate) use errors::{error, this_errors};

pub use errors::{AthenaError, ErrorKind};

pub use auth::AwsCredentials;

pub use connection::{AthenaConnectionOpts, AthenaConnectionOptsBuilder};

pub use executor::{PollPolicy, QueryExecutor};

pub use query::{QueryRequest, QueryRequestBuilder, QueryTarget};

pub use result::{
    RawResultSet, ResultSet,
    column::Column,
    named::NamedResults,
    projection::{FirstColumn, FullRow, Projection},
    row::Row,
};

pub use service::{QueryHandle, QueryService, QueryStatus, athena::AthenaQueryService};

pub use http::client::{AthenaHttpClient, HttpResponse};
