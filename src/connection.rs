use std::sync::Arc;

use derive_builder::Builder;

use crate::{auth::AwsCredentials, http::client::AthenaHttpClient, service::athena::AthenaQueryService};

#[derive(Builder, Debug, Clone)]
pub struct AthenaConnectionOpts {
    #[builder(setter(into))]
    pub(crate) region: String,

    pub(crate) credentials: AwsCredentials,

    /// Override the Athena API endpoint. Useful for VPC endpoints or local emulators.
    ///
    /// If unset, this will default to `https://athena.{region}.amazonaws.com/`
    #[builder(setter(into, strip_option), default = None)]
    pub(crate) endpoint: Option<String>,

    /// Work group to run queries in. Athena uses `primary` when unset.
    #[builder(setter(into, strip_option), default = None)]
    pub(crate) work_group: Option<String>,

    /// Rows per `GetQueryResults` page, at most 1000.
    #[builder(setter(into, strip_option), default = None)]
    pub(crate) page_size: Option<u32>,
}

impl AthenaConnectionOpts {
    pub fn connect_with_client<C: AthenaHttpClient>(self) -> AthenaQueryService<C> {
        AthenaQueryService::new(Connection::new(C::new(), self))
    }

    #[cfg(feature = "reqwest")]
    pub fn connect(self) -> AthenaQueryService<reqwest::Client> {
        self.connect_with_client::<reqwest::Client>()
    }
}

#[derive(Clone)]
pub(crate) struct Connection<C>
where
    C: Clone,
{
    client: C,
    opts: Arc<AthenaConnectionOpts>,
}

impl<C> Connection<C>
where
    C: AthenaHttpClient,
{
    pub(crate) fn new(client: C, opts: AthenaConnectionOpts) -> Self {
        Self {
            client,
            opts: Arc::new(opts),
        }
    }

    pub(crate) fn get_opts(&self) -> Arc<AthenaConnectionOpts> {
        self.opts.clone()
    }

    pub(crate) fn get_client(&self) -> C {
        self.client.clone()
    }
}
