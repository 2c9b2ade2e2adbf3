//! Collaborators the pipeline talks to over I/O.
//!
//! - [`ContentStore`]: looks up the page content for an article URL when the
//!   export row carried no body ([`MemoryContentStore`], [`HttpContentStore`]).
//! - [`ExternalValidator`]: submits a published URL to a third-party
//!   structured-data checker ([`HttpValidator`]). Verdicts are advisory.
//!
//! All calls are made one URL at a time with a bounded timeout and no retry.

mod store;
mod validator;

use std::time::Duration;

use reqwest::Client;

use ldgraph_shared::{LdGraphError, Result};

pub use store::{ContentStore, HttpContentStore, MemoryContentStore};
pub use validator::{ExternalValidator, ExternalVerdict, HttpValidator};

/// User-Agent string for collaborator requests.
const USER_AGENT: &str = concat!("ldgraph/", env!("CARGO_PKG_VERSION"));

/// Maximum redirects followed for a single request.
const MAX_REDIRECTS: usize = 5;

/// Build a reqwest client with the shared settings.
pub(crate) fn build_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| LdGraphError::Network(format!("failed to build HTTP client: {e}")))
}
