//! Self-signing OAuth 2.0 HTTP clients—authorization-code and refresh grants, pluggable token
//! persistence and signing strategies, and per-identity client caching in one crate.
//!
//! The entry point is [`factory::ClientFactory`]: hand it a [`credentials::Credentials`] set and
//! an optional [`strategy::AuthConfig`], and it returns a [`client::SignedClient`] whose requests
//! carry a bearer token that is obtained, refreshed, and persisted behind the scenes.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod authority;
pub mod client;
pub mod credentials;
pub mod error;
pub mod factory;
pub mod middleware;
pub mod obs;
pub mod persist;
pub mod strategy;
pub mod token;

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	pub use reqwest::Client as ReqwestClient;
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
#[cfg(test)] use httpmock as _;
