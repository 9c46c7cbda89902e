//! paystream-core: shared types for the payment-stream client.
//!
//! # Overview
//!
//! - [`network`]: the static network registry (chains, contracts, tokens)
//! - [`token`]: native vs ERC-20 classification
//! - [`stream`]: the `StreamDetails` read model and derived status/progress
//! - [`query`]: dashboard filtering, search, sorting and counts
//! - [`format`]: amount formatting and parsing
//! - [`notify`]: the notification channel seam
//! - [`error`]: the [`StreamError`] failure taxonomy

pub mod clock;
pub mod config;
pub mod error;
pub mod format;
pub mod network;
pub mod notify;
pub mod query;
pub mod stream;
pub mod token;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::ClientConfig;
pub use error::StreamError;
pub use format::{format_amount, format_units_trimmed, parse_amount, short_address};
pub use network::{
    ChainFamily, NativeCurrency, NetworkDescriptor, NetworkName, TokenAddress, TokenDescriptor,
};
pub use notify::{NotificationKind, Notifier, RecordingNotifier, TracingNotifier};
pub use query::{RoleFilter, SortOrder, StatusFilter, StreamCounts, StreamQuery};
pub use stream::{Role, StreamDetails, StreamId, StreamParts, StreamStatus, UserStreamEntry};
pub use token::{classify_selection, classify_token, native_meta, TokenClass, TokenMeta};
