//! Disposable domain blocklist domain

mod service;
mod snapshot;
mod source;

pub use service::DomainListService;
pub use snapshot::{merge_domain_lists, parse_domain_list, BlocklistSnapshot, BLOCKLIST_KEY};
pub use source::BlocklistSource;

#[cfg(test)]
pub use source::mock;
