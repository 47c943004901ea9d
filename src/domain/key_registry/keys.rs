//! Storage key namespaces owned by the key registry

/// Prefix of primary key records
pub const RECORD_PREFIX: &str = "key:";

/// Prefix of the api key -> email index
pub const LOOKUP_PREFIX: &str = "lookup:";

/// Prefix of community domain reports
pub const REPORT_PREFIX: &str = "report:";

/// Successful email checks, keyed or anonymous
pub const TOTAL_EMAILS_CHECKED: &str = "global:totalEmailsChecked";

/// Community reports received
pub const COMMUNITY_REPORTS: &str = "global:communityReports";

pub fn record(email: &str) -> String {
    format!("{}{}", RECORD_PREFIX, email)
}

pub fn lookup(api_key: &str) -> String {
    format!("{}{}", LOOKUP_PREFIX, api_key)
}

pub fn report(domain: &str) -> String {
    format!("{}{}", REPORT_PREFIX, domain)
}
