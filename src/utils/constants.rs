// src/utils/constants.rs

/// Similarity (0-100) a candidate must reach to be proposed to the reviewer.
pub const DEFAULT_FUZZY_THRESHOLD: u8 = 90;

/// Label shown for the option that declares a key absent from the registry.
pub const NO_POTENTIAL_MATCH: &str = "No potential match";

/// Default for categorical output columns with no source value.
pub const NOT_APPLICABLE: &str = "n/a";

/// Column carrying contract/licence references in project summary data.
pub const LEGAL_REFERENCE_LABEL: &str =
    "Legal agreement reference number(s): contract, licence, lease, concession, …";

pub const DEFAULT_REGISTRY_BASE_URL: &str = "https://soe-database.eiti.org/eiti_database";

/// The registry rejects requests without a browser-like agent.
pub const DEFAULT_REGISTRY_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:77.0) Gecko/20100101 Firefox/77.0";
