use std::collections::HashMap;

/// Signature algorithm used when no `hmac_algorithm` override table was
/// configured at all.
pub const DEFAULT_HMAC_ALGORITHM: &str = "HmacSHA256";

/// An immutable override table parsed once from a delimited source string
/// of the form `"K1#V1|K2#V2|...|Kn#Vn"`.
///
/// A source string containing no `#` is a single default value applying to
/// every lookup. A blank or absent source yields an empty table. Inside a
/// `|`-separated list, a segment without `#` also sets the default.
/// Duplicate keys overwrite on insert, so the last entry wins.
#[derive(Debug, Clone, Default)]
pub struct ConfigTable {
    entries: HashMap<String, String>,
    default: Option<String>,
}

impl ConfigTable {
    pub fn build(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };

        let raw = raw.trim();
        if raw.is_empty() {
            return Self::default();
        }

        let mut entries = HashMap::new();
        let mut default = None;

        for segment in raw.split('|') {
            match segment.split_once('#') {
                Some((key, value)) => {
                    entries.insert(key.to_string(), value.to_string());
                }
                None => {
                    default = Some(segment.to_string());
                }
            }
        }

        Self { entries, default }
    }

    /// Exact entry if present, else the default if present, else `None`.
    pub fn resolve(&self, key: &str) -> Option<&str> {
        self.entries
            .get(key)
            .map(String::as_str)
            .or(self.default.as_deref())
    }

    /// Chained form of [`resolve`](Self::resolve): an absent key can still
    /// land on the default, so a miss earlier in a chain falls through to
    /// this table's global value instead of aborting resolution.
    pub fn lookup(&self, key: Option<&str>) -> Option<&str> {
        match key {
            Some(key) => self.resolve(key),
            None => self.default.as_deref(),
        }
    }
}

/// The values resolved for one country code. Any field may be absent;
/// whether a missing value is fatal is the caller's decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAccount {
    pub merchant_account: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub skin: Option<String>,
    pub hmac_secret: Option<String>,
    pub hmac_algorithm: Option<String>,
}

/// Chained per-tenant resolution over six override tables.
///
/// The first step is keyed by the external country code; every later step
/// is keyed by a value resolved earlier in the same chain. This lets an
/// operator override, say, the username for one specific merchant account
/// without touching country-level defaults, while falling back to global
/// defaults where no narrower override exists.
///
/// Built once at process start; read-only afterward, so shared references
/// are safe across concurrently served batches.
#[derive(Debug, Clone)]
pub struct AccountResolver {
    merchant_account: ConfigTable,
    username: ConfigTable,
    password: ConfigTable,
    skin: ConfigTable,
    hmac_secret: ConfigTable,
    hmac_algorithm: Option<ConfigTable>,
}

impl AccountResolver {
    pub fn new(
        merchant_account: ConfigTable,
        username: ConfigTable,
        password: ConfigTable,
        skin: ConfigTable,
        hmac_secret: ConfigTable,
        hmac_algorithm: Option<ConfigTable>,
    ) -> Self {
        Self {
            merchant_account,
            username,
            password,
            skin,
            hmac_secret,
            hmac_algorithm,
        }
    }

    pub fn resolve(&self, country_code: &str) -> ResolvedAccount {
        let merchant_account = self.merchant_account.resolve(country_code);
        let username = self.username.lookup(merchant_account);
        let password = self.password.lookup(username);
        let skin = self.skin.lookup(merchant_account);
        let hmac_secret = self.hmac_secret.lookup(skin);

        let hmac_algorithm = match &self.hmac_algorithm {
            Some(table) => table.lookup(skin).map(str::to_string),
            None => Some(DEFAULT_HMAC_ALGORITHM.to_string()),
        };

        ResolvedAccount {
            merchant_account: merchant_account.map(str::to_string),
            username: username.map(str::to_string),
            password: password.map(str::to_string),
            skin: skin.map(str::to_string),
            hmac_secret: hmac_secret.map(str::to_string),
            hmac_algorithm,
        }
    }

    /// Whether a lookup with no country-level match would still land on a
    /// merchant account. Used as a readiness signal.
    pub fn has_default_merchant_account(&self) -> bool {
        self.merchant_account.lookup(None).is_some()
    }
}
