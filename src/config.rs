use anyhow::{Error, Result, anyhow};
use dotenvy::dotenv;
use serde::Deserialize;

use crate::resolver::{AccountResolver, ConfigTable};

/// Flat environment-backed configuration, read once at start-up.
///
/// Each of the six gateway properties holds either a bare default string or
/// a `|`-separated list of `KEY#VALUE` overrides, e.g.
/// `GATEWAY_MERCHANT_ACCOUNT="UK#MerchantUK|DE#MerchantDE|MerchantGlobal"`.
#[derive(Clone, Deserialize, Debug)]
pub struct Config {
    pub merchant_account: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub skin: Option<String>,
    pub hmac_secret: Option<String>,
    pub hmac_algorithm: Option<String>,

    pub server_port: u16,
}

impl Config {
    pub fn load() -> Result<Self, Error> {
        dotenv().ok();

        let config = envy::prefixed("GATEWAY_")
            .from_env::<Self>()
            .map_err(|_| anyhow!("Invalid or missing environmental variable"))?;
        Ok(config)
    }

    pub fn account_resolver(&self) -> AccountResolver {
        AccountResolver::new(
            ConfigTable::build(self.merchant_account.as_deref()),
            ConfigTable::build(self.username.as_deref()),
            ConfigTable::build(self.password.as_deref()),
            ConfigTable::build(self.skin.as_deref()),
            ConfigTable::build(self.hmac_secret.as_deref()),
            self.hmac_algorithm
                .as_deref()
                .map(|raw| ConfigTable::build(Some(raw))),
        )
    }
}
