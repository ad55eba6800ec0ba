use std::{fs::write, net::SocketAddr, path::PathBuf};

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use jsonwebtoken::{DecodingKey, EncodingKey};
use log::{debug, info};
use serde::{Deserialize, Deserializer};

#[derive(Deserialize, Clone)]
pub struct Config {
    /// the address the server should bind to
    pub listen: SocketAddr,
    /// The uri to the sqlite database file
    pub database_url: String,
    #[serde(deserialize_with = "deserialize_jwt_secret")]
    pub jwt_secret: (EncodingKey, DecodingKey),
    /// The account seeded on first start so the instance is reachable at all
    pub default_admin: DefaultAdmin,
}

#[derive(Deserialize, Clone)]
pub struct DefaultAdmin {
    pub username: String,
    pub password: String,
}

impl Config {
    /// Load the configuration
    ///
    /// The default path is a file called `config.toml` in $PWD/config.toml
    pub fn load() -> anyhow::Result<Self> {
        // either read the path for the config from the env <CRATE_NAME>_CONFIG
        // or use the default path relative to the working directory
        let path: PathBuf = match std::env::var(concat!(env!("CARGO_CRATE_NAME"), "_CONFIG")) {
            Ok(path) => path.into(),
            Err(e) => {
                debug!("Cannot read env var for config path: {}", e);
                std::env::current_dir()?.join("config.toml")
            }
        };

        // write the sample config to the file only if it does not exist
        if !path.exists() {
            info!("Creating config with default options at {}", path.display());
            write(&path, include_str!("../other/config.sample"))?;
        }

        info!("Reading config from {}", path.display());
        Ok(Figment::new()
            // first read the config file
            .merge(Toml::file(path))
            // and then let the env overwrite options
            .merge(Env::prefixed(concat!(env!("CARGO_CRATE_NAME"), "_")))
            .extract()?)
    }
}

fn deserialize_jwt_secret<'de, D>(secret: D) -> Result<(EncodingKey, DecodingKey), D::Error>
where
    D: Deserializer<'de>,
{
    let secret = String::deserialize(secret)?;
    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    Ok((encoding_key, decoding_key))
}

#[test]
fn test_parse_default_config() {
    use figment::providers::Data;
    // ensure that the default config is valid and can be parsed
    let _: Config = Figment::new()
        .merge(Data::<Toml>::string(include_str!("../other/config.sample")))
        .extract()
        .expect("default config is malformed");
}
