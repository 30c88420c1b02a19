use std::sync::Arc;

use crate::{config::Config, Error, Gateway};

pub struct State {
    pub config: Config,
    pub gateway: Gateway,
}

impl State {
    pub fn new(config: Config) -> Result<Arc<Self>, Error> {
        let gateway = Gateway::new(config.token.clone(), Some(config.timeout))?
            .with_url(config.api_url.clone());

        Ok(Arc::new(Self { config, gateway }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn gateway_follows_config() {
        let config = Config::from_lookup(|key| match key {
            "ZEXUM_API_URL" => Some("http://localhost:1234/api/getsurvey".to_string()),
            "ZEXUM_TIMEOUT_SECS" => Some("30".to_string()),
            _ => None,
        });

        let state = State::new(config).unwrap();

        assert_eq!(state.gateway.url(), "http://localhost:1234/api/getsurvey");
        assert_eq!(state.gateway.timeout(), Duration::from_secs(30));
    }
}
