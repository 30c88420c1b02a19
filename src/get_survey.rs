use crate::{Error, Gateway};
use serde_json::Value;

impl Gateway {
    /// Fetches the raw survey listing.
    ///
    /// Fails with [`Error::Config`] before touching the network when no
    /// credential is set, and with [`Error::Upstream`] once retries are
    /// exhausted or the upstream answers with something that is not JSON.
    pub async fn get_survey(&self) -> Result<Value, Error> {
        //https://api.zexumglobalresearch.net/api/getsurvey

        let res: Value = self.get(self.url()).await?;
        Ok(res)
    }
}
