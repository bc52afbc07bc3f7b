//! Commissioner spreadsheet loader.
//!
//! League commissioners keep transaction logs in a Google Sheet published as
//! CSV. Headers are human-edited (`"Txn ID"`, `"Player Name"`), so they are
//! snake_cased before the contract sees them.

use async_trait::async_trait;

use crate::tabular::{rows_from_csv, snake_case_keys};
use crate::{Loader, Params, ProviderClient, ProviderError, RawBatch};

/// Transaction log of one commissioner sheet.
pub struct TransactionsLoader {
    client: ProviderClient,
}

impl TransactionsLoader {
    #[must_use]
    pub const fn new(client: ProviderClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Loader for TransactionsLoader {
    fn path(&self) -> &'static str {
        "providers/sheets/transactions"
    }

    fn accepted_params(&self) -> &'static [&'static str] {
        &["sheet_id", "gid"]
    }

    async fn fetch(&self, params: &Params) -> Result<RawBatch, ProviderError> {
        params.ensure_recognized(self.accepted_params(), self.path())?;
        let sheet_id = params.require("sheet_id", self.path())?;
        let gid = params.get("gid").unwrap_or("0");

        let url = format!(
            "{}/{sheet_id}/export?format=csv&gid={}",
            self.client.config().sheets_base(),
            urlencoding::encode(gid)
        );
        let fetched = self.client.get_text("sheets", &url).await?;

        let mut rows = rows_from_csv(fetched.body.as_bytes())?;
        snake_case_keys(&mut rows);

        Ok(RawBatch::new(
            "sheets",
            "transactions",
            self.path(),
            fetched
                .version
                .unwrap_or_else(|| format!("{sheet_id}#{gid}")),
            rows,
        ))
    }
}
