use crate::bank::{self, BankApi, Mode, StatementRequest};
use crate::commands::Out;
use crate::model::write_canonical;
use crate::{utils, DownloaderConfig, Result};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// What the `download` command wrote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Downloaded {
    pub history_path: PathBuf,
    pub history_records: usize,
    pub statements: Vec<PathBuf>,
}

/// Downloads the MyAmeria history up to today, then the statements of the configured accounts.
pub async fn download(config: &DownloaderConfig, mode: Mode) -> Result<Out<Downloaded>> {
    let client = bank::client(config, mode)?;
    download_from(config, client.as_ref(), Local::now().date_naive()).await
}

pub(crate) async fn download_from(
    config: &DownloaderConfig,
    client: &dyn BankApi,
    to: NaiveDate,
) -> Result<Out<Downloaded>> {
    let my = config.my_ameria();
    let entries = client.history(my.since, to).await?;
    let grouped = bank::group_by_account(&entries)?;
    let records = bank::to_canonical(&grouped)?;
    let history_path = config.history_path();
    write_file(&history_path, write_canonical(&records)?).await?;
    info!("Successfully downloaded history to {}", history_path.display());

    let mut statements = Vec::with_capacity(my.accounts.len());
    for account in &my.accounts {
        info!("Downloading statement for {}...", account.name);
        let request = StatementRequest {
            kind: account.kind,
            account_number: account.account_number.clone(),
            inner_account_number: account.inner_account_number.clone(),
            from: account.since,
            to,
        };
        let bytes = client.statement(&request).await?;
        let path = config.statement_path(account);
        write_file(&path, bytes).await?;
        info!("Successfully downloaded statement to {}", path.display());
        statements.push(path);
    }

    Ok(Out::new(
        format!(
            "Downloaded {} history records and {} statements",
            records.len(),
            statements.len()
        ),
        Downloaded {
            history_path,
            history_records: records.len(),
            statements,
        },
    ))
}

async fn write_file(path: &Path, contents: Vec<u8>) -> Result<()> {
    if let Some(parent) = path.parent() {
        utils::make_dir(parent).await?;
    }
    utils::write(path, contents).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::TestBank;
    use std::collections::HashMap;
    use tempfile::TempDir;

    const CONFIG: &str = r#"
my_ameria:
  history_path: out/history.csv
  auth_token: "Bearer abc"
  client_id: "42"
  since-DD-MM-YYYY: "01-05-2024"
  accounts:
    - name: Main card
      type: card
      account_number: "2470000000000001"
      inner_account_number: "123"
      path: out/card.xls
      since-DD-MM-YYYY: "01-01-2024"
"#;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_download() {
        let dir = TempDir::new().unwrap();
        let config = DownloaderConfig::from_yaml(CONFIG, dir.path()).unwrap();
        let mut statements = HashMap::new();
        statements.insert("123".to_string(), b"xls bytes".to_vec());
        let bank = TestBank::new(TestBank::default().entries, statements);

        let out = download_from(&config, &bank, date(2024, 5, 4)).await.unwrap();
        let downloaded = out.structure().unwrap();
        assert_eq!(downloaded.history_records, 2);
        assert_eq!(out.message(), "Downloaded 2 history records and 1 statements");

        let history = utils::read(&dir.path().join("out/history.csv")).await.unwrap();
        let lines: Vec<&str> = history.lines().collect();
        assert_eq!(
            lines[0],
            "Date,FromAccount,ToAccount,IsExpense,Amount,Details,AccountCurrency,OriginCurrency,OriginCurrencyAmount"
        );
        assert_eq!(
            lines[1],
            "2024-05-02,1000000000000000,2470000000000001,false,500000.00,SALARY,AMD,,"
        );
        assert_eq!(
            lines[2],
            "2024-05-03,2470000000000001,4000000000000010,true,12500.00,SAS SUPERMARKET,AMD,,"
        );

        let card = tokio::fs::read(dir.path().join("out/card.xls")).await.unwrap();
        assert_eq!(card, b"xls bytes");
    }

    #[tokio::test]
    async fn test_download_rejects_unknown_transaction_type() {
        let dir = TempDir::new().unwrap();
        let config = DownloaderConfig::from_yaml(CONFIG, dir.path()).unwrap();
        let mut entries = TestBank::default().entries;
        entries[0].transaction_type = "loan".into();
        let bank = TestBank::new(entries, HashMap::new());
        let err = download_from(&config, &bank, date(2024, 6, 1))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Unknown transaction type: loan");
        assert!(!dir.path().join("out/history.csv").exists());
    }
}
