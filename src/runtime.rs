//! Executes queued [`Command`]s against an [`AdminApi`] and turns the
//! results into [`AppEvent`]s for the UI loop.

use std::path::{Path, PathBuf};

use crate::api::{AdminApi, CsvDownload};
use crate::error::ApiError;
use crate::types::{AppEvent, Command, Outcome, Request};

pub async fn execute(api: &dyn AdminApi, cmd: Command, out_dir: &Path) -> AppEvent {
    let kind = cmd.request.kind();
    let seq = cmd.seq;
    let result = run(api, cmd, out_dir).await;
    if let Err(e) = &result {
        log::warn!("[runtime] #{seq} {kind:?} failed: {e}");
    } else {
        log::debug!("[runtime] #{seq} {kind:?} ok");
    }
    AppEvent::Response { seq, kind, result }
}

async fn run(api: &dyn AdminApi, cmd: Command, out_dir: &Path) -> Result<Outcome, ApiError> {
    let token = match (cmd.request.needs_token(), cmd.token.as_deref()) {
        (true, None) => return Err(ApiError::MissingToken),
        (_, token) => token.unwrap_or_default(),
    };

    let value = match &cmd.request {
        Request::Login(req) => api.login(req).await?,
        Request::Signup(req) => api.signup(req).await?,
        Request::Overview(q) => api.dashboard_overview(token, q).await?,
        Request::Users(q) | Request::ReferralSearch(q) => api.users(token, q).await?,
        Request::ReferralTree { user_id, depth } => api.user(token, user_id, *depth).await?,
        Request::NonPaidReferrals { user_id, page, page_size } => {
            api.non_paid_referrals(token, user_id, *page, *page_size).await?
        }
        Request::Withdrawals(q) => api.referral_withdrawals(token, q).await?,
        Request::UpdateWithdrawal { request_id, update } => {
            api.update_referral_withdrawal(token, request_id, update).await?
        }
        Request::SendTradeMessage { category, payload } => api.send_trade_message(token, category, payload).await?,
        Request::SendDailyTip { payload } => api.send_daily_tip(token, payload).await?,
        Request::UploadImage { path } => {
            let bytes = tokio::fs::read(path).await?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "image".to_string());
            api.upload_image(token, &name, bytes).await?
        }
        Request::ExportCsv { export, params } => {
            let download = api.download_csv(token, *export, params).await?;
            let bytes = download.bytes.len();
            let path = save_download(out_dir, &download).await?;
            return Ok(Outcome::Saved { path, bytes });
        }
    };
    Ok(Outcome::Json(value))
}

/// Write an export into `out_dir`. The server-supplied name is reduced to its
/// final path component.
pub async fn save_download(out_dir: &Path, download: &CsvDownload) -> std::io::Result<PathBuf> {
    let name = Path::new(&download.filename)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "export.csv".to_string());
    tokio::fs::create_dir_all(out_dir).await?;
    let path = out_dir.join(name);
    tokio::fs::write(&path, &download.bytes).await?;
    log::info!("[runtime] saved {} ({} bytes)", path.display(), download.bytes.len());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn download_names_cannot_escape_out_dir() {
        let dir = std::env::temp_dir().join(format!("juststock-save-{}", std::process::id()));
        let download = CsvDownload { filename: "../../etc/phones.csv".into(), bytes: b"a,b\n".to_vec() };
        let path = save_download(&dir, &download).await.unwrap();
        assert_eq!(path, dir.join("phones.csv"));
        assert_eq!(std::fs::read(&path).unwrap(), b"a,b\n");
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
