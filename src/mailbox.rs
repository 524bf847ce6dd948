use crate::gmail_hub::GmailHub;
use crate::inventory::InputReport;
use crate::message_processor as mproc;
use crate::report_store::{ReportStore, StoredReport};
use google_gmail1::api::{Message, Scope};
use tracing::{info, warn};

const UNKNOWN: &str = "unknown";

/// Message ids matching `query`, newest first, following page tokens until
/// the listing ends or `limit` ids have been collected.
pub async fn get_message_ids(
    hub: &GmailHub,
    query: &str,
    user: &str,
    limit: Option<usize>,
) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let mut ids: Vec<String> = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        info!(
            user = %user,
            query = %query,
            has_page_token = page_token.is_some(),
            "Listing messages"
        );
        let mut req = hub.users().messages_list(user).q(query);
        if let Some(token) = page_token.as_deref() {
            req = req.page_token(token);
        }

        let (_, response) = req.doit().await?;
        ids.extend(
            response
                .messages
                .unwrap_or_default()
                .into_iter()
                .filter_map(|m| m.id),
        );

        if let Some(max) = limit {
            if ids.len() >= max {
                ids.truncate(max);
                break;
            }
        }
        match response.next_page_token {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    info!(matches = ids.len(), "Listing complete");
    Ok(ids)
}

/// Turn a fetched Gmail message into a report. A message without a
/// plain-text part yields a report with no body.
pub fn report_from_message(message: &Message) -> InputReport {
    let payload = message.payload.as_ref();
    let headers = payload.and_then(|p| p.headers.as_ref());

    InputReport {
        body: payload.and_then(mproc::plain_text_body),
        sender: mproc::get_header(headers, "From")
            .unwrap_or(UNKNOWN)
            .to_string(),
        received_time: mproc::get_header(headers, "Date")
            .unwrap_or(UNKNOWN)
            .to_string(),
    }
}

/// Fetch messages by id and store them as unprocessed reports. Returns the
/// number stored.
pub async fn fetch_and_store(
    hub: &GmailHub,
    user: &str,
    ids: Vec<String>,
    store: &ReportStore,
) -> Result<usize, Box<dyn std::error::Error>> {
    let mut count = 0;

    for id in ids {
        let (_, message) = hub
            .users()
            .messages_get(user, &id)
            .add_scope(Scope::Readonly)
            .doit()
            .await?;

        let report = report_from_message(&message);
        if report.body.is_none() {
            warn!(id = %id, from = %report.sender, "Message has no plain-text body");
        }

        let stored = StoredReport {
            uid: ReportStore::generate_uid(&id, &report.received_time, user),
            message_id: id,
            user: user.to_string(),
            report,
            is_processed: false,
        };
        store.upsert_report(&stored)?;

        info!(
            uid = %stored.uid,
            id = %stored.message_id,
            from = %stored.report.sender,
            "STORED"
        );
        count += 1;
    }

    Ok(count)
}
