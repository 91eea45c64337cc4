use serde_json::Value;

use crate::core::aggregator::{aggregate, CellStyle, ExportTable};
use crate::core::models::response::{Insert as ResponseInsert, Query as ResponseQuery};
use crate::core::normalizer::Normalizer;
use crate::core::ports::repository::{FormCommon, ResponseCommon, Store, TxStore};
use crate::core::services::form::form_detail;
use crate::error::Error;

pub struct Submission {
    pub slug: String,
    pub ip: Option<String>,
    pub answers: Value,
}

/// Records one submission. The per-IP check is a read followed by a write: two
/// concurrent requests from the same address can both pass it.
pub async fn submit<S>(mut store: S, normalizer: &Normalizer, submission: Submission, dedupe_by_ip: bool) -> Result<(), Error>
where
    S: TxStore,
{
    match record(&mut store, normalizer, submission, dedupe_by_ip).await {
        Ok(()) => store.commit().await,
        Err(e) => {
            store.rollback().await?;
            Err(e)
        }
    }
}

async fn record<S>(store: &mut S, normalizer: &Normalizer, submission: Submission, dedupe_by_ip: bool) -> Result<(), Error>
where
    S: Store,
{
    let answers = match submission.answers {
        Value::Object(answers) => answers,
        _ => return Err(Error::InvalidInput("answers must be a JSON object".into())),
    };
    let form = form_detail(store, &submission.slug).await?;
    if !form.active {
        return Err(Error::FormInactive(form.slug));
    }
    let schema = normalizer.schema(&form.schema);
    if let Some(q) = schema.questions.iter().find(|q| q.required && !answered(answers.get(&q.name))) {
        return Err(Error::InvalidInput(format!("{} is required", q.label)));
    }
    if let (true, Some(ip)) = (dedupe_by_ip, &submission.ip) {
        let seen = ResponseCommon::exists(
            store,
            &ResponseQuery {
                form_slug_eq: form.slug.clone(),
                ip_eq: Some(ip.clone()),
            },
        )
        .await?;
        if seen {
            log::warn!("rejected repeated submission to {} from {}", form.slug, ip);
            return Err(Error::DuplicateSubmission);
        }
    }
    ResponseCommon::insert(
        store,
        ResponseInsert {
            form_slug: form.slug.clone(),
            ip: submission.ip,
            answers: Value::Object(answers),
        },
    )
    .await?;
    log::info!("recorded response for {}", form.slug);
    Ok(())
}

fn answered(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(_) => true,
    }
}

/// Exports every response of a form, newest first. Inactive forms can still be exported.
pub async fn export<S>(store: &mut S, slug: &str, style: CellStyle) -> Result<ExportTable, Error>
where
    S: Store,
{
    let form = FormCommon::get(store, slug).await?.ok_or_else(|| Error::FormNotFound(slug.into()))?;
    let rows = ResponseCommon::query(
        store,
        &ResponseQuery {
            form_slug_eq: form.slug.clone(),
            ip_eq: None,
        },
    )
    .await?;
    let table = aggregate(&form.schema, &rows, style)?;
    log::debug!("exported {} responses of {} across {} columns", table.rows.len(), slug, table.columns.len());
    Ok(table)
}
