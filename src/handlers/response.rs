use crate::actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use crate::actix_web::http::StatusCode;
use crate::actix_web::web::{Data, Json, Path, Query};
use crate::actix_web::HttpResponse;
use crate::config::Config;
use crate::context::{AdminToken, ClientIp};
use crate::core::aggregator::CellStyle;
use crate::core::export::{csv_filename, to_csv, to_json};
use crate::core::models::response::Submit;
use crate::core::normalizer::Normalizer;
use crate::core::ports::repository::Manager;
use crate::core::services::response::{export as export_responses, submit as submit_response, Submission};
use crate::error::Error;
use crate::request::{ExportFormat, ExportParam};
use crate::response::Created;

pub async fn submit<M>(
    slug: Path<String>,
    ClientIp(ip): ClientIp,
    Json(body): Json<Submit>,
    normalizer: Data<Normalizer>,
    config: Data<Config>,
    manager: Data<M>,
) -> Result<HttpResponse, Error>
where
    M: Manager,
{
    let submission = Submission {
        slug: slug.into_inner(),
        ip,
        answers: body.answers,
    };
    submit_response(manager.tx().await?, &normalizer, submission, config.dedupe_by_ip).await?;
    Ok(HttpResponse::build(StatusCode::CREATED).json(Created { ok: true }))
}

pub async fn export<M>(_: AdminToken, slug: Path<String>, Query(param): Query<ExportParam>, manager: Data<M>) -> Result<HttpResponse, Error>
where
    M: Manager,
{
    let slug = slug.into_inner();
    let mut store = manager.db().await?;
    match param.format {
        ExportFormat::Json => {
            let table = export_responses(&mut store, &slug, CellStyle::Screen).await?;
            Ok(HttpResponse::Ok().json(to_json(&table)))
        }
        ExportFormat::Csv => {
            let table = export_responses(&mut store, &slug, CellStyle::File).await?;
            Ok(HttpResponse::Ok()
                .content_type("text/csv; charset=utf-8")
                .insert_header(ContentDisposition {
                    disposition: DispositionType::Attachment,
                    parameters: vec![DispositionParam::Filename(csv_filename(&slug))],
                })
                .body(to_csv(&table)))
        }
    }
}
