pub mod form;
pub mod response;

use crate::actix_web::error::JsonPayloadError;
use crate::actix_web::web::{get, post, resource, scope, JsonConfig, ServiceConfig};
use crate::actix_web::HttpRequest;
use crate::core::ports::repository::Manager;
use crate::error::Error;

pub fn json_config() -> JsonConfig {
    JsonConfig::default().limit(256 * 1024).error_handler(|err: JsonPayloadError, _: &HttpRequest| {
        Error::InvalidInput(err.to_string()).into()
    })
}

pub fn routes<M>(cfg: &mut ServiceConfig)
where
    M: Manager + 'static,
{
    cfg.service(
        scope("forms/{slug}")
            .route("", get().to(form::public::<M>))
            .route("responses", post().to(response::submit::<M>)),
    )
    .service(
        scope("admin/forms")
            .service(resource("").route(get().to(form::list::<M>)).route(post().to(form::save::<M>)))
            .route("{slug}", get().to(form::detail::<M>))
            .route("{slug}/responses", get().to(response::export::<M>)),
    );
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::actix_web::http::{header, StatusCode};
    use crate::actix_web::test::{call_service, init_service, read_body, read_body_json, TestRequest};
    use crate::actix_web::web::Data;
    use crate::actix_web::App;
    use crate::config::Config;
    use crate::core::normalizer::Normalizer;
    use crate::database::memory::MemoryManager;
    use serde_json::{json, Value};

    const TOKEN: &str = "Bearer s3cret";

    fn config() -> Config {
        Config {
            database_url: "postgres://localhost/anket".into(),
            admin_token: "s3cret".into(),
            bind_addr: "127.0.0.1".into(),
            port: 8000,
            max_connections: 1,
            label_prefix: "Soru".into(),
            dedupe_by_ip: true,
        }
    }

    macro_rules! app {
        ($manager:expr) => {
            init_service(
                App::new()
                    .app_data(Data::new(config()))
                    .app_data(Data::new(Normalizer::default()))
                    .app_data(Data::new($manager.clone()))
                    .app_data(json_config())
                    .configure(routes::<MemoryManager>),
            )
            .await
        };
    }

    fn form_body() -> Value {
        json!({
            "slug": "memnuniyet",
            "title": "Memnuniyet",
            "active": true,
            "schema": {"questions": [
                {"type": "radyo", "name": "Renk", "label": "  Renk ", "options": "kırmızı, mavi, kırmızı", "required": "yes"},
                {"name": "Yorum, lütfen", "type": "textarea"}
            ]}
        })
    }

    #[actix_web::test]
    async fn test_admin_requires_token() {
        let manager = MemoryManager::default();
        let app = app!(manager);
        let req = TestRequest::post().uri("/admin/forms").set_json(form_body()).to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = TestRequest::get().uri("/admin/forms").insert_header((header::AUTHORIZATION, "Bearer nope")).to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_save_and_render_form() {
        let manager = MemoryManager::default();
        let app = app!(manager);
        let req = TestRequest::post()
            .uri("/admin/forms")
            .insert_header((header::AUTHORIZATION, TOKEN))
            .set_json(form_body())
            .to_request();
        let saved: Value = read_body_json(call_service(&app, req).await).await;
        assert_eq!(saved["slug"], "memnuniyet");
        assert_eq!(saved["schema"]["questions"][0]["type"], "radio");
        assert_eq!(saved["schema"]["questions"][0]["options"], json!(["kırmızı", "mavi"]));

        let req = TestRequest::get().uri("/forms/memnuniyet").to_request();
        let public: Value = read_body_json(call_service(&app, req).await).await;
        assert_eq!(public["questions"][0]["name"], "renk");
        assert_eq!(public["questions"][0]["required"], true);
        assert_eq!(public["questions"][1]["name"], "yorum_lutfen");
        assert_eq!(public["questions"][1]["label"], "Soru 2");

        let req = TestRequest::get().uri("/admin/forms?page=1&size=10").insert_header((header::AUTHORIZATION, TOKEN)).to_request();
        let list: Value = read_body_json(call_service(&app, req).await).await;
        assert_eq!(list["total"], 1);
        assert_eq!(list["list"][0]["response_count"], 0);

        let req = TestRequest::get()
            .uri("/admin/forms?page=9223372036854775807")
            .insert_header((header::AUTHORIZATION, TOKEN))
            .to_request();
        let far: Value = read_body_json(call_service(&app, req).await).await;
        assert_eq!(far["total"], 1);
        assert_eq!(far["list"], json!([]));
    }

    #[actix_web::test]
    async fn test_bad_admin_bodies() {
        let manager = MemoryManager::default();
        let app = app!(manager);
        let req = TestRequest::post()
            .uri("/admin/forms")
            .insert_header((header::AUTHORIZATION, TOKEN))
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .set_payload("{not json")
            .to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = TestRequest::post()
            .uri("/admin/forms")
            .insert_header((header::AUTHORIZATION, TOKEN))
            .set_json(json!({"slug": "Bad Slug!"}))
            .to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = TestRequest::get().uri("/admin/forms/yok").insert_header((header::AUTHORIZATION, TOKEN)).to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_submit_and_export() {
        let manager = MemoryManager::default();
        let app = app!(manager);
        let req = TestRequest::post()
            .uri("/admin/forms")
            .insert_header((header::AUTHORIZATION, TOKEN))
            .set_json(form_body())
            .to_request();
        assert!(call_service(&app, req).await.status().is_success());

        let req = TestRequest::post()
            .uri("/forms/memnuniyet/responses")
            .insert_header(("x-forwarded-for", "203.0.113.7"))
            .set_json(json!({"answers": {"renk": "mavi", "yorum_lutfen": "Güzel, \"çok\" güzel"}}))
            .to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::CREATED);

        let req = TestRequest::post()
            .uri("/forms/memnuniyet/responses")
            .insert_header(("x-forwarded-for", "203.0.113.7"))
            .set_json(json!({"answers": {"renk": "kırmızı"}}))
            .to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::CONFLICT);

        let req = TestRequest::post()
            .uri("/forms/memnuniyet/responses")
            .insert_header(("x-forwarded-for", "203.0.113.8"))
            .set_json(json!({"answers": {"yorum_lutfen": "renk yok"}}))
            .to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = TestRequest::get().uri("/admin/forms/memnuniyet/responses").insert_header((header::AUTHORIZATION, TOKEN)).to_request();
        let export: Value = read_body_json(call_service(&app, req).await).await;
        assert_eq!(export["count"], 1);
        assert_eq!(export["headers"], json!(["created_at", "ip", "Renk", "Soru 2"]));
        assert_eq!(export["items"][0]["ip"], "203.0.113.7");
        assert_eq!(export["items"][0]["Renk"], "mavi");

        let req = TestRequest::get()
            .uri("/admin/forms/memnuniyet/responses?format=csv")
            .insert_header((header::AUTHORIZATION, TOKEN))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let disposition = resp.headers().get(header::CONTENT_DISPOSITION).unwrap().to_str().unwrap().to_owned();
        assert!(disposition.contains("memnuniyet-responses.csv"));
        let body = read_body(resp).await;
        let csv = std::str::from_utf8(&body).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("created_at,ip,Renk,Soru 2"));
        assert!(lines.next().unwrap().ends_with(",203.0.113.7,mavi,\"Güzel, \"\"çok\"\" güzel\""));
    }

    #[actix_web::test]
    async fn test_export_keeps_recorded_ip() {
        let manager = MemoryManager::default();
        let app = app!(manager);
        let req = TestRequest::post()
            .uri("/admin/forms")
            .insert_header((header::AUTHORIZATION, TOKEN))
            .set_json(form_body())
            .to_request();
        assert!(call_service(&app, req).await.status().is_success());

        let req = TestRequest::post()
            .uri("/forms/memnuniyet/responses")
            .insert_header(("x-forwarded-for", "203.0.113.9"))
            .set_json(json!({"answers": {"renk": "mavi", "ip": "6.6.6.6", "created_at": "spoofed"}}))
            .to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::CREATED);

        let req = TestRequest::get().uri("/admin/forms/memnuniyet/responses").insert_header((header::AUTHORIZATION, TOKEN)).to_request();
        let export: Value = read_body_json(call_service(&app, req).await).await;
        assert_eq!(export["headers"], json!(["created_at", "ip", "Renk", "Soru 2", "ip_2", "created_at_2"]));
        let item = &export["items"][0];
        assert_eq!(item["ip"], "203.0.113.9");
        assert_ne!(item["created_at"], "spoofed");
        assert_eq!(item["ip_2"], "6.6.6.6");
        assert_eq!(item["created_at_2"], "spoofed");
    }

    #[actix_web::test]
    async fn test_inactive_form_is_hidden() {
        let manager = MemoryManager::default();
        let app = app!(manager);
        let mut body = form_body();
        body["active"] = json!(false);
        let req = TestRequest::post().uri("/admin/forms").insert_header((header::AUTHORIZATION, TOKEN)).set_json(body).to_request();
        assert!(call_service(&app, req).await.status().is_success());

        let req = TestRequest::get().uri("/forms/memnuniyet").to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
        let req = TestRequest::post().uri("/forms/memnuniyet/responses").set_json(json!({"answers": {"renk": "mavi"}})).to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
        let req = TestRequest::get().uri("/forms/yok").to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
        let req = TestRequest::get().uri("/admin/forms?active=false").insert_header((header::AUTHORIZATION, TOKEN)).to_request();
        let list: Value = read_body_json(call_service(&app, req).await).await;
        assert_eq!(list["total"], 1);
    }
}
