//! End-to-end tests through the actix routing, extractors and error mapping,
//! against a seeded database file.

use crate::db::{test_support, Database};
use crate::identity::{USER_ID_HEADER, USER_ROLE_HEADER};
use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use common::model::area::{Area, AreaStatus};
use common::model::entity::{EntityRecord, InvalidEntitiesPage};
use common::responses::{Ack, ErrorBody, LocateResult};
use serde_json::json;
use tempfile::TempDir;

fn seeded_database() -> (TempDir, Database) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::new(dir.path().join("survey.sqlite"));
    db.initialize().unwrap();
    test_support::seed(&db.open().unwrap());
    (dir, db)
}

macro_rules! app {
    ($db:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($db.clone()))
                .configure(|cfg| super::configure(cfg, 1024 * 1024)),
        )
        .await
    };
}

#[actix_web::test]
async fn assigns_area_and_token_then_lists_remaining_problems() {
    let (_dir, db) = seeded_database();
    let app = app!(db);

    let req = test::TestRequest::put()
        .uri("/api/entities/building/B1/ward")
        .set_json(json!({ "ward": "1" }))
        .to_request();
    let ack: Ack = test::call_and_read_body_json(&app, req).await;
    assert!(ack.success);

    let req = test::TestRequest::put()
        .uri("/api/entities/building/B1/area")
        .set_json(json!({ "area_id": "A1", "token": "T-001" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::put()
        .uri("/api/entities/building/B1/enumerator")
        .set_json(json!({ "enumerator": "enu-1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/api/entities/building/B1")
        .to_request();
    let record: EntityRecord = test::call_and_read_body_json(&app, req).await;
    assert!(record.is_valid());

    let req = test::TestRequest::get()
        .uri("/api/entities/building/invalid")
        .to_request();
    let page: InvalidEntitiesPage = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page.pagination.total, 1);
    assert_eq!(page.rows[0].id, "B2");
}

#[actix_web::test]
async fn ward_may_be_sent_as_a_number() {
    let (_dir, db) = seeded_database();
    let app = app!(db);

    let req = test::TestRequest::put()
        .uri("/api/entities/building/B1/ward")
        .set_json(json!({ "ward": 1 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/api/entities/building/B1")
        .to_request();
    let record: EntityRecord = test::call_and_read_body_json(&app, req).await;
    assert_eq!(record.ward_id, Some(1));
    assert!(record.is_ward_valid);

    let req = test::TestRequest::put()
        .uri("/api/entities/building/B1/ward")
        .set_json(json!({ "ward": 42 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn maps_failures_to_status_codes() {
    let (_dir, db) = seeded_database();
    let app = app!(db);

    let req = test::TestRequest::put()
        .uri("/api/entities/building/B1/ward")
        .set_json(json!({ "ward": "42" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: ErrorBody = test::read_body_json(resp).await;
    assert_eq!(body.error, "not_found");

    let req = test::TestRequest::put()
        .uri("/api/entities/building/B1/ward")
        .set_json(json!({ "ward": "forty-two" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::put()
        .uri("/api/entities/building/B1/area")
        .set_json(json!({ "area_id": "A1", "token": "T-002" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    let req = test::TestRequest::put()
        .uri("/api/entities/building/B2/area")
        .set_json(json!({ "area_id": "A1", "token": "T-002" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::get()
        .uri("/api/entities/house/B1")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn area_withdrawal_checks_the_caller() {
    let (_dir, db) = seeded_database();
    let app = app!(db);

    let as_user = |req: test::TestRequest, id: &str, role: &str| {
        req.insert_header((USER_ID_HEADER, id.to_string()))
            .insert_header((USER_ROLE_HEADER, role.to_string()))
            .to_request()
    };

    let req = as_user(
        test::TestRequest::post().uri("/api/areas/A1/request"),
        "ENU-1001",
        "enumerator",
    );
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    let req = as_user(
        test::TestRequest::post().uri("/api/areas/A1/approve"),
        "ADM-1",
        "admin",
    );
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = as_user(
        test::TestRequest::post().uri("/api/areas/A1/withdraw"),
        "ENU-2002",
        "enumerator",
    );
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );

    let req = test::TestRequest::post()
        .uri("/api/areas/A1/withdraw")
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );

    let req = test::TestRequest::get().uri("/api/areas/A1").to_request();
    let area: Area = test::call_and_read_body_json(&app, req).await;
    assert_eq!(area.status, AreaStatus::Assigned);
    assert_eq!(area.assigned_to.as_deref(), Some("ENU-1001"));

    let req = as_user(
        test::TestRequest::post().uri("/api/areas/A1/withdraw"),
        "ENU-1001",
        "enumerator",
    );
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/api/areas/A1").to_request();
    let area: Area = test::call_and_read_body_json(&app, req).await;
    assert_eq!(area.status, AreaStatus::Unassigned);
    assert_eq!(area.assigned_to, None);
}

#[actix_web::test]
async fn intake_and_locate() {
    let (_dir, db) = seeded_database();
    let app = app!(db);

    let req = test::TestRequest::post()
        .uri("/api/entities/family")
        .set_json(json!({
            "tmp_ward_number": "1",
            "tmp_area_code": "1",
            "tmp_enumerator_id": "ENU-2"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let record: EntityRecord = test::read_body_json(resp).await;
    assert_eq!(record.area_id.as_deref(), Some("A1"));
    assert_eq!(record.enumerator_name.as_deref(), Some("Bikash"));

    let req = test::TestRequest::get()
        .uri("/api/geo/locate?lng=2.5&lat=9")
        .to_request();
    let located: LocateResult = test::call_and_read_body_json(&app, req).await;
    assert_eq!(located.area_id.as_deref(), Some("A1"));

    let req = test::TestRequest::get()
        .uri("/api/geo/locate?lng=east&lat=9")
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );
}
