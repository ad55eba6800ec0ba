use actix_web::{test, App};
use serde_json::{json, Value};

use super::{sample_patient, test_config, test_pool};
use crate::{
    ac::Role,
    api,
    auth::token::Claims,
    fallible::Error,
    models::{AppointmentInput, HistoryInput, Patient, PatientInput, Sex},
};

#[actix_rt::test]
async fn test_new_patients_start_active() {
    let db = test_pool().await;
    let id = Patient::create(&db, &sample_patient()).await.unwrap();

    let patient = Patient::find(&db, id).await.unwrap().unwrap();
    assert!(!patient.archived);

    let active = Patient::list(&db, false).await.unwrap();
    assert!(active.iter().any(|p| p.id == id));
    let archived = Patient::list(&db, true).await.unwrap();
    assert!(!archived.iter().any(|p| p.id == id));
}

#[actix_rt::test]
async fn test_archive_restore_roundtrip() {
    let db = test_pool().await;
    let id = Patient::create(&db, &sample_patient()).await.unwrap();
    let before = Patient::find(&db, id).await.unwrap().unwrap();

    Patient::archive(&db, id).await.unwrap();
    let archived = Patient::find(&db, id).await.unwrap().unwrap();
    assert!(archived.archived);
    assert!(Patient::list(&db, false).await.unwrap().is_empty());
    assert_eq!(Patient::list(&db, true).await.unwrap().len(), 1);

    // archiving an archived record is a silent no-op
    Patient::archive(&db, id).await.unwrap();

    Patient::restore(&db, id).await.unwrap();
    let after = Patient::find(&db, id).await.unwrap().unwrap();
    assert!(!after.archived);

    // every other field survives the roundtrip
    assert_eq!(after.name, before.name);
    assert_eq!(after.age, before.age);
    assert_eq!(after.sex, before.sex);
    assert_eq!(after.phone, before.phone);
    assert_eq!(after.weight, before.weight);
    assert_eq!(after.height, before.height);
    assert_eq!(after.created_at, before.created_at);
}

#[actix_rt::test]
async fn test_archive_unknown_id_is_not_found() {
    let db = test_pool().await;
    Patient::create(&db, &sample_patient()).await.unwrap();

    assert!(matches!(
        Patient::archive(&db, 4242).await,
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        Patient::restore(&db, 4242).await,
        Err(Error::NotFound(_))
    ));

    // and nothing was mutated
    assert_eq!(Patient::list(&db, false).await.unwrap().len(), 1);
    assert!(Patient::list(&db, true).await.unwrap().is_empty());
}

#[actix_rt::test]
async fn test_delete_is_terminal() {
    let db = test_pool().await;
    let id = Patient::create(&db, &sample_patient()).await.unwrap();
    Patient::archive(&db, id).await.unwrap();

    Patient::delete(&db, id).await.unwrap();

    assert!(Patient::list(&db, false).await.unwrap().is_empty());
    assert!(Patient::list(&db, true).await.unwrap().is_empty());
    assert!(matches!(
        Patient::delete(&db, id).await,
        Err(Error::NotFound(_))
    ));
}

#[actix_rt::test]
async fn test_update_edits_fields_not_state() {
    let db = test_pool().await;
    let id = Patient::create(&db, &sample_patient()).await.unwrap();
    Patient::archive(&db, id).await.unwrap();

    let mut input = sample_patient();
    input.weight = 80.0;
    input.phone = "0798765432".to_string();
    Patient::update(&db, id, &input).await.unwrap();

    let patient = Patient::find(&db, id).await.unwrap().unwrap();
    assert_eq!(patient.weight, 80.0);
    assert_eq!(patient.phone, "0798765432");
    // the archival state is not touched by an edit
    assert!(patient.archived);

    assert!(matches!(
        Patient::update(&db, 4242, &input).await,
        Err(Error::NotFound(_))
    ));
}

#[actix_rt::test]
async fn test_input_validation() {
    let db = test_pool().await;

    let mut input = sample_patient();
    input.name = "   ".to_string();
    assert!(matches!(
        Patient::create(&db, &input).await,
        Err(Error::Validation(_))
    ));

    let mut input = sample_patient();
    input.age = -1;
    assert!(matches!(
        Patient::create(&db, &input).await,
        Err(Error::Validation(_))
    ));

    let mut input = sample_patient();
    input.height = 0.0;
    assert!(matches!(
        Patient::create(&db, &input).await,
        Err(Error::Validation(_))
    ));
}

#[actix_rt::test]
async fn test_search_is_case_sensitive() {
    let db = test_pool().await;
    let jean = Patient::create(&db, &sample_patient()).await.unwrap();
    let jeanne = Patient::create(
        &db,
        &PatientInput {
            name: "jeanne petit".to_string(),
            age: 31,
            sex: Sex::Female,
            phone: "0611223344".to_string(),
            weight: 58.0,
            height: 164.0,
        },
    )
    .await
    .unwrap();

    let hits = Patient::search(&db, "Jean", None).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, jean);

    let hits = Patient::search(&db, "jean", None).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, jeanne);

    // the archival filter narrows the match further
    Patient::archive(&db, jean).await.unwrap();
    assert!(Patient::search(&db, "Jean", Some(false))
        .await
        .unwrap()
        .is_empty());
    assert_eq!(
        Patient::search(&db, "Jean", Some(true)).await.unwrap().len(),
        1
    );
}

#[actix_rt::test]
async fn test_list_all_ignores_state() {
    let db = test_pool().await;
    let first = Patient::create(&db, &sample_patient()).await.unwrap();
    let second = Patient::create(
        &db,
        &PatientInput {
            name: "Marie Lambert".to_string(),
            age: 32,
            sex: Sex::Female,
            phone: "0687654321".to_string(),
            weight: 65.7,
            height: 162.0,
        },
    )
    .await
    .unwrap();
    Patient::archive(&db, first).await.unwrap();

    let all = Patient::list_all(&db).await.unwrap();
    assert_eq!(all.len(), 2);
    // newest first
    assert_eq!(all[0].id, second);
    assert_eq!(all[1].id, first);
}

#[actix_rt::test]
async fn test_history_is_append_only_and_newest_first() {
    let db = test_pool().await;
    let id = Patient::create(&db, &sample_patient()).await.unwrap();

    Patient::history_add(
        &db,
        id,
        &HistoryInput {
            notes: Some("first consultation".to_string()),
            weight: Some(82.5),
        },
    )
    .await
    .unwrap();
    Patient::history_add(
        &db,
        id,
        &HistoryInput {
            notes: Some("follow-up".to_string()),
            weight: Some(81.0),
        },
    )
    .await
    .unwrap();

    let history = Patient::history_list(&db, id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].notes.as_deref(), Some("follow-up"));
    assert_eq!(history[1].notes.as_deref(), Some("first consultation"));

    let missing = Patient::history_add(&db, 4242, &HistoryInput {
        notes: None,
        weight: None,
    })
    .await;
    assert!(matches!(missing, Err(Error::NotFound(_))));
}

#[actix_rt::test]
async fn test_statistics_counts() {
    let db = test_pool().await;
    let owner = crate::models::User::create(&db, "dietitian", "password", Role::Dietitian)
        .await
        .unwrap();

    let first = Patient::create(&db, &sample_patient()).await.unwrap();
    Patient::create(
        &db,
        &PatientInput {
            name: "Marie Lambert".to_string(),
            age: 32,
            sex: Sex::Female,
            phone: "0687654321".to_string(),
            weight: 65.7,
            height: 162.0,
        },
    )
    .await
    .unwrap();
    Patient::archive(&db, first).await.unwrap();

    crate::models::Appointment::create(
        &db,
        owner,
        &AppointmentInput {
            patient_id: first,
            date: chrono::NaiveDate::from_ymd_opt(2026, 9, 1)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            notes: None,
        },
    )
    .await
    .unwrap();

    let stats = Patient::statistics(&db).await.unwrap();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.active, 1);
    assert_eq!(stats.archived, 1);
    assert_eq!(stats.appointments, 1);
}

/// The full registration-to-archive flow over HTTP.
#[actix_rt::test]
async fn test_archive_flow_over_http() {
    let db = test_pool().await;
    let config = test_config();
    let staff = crate::models::User::create(&db, "dietitian", "password", Role::Dietitian)
        .await
        .unwrap();
    let token = Claims::new(staff, "dietitian".to_string(), Role::Dietitian).sign(&config.jwt_secret.0);
    let bearer = format!("Bearer {}", token);

    let mut app = test::init_service(
        App::new()
            .data(db.clone())
            .data(config.clone())
            .service(api::patients::list)
            .service(api::patients::create)
            .service(api::patients::archive),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/patients")
        .header("Authorization", bearer.as_str())
        .set_json(&json!({
            "name": "Jean Dupont",
            "age": 45,
            "sex": "M",
            "phone": "0712345678",
            "weight": 82.5,
            "height": 178,
        }))
        .to_request();
    let body: Value = test::read_response_json(&mut app, req).await;
    assert_eq!(body["success"], json!(true));
    let id = body["id"].as_i64().expect("creation returns an id");

    let req = test::TestRequest::put()
        .uri(&format!("/api/patients/{}/archive", id))
        .header("Authorization", bearer.as_str())
        .to_request();
    let body: Value = test::read_response_json(&mut app, req).await;
    assert_eq!(body, json!({ "success": true }));

    let req = test::TestRequest::get()
        .uri("/api/patients?archived=false")
        .header("Authorization", bearer.as_str())
        .to_request();
    let body: Value = test::read_response_json(&mut app, req).await;
    assert!(!body["patients"]
        .as_array()
        .unwrap()
        .iter()
        .any(|p| p["id"] == json!(id)));

    let req = test::TestRequest::get()
        .uri("/api/patients?archived=true")
        .header("Authorization", bearer.as_str())
        .to_request();
    let body: Value = test::read_response_json(&mut app, req).await;
    assert!(body["patients"]
        .as_array()
        .unwrap()
        .iter()
        .any(|p| p["id"] == json!(id)));
}

#[actix_rt::test]
async fn test_malformed_id_is_a_validation_error() {
    let db = test_pool().await;
    let config = test_config();
    let staff = crate::models::User::create(&db, "dietitian", "password", Role::Dietitian)
        .await
        .unwrap();
    let token = Claims::new(staff, "dietitian".to_string(), Role::Dietitian).sign(&config.jwt_secret.0);

    let mut app = test::init_service(
        App::new()
            .data(db.clone())
            .data(config.clone())
            .app_data(actix_web::web::PathConfig::default().error_handler(|_, _| {
                Error::Validation("invalid id in path".to_string()).into()
            }))
            .service(api::patients::archive),
    )
    .await;

    let req = test::TestRequest::put()
        .uri("/api/patients/not-a-number/archive")
        .header("Authorization", format!("Bearer {}", token))
        .to_request();
    let resp = test::call_service(&mut app, req).await;
    assert_eq!(resp.status(), 400);
}
