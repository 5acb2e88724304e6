use bytes::Bytes;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use webcarros_client::auth::UserInfo;
use webcarros_client::error::Error;
use webcarros_client::listing::{
    Field, ImageFile, ListingComposer, Notifier, UploadState,
};
use webcarros_client::WebCarros;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Notification sink that records every notice for assertions
#[derive(Default)]
struct RecordingNotifier {
    successes: Mutex<Vec<String>>,
    failures: Mutex<Vec<String>>,
}

impl Notifier for RecordingNotifier {
    fn notify_success(&self, message: &str) {
        self.successes.lock().unwrap().push(message.to_string());
    }

    fn notify_failure(&self, message: &str) {
        self.failures.lock().unwrap().push(message.to_string());
    }
}

impl RecordingNotifier {
    fn failures(&self) -> Vec<String> {
        self.failures.lock().unwrap().clone()
    }

    fn successes(&self) -> Vec<String> {
        self.successes.lock().unwrap().clone()
    }
}

fn owner() -> UserInfo {
    UserInfo {
        uid: "owner-1".to_string(),
        name: Some("Ana".to_string()),
        email: Some("ana@example.com".to_string()),
    }
}

fn composer_for(server: &MockServer) -> (ListingComposer, Arc<RecordingNotifier>) {
    let client = WebCarros::new(&server.uri(), "test_anon_key");
    let notifier = Arc::new(RecordingNotifier::default());

    let composer = ListingComposer::new(
        Arc::new(client.storage()),
        Arc::new(client.listings()),
        notifier.clone(),
        owner(),
    );
    (composer, notifier)
}

fn jpeg(name: &str) -> ImageFile {
    ImageFile::new(name, "image/jpeg", Bytes::from_static(b"\xff\xd8\xff\xe0fake"))
}

fn fill_valid_form(composer: &ListingComposer) {
    assert!(composer.set_field(Field::Name, "Onix 1.0").is_none());
    assert!(composer.set_field(Field::Model, "1.0 Flex Plus Manual").is_none());
    assert!(composer.set_field(Field::Year, "2016/2016").is_none());
    assert!(composer.set_field(Field::Km, "23.900").is_none());
    assert!(composer.set_field(Field::Price, "69.000").is_none());
    assert!(composer.set_field(Field::City, "Florianopolis").is_none());
    assert!(composer.set_field(Field::Whatsapp, "01112345678").is_none());
    assert!(composer
        .set_field(Field::Description, "Well maintained, single owner")
        .is_none());
}

fn upload_path() -> &'static str {
    r"^/storage/v1/object/car-images/images/owner-1/[0-9a-f]{8}-[0-9a-f-]{27}$"
}

#[tokio::test]
async fn successful_add_appends_one_entry_with_the_resolved_address() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path_regex(upload_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Key": "ok" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (composer, notifier) = composer_for(&mock_server);

    assert!(composer.media().is_empty());
    let attachment = composer.add_image(jpeg("car.jpg")).await.unwrap();

    let entries = composer.images();
    assert_eq!(composer.media().len(), 1);
    assert!(!composer.media().is_empty());
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0], attachment);
    assert_eq!(attachment.preview, "car.jpg");
    assert_eq!(attachment.owner_uid, "owner-1");
    assert_eq!(
        attachment.url,
        format!(
            "{}/storage/v1/object/public/car-images/images/owner-1/{}",
            mock_server.uri(),
            attachment.id
        )
    );
    assert_eq!(composer.image_status(attachment.id), Some(UploadState::Uploaded));
    assert_eq!(notifier.successes(), vec!["Image uploaded successfully"]);
}

#[tokio::test]
async fn non_image_files_are_rejected_without_any_upload() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (composer, notifier) = composer_for(&mock_server);

    let file = ImageFile::new("car.gif", "image/gif", Bytes::from_static(b"GIF89a"));
    let result = composer.add_image(file).await;

    assert!(matches!(result, Err(Error::UnsupportedMediaType(_))));
    assert!(composer.media().is_empty());
    assert_eq!(composer.media().len(), 0);
    assert_eq!(notifier.failures(), vec!["Send a jpeg or png image"]);
}

#[tokio::test]
async fn failed_upload_is_observable_and_retryable_under_the_same_id() {
    let mock_server = MockServer::start().await;

    let broken = Mock::given(method("POST"))
        .and(path_regex(upload_path()))
        .respond_with(ResponseTemplate::new(500).set_body_string("storage down"))
        .expect(1)
        .mount_as_scoped(&mock_server)
        .await;

    let (composer, notifier) = composer_for(&mock_server);

    let result = composer.add_image(jpeg("car.jpg")).await;
    assert!(result.is_err());
    assert!(composer.images().is_empty());
    assert_eq!(notifier.failures(), vec!["Image upload failed, retry to keep it"]);

    let failed = composer.media().failed();
    assert_eq!(failed.len(), 1);
    let id = failed[0];
    assert_eq!(composer.image_status(id), Some(UploadState::Failed));

    drop(broken);
    Mock::given(method("POST"))
        .and(path_regex(upload_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Key": "ok" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let attachment = composer.retry_image(id).await.unwrap();

    assert_eq!(attachment.id, id);
    assert_eq!(composer.images().len(), 1);
    assert_eq!(composer.image_status(id), Some(UploadState::Uploaded));
    assert!(composer.media().failed().is_empty());
}

#[tokio::test]
async fn remove_deletes_the_remote_object_before_the_entry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path_regex(upload_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Key": "ok" })))
        .mount(&mock_server)
        .await;

    let (composer, _notifier) = composer_for(&mock_server);
    let attachment = composer.add_image(jpeg("car.jpg")).await.unwrap();

    Mock::given(method("DELETE"))
        .and(path(format!(
            "/storage/v1/object/car-images/{}",
            attachment.storage_path()
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "ok" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    composer.remove_image(&attachment).await.unwrap();

    assert!(composer.images().is_empty());
    assert_eq!(composer.image_status(attachment.id), None);
}

#[tokio::test]
async fn remove_treats_a_missing_remote_object_as_deleted() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path_regex(upload_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Key": "ok" })))
        .mount(&mock_server)
        .await;

    let (composer, _notifier) = composer_for(&mock_server);
    let attachment = composer.add_image(jpeg("car.jpg")).await.unwrap();

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&mock_server)
        .await;

    composer.remove_image(&attachment).await.unwrap();

    assert!(composer.images().is_empty());
}

#[tokio::test]
async fn failed_remote_deletion_keeps_the_entry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path_regex(upload_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Key": "ok" })))
        .mount(&mock_server)
        .await;

    let (composer, notifier) = composer_for(&mock_server);
    let attachment = composer.add_image(jpeg("car.jpg")).await.unwrap();

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(500).set_body_string("storage down"))
        .mount(&mock_server)
        .await;

    let result = composer.remove_image(&attachment).await;

    assert!(result.is_err());
    assert_eq!(composer.images(), vec![attachment]);
    assert!(notifier
        .failures()
        .contains(&"Could not remove the image".to_string()));
}

#[tokio::test]
async fn the_collection_reflects_completion_order_not_call_order() {
    let mock_server = MockServer::start().await;

    // The first upload to arrive is held back; the second answers fast.
    Mock::given(method("POST"))
        .and(path_regex(upload_path()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "Key": "ok" }))
                .set_delay(Duration::from_millis(300)),
        )
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path_regex(upload_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Key": "ok" })))
        .mount(&mock_server)
        .await;

    let (composer, _notifier) = composer_for(&mock_server);

    let (first, second) = tokio::join!(composer.add_image(jpeg("one.jpg")), async {
        // Make sure one.jpg reaches the server first
        tokio::time::sleep(Duration::from_millis(50)).await;
        composer.add_image(jpeg("two.jpg")).await
    });
    first.unwrap();
    second.unwrap();

    let previews: Vec<String> = composer.images().iter().map(|a| a.preview.clone()).collect();
    assert_eq!(previews, vec!["two.jpg".to_string(), "one.jpg".to_string()]);
}

#[tokio::test]
async fn submit_with_zero_images_never_touches_the_document_store() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/cars"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (composer, notifier) = composer_for(&mock_server);
    fill_valid_form(&composer);

    let result = composer.submit().await;

    assert!(matches!(result, Err(Error::EmptySubmission)));
    assert_eq!(notifier.failures(), vec!["Send at least one image of the car"]);
}

#[tokio::test]
async fn an_invalid_draft_blocks_the_write() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path_regex(upload_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Key": "ok" })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/cars"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (composer, _notifier) = composer_for(&mock_server);
    composer.add_image(jpeg("car.jpg")).await.unwrap();
    composer.set_field(Field::Name, "Onix 1.0");
    // Everything else left empty

    let result = composer.submit().await;

    match result {
        Err(Error::Validation(errors)) => {
            assert!(errors.for_field(Field::Model).is_some());
            assert!(errors.for_field(Field::Name).is_none());
        }
        other => panic!("expected a validation error, got {:?}", other),
    }
    assert_eq!(composer.images().len(), 1);
}

#[tokio::test]
async fn successful_submit_persists_the_projection_and_resets_local_state() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path_regex(upload_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Key": "ok" })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/cars"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{ "id": 42 }])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (composer, notifier) = composer_for(&mock_server);
    let attachment = composer.add_image(jpeg("car.jpg")).await.unwrap();
    fill_valid_form(&composer);

    let id = composer.submit().await.unwrap();
    assert_eq!(id, "42");

    // The write carried the normalized fields and the projected images
    let requests = mock_server.received_requests().await.unwrap();
    let write = requests
        .iter()
        .find(|r| r.url.path() == "/rest/v1/cars")
        .expect("the listing write should have been sent");
    let body: Value = serde_json::from_slice(&write.body).unwrap();

    assert_eq!(body["name"], "ONIX 1.0");
    assert_eq!(body["model"], "1.0 Flex Plus Manual");
    assert_eq!(body["owner"], "Ana");
    assert_eq!(body["uid"], "owner-1");
    assert!(body["created"].is_string());

    let images = body["images"].as_array().unwrap();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0]["name"], attachment.id.to_string());
    assert_eq!(images[0]["uid"], "owner-1");
    assert_eq!(images[0]["url"], attachment.url);
    assert!(images[0].get("preview").is_none());

    // Draft and collection return to their empty lifecycle state
    assert_eq!(composer.form(), Default::default());
    assert!(composer.images().is_empty());
    assert!(notifier
        .successes()
        .contains(&"Listing created successfully".to_string()));
}

#[tokio::test]
async fn failed_write_preserves_the_draft_and_the_images() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path_regex(upload_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Key": "ok" })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/cars"))
        .respond_with(ResponseTemplate::new(500).set_body_string("db down"))
        .mount(&mock_server)
        .await;

    let (composer, notifier) = composer_for(&mock_server);
    composer.add_image(jpeg("car.jpg")).await.unwrap();
    fill_valid_form(&composer);
    let before = composer.form();

    let result = composer.submit().await;

    assert!(result.is_err());
    assert_eq!(composer.form(), before);
    assert_eq!(composer.images().len(), 1);
    assert!(notifier
        .failures()
        .contains(&"Could not create the listing, try again".to_string()));
}

#[tokio::test]
async fn a_second_submit_is_refused_while_one_is_in_flight() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path_regex(upload_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Key": "ok" })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/cars"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!([{ "id": 42 }]))
                .set_delay(Duration::from_millis(250)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let (composer, _notifier) = composer_for(&mock_server);
    composer.add_image(jpeg("car.jpg")).await.unwrap();
    fill_valid_form(&composer);

    let composer = Arc::new(composer);
    let background = {
        let composer = composer.clone();
        tokio::spawn(async move { composer.submit().await })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    let second = composer.submit().await;
    assert!(matches!(second, Err(Error::SubmissionInFlight)));

    let first = background.await.unwrap();
    assert_eq!(first.unwrap(), "42");
}
