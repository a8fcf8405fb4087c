use std::time::Duration;

use pretty_assertions::assert_eq;
use secq_engine::{
    parse_base_url, AnalysisRequestBody, Backend, BackendSettings, FailureKind, JobState,
    ReqwestBackend, ResultRecord,
};
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend_for(server: &MockServer) -> ReqwestBackend {
    let settings = BackendSettings {
        base_url: server.uri(),
        ..BackendSettings::default()
    };
    ReqwestBackend::new(&settings).expect("backend")
}

#[test]
fn base_url_keeps_path_prefix() {
    let base = parse_base_url("http://example.com/app").unwrap();
    assert_eq!(base.as_str(), "http://example.com/app/");
    assert_eq!(
        base.join("process_status").unwrap().as_str(),
        "http://example.com/app/process_status"
    );
    let err = parse_base_url("not a url").unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}

#[test]
fn backend_keeps_the_normalised_root() {
    let settings = BackendSettings {
        base_url: " http://analysis.local:9000/api ".to_string(),
        ..BackendSettings::default()
    };
    let backend = ReqwestBackend::new(&settings).unwrap();
    let expected = Url::parse("http://analysis.local:9000/api/").unwrap();
    assert_eq!(backend.base_url(), &expected);

    let err = parse_base_url("mailto:security@example.com").unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}

#[tokio::test]
async fn upload_posts_multipart_file_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload_pdf"))
        .and(body_string_contains("name=\"file\""))
        .and(body_string_contains("filename=\"report.pdf\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    backend
        .upload_file("report.pdf", b"%PDF-1.4".to_vec())
        .await
        .expect("upload ok");
}

#[tokio::test]
async fn upload_rejection_maps_to_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload_pdf"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    let err = backend_for(&server)
        .upload_file("x.pdf", Vec::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(400));
}

#[tokio::test]
async fn remove_encodes_file_name_as_path_segment() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/remove_pdf/my%20report.pdf"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    backend_for(&server)
        .remove_file("my report.pdf")
        .await
        .expect("remove ok");
}

#[tokio::test]
async fn lists_are_decoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get_uploaded_pdfs"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"uploaded_pdfs": ["a.pdf", "b.eml"]})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/get_anonymized_files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"anonymized_files": []})))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    assert_eq!(
        backend.uploaded_files().await.unwrap(),
        vec!["a.pdf".to_string(), "b.eml".to_string()]
    );
    assert!(backend.anonymized_files().await.unwrap().is_empty());
}

#[tokio::test]
async fn malformed_list_is_a_decode_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get_uploaded_pdfs"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = backend_for(&server).uploaded_files().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
}

#[tokio::test]
async fn suggestions_send_partial_input_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/suggestions/suggest_questions"))
        .and(query_param("partial_input", "data enc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"suggestions": ["Is data encrypted at rest?"]}),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let suggestions = backend_for(&server)
        .suggest_questions("data enc")
        .await
        .unwrap();
    assert_eq!(suggestions, vec!["Is data encrypted at rest?".to_string()]);
}

#[tokio::test]
async fn submission_posts_json_body_and_accepts_202() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/process_questions"))
        .and(body_json(json!({
            "ai_model": "mpnet",
            "api_key": "",
            "questions": ["Q1", "Q2"],
        })))
        .respond_with(
            ResponseTemplate::new(202)
                .set_body_json(json!({"message": "Processing started in the background"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let body = AnalysisRequestBody {
        ai_model: "mpnet".to_string(),
        api_key: String::new(),
        questions: vec!["Q1".to_string(), "Q2".to_string()],
    };
    backend_for(&server)
        .submit_questions(&body)
        .await
        .expect("submission accepted");
}

#[tokio::test]
async fn status_decodes_processing_and_complete() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/process_status"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({"status": "processing"})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/process_status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "complete",
            "results": [
                {"question": "Q1", "answer": "A1", "source": "a.pdf", "citation": "p1"},
                {"question": "Q2", "answer": "A2", "source": "b.pdf"},
            ],
        })))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let first = backend.process_status().await.unwrap();
    assert_eq!(first.status, JobState::Processing);
    assert_eq!(first.results, None);

    let second = backend.process_status().await.unwrap();
    assert_eq!(second.status, JobState::Complete);
    let results = second.results.unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(
        results[1],
        ResultRecord {
            question: "Q2".to_string(),
            answer: "A2".to_string(),
            source: "b.pdf".to_string(),
            citation: String::new(),
        }
    );
}

#[tokio::test]
async fn status_error_body_is_read_despite_500() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/process_status"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({"status": "error", "message": "model crashed"})),
        )
        .mount(&server)
        .await;

    let status = backend_for(&server).process_status().await.unwrap();
    assert_eq!(status.status, JobState::Error);
    assert_eq!(status.message.as_deref(), Some("model crashed"));
}

#[tokio::test]
async fn status_without_document_is_http_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/process_status"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let err = backend_for(&server).process_status().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(502));
}

#[tokio::test]
async fn slow_server_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get_uploaded_pdfs"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!({"uploaded_pdfs": []})),
        )
        .mount(&server)
        .await;

    let settings = BackendSettings {
        base_url: server.uri(),
        request_timeout: Duration::from_millis(50),
        ..BackendSettings::default()
    };
    let backend = ReqwestBackend::new(&settings).unwrap();
    let err = backend.uploaded_files().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}
