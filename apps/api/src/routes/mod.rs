pub mod extract;
pub mod health;
pub mod multipart;
pub mod stateless;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::documents::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        // Stored documents
        .route(
            "/documents",
            get(handlers::handle_list_documents).post(handlers::handle_upload_document),
        )
        .route(
            "/documents/",
            get(handlers::handle_list_documents).post(handlers::handle_upload_document),
        )
        .route(
            "/documents/:document_id",
            get(handlers::handle_get_document).delete(handlers::handle_delete_document),
        )
        .route(
            "/documents/:document_id/question",
            post(handlers::handle_ask_question),
        )
        .route(
            "/documents/:document_id/summarise",
            get(handlers::handle_summarise),
        )
        // One-shot, nothing persisted
        .route("/upload", post(stateless::handle_summarise_upload))
        .route("/upload/", post(stateless::handle_summarise_upload))
        .route("/ask", post(stateless::handle_ask_upload))
        .route("/ask/", post(stateless::handle_ask_upload))
        .layer(body_limit)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::multipart::test_support::{content_type, encode, Part};
    use super::*;
    use crate::documents::repository::InMemoryDocumentRepository;
    use crate::extraction::docx::build_docx;
    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
    };
    use httpmock::{Method::POST, MockServer};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(server: &MockServer) -> Router {
        let repo = Arc::new(InMemoryDocumentRepository::default());
        build_router(AppState::for_tests(&server.base_url(), repo))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.expect("router response");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).expect("json body")
        };
        (status, json)
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).expect("request")
    }

    fn multipart_request(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", content_type())
            .body(Body::from(encode(parts)))
            .expect("request")
    }

    fn json_request(uri: &str, payload: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .expect("request")
    }

    async fn mock_single_embedding(server: &MockServer) {
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/embed");
                then.status(200)
                    .json_body(json!({ "embeddings": [[0.5, 0.5, 0.0]] }));
            })
            .await;
    }

    async fn mock_chat_reply(server: &MockServer, needle: &str, reply: &str) {
        let reply = reply.to_string();
        let needle = needle.to_string();
        server
            .mock_async(move |when, then| {
                when.method(POST).path("/api/chat").body_contains(&needle);
                then.status(200).json_body(json!({
                    "message": {"role": "assistant", "content": reply}
                }));
            })
            .await;
    }

    async fn upload_handbook(app: &Router) -> i64 {
        let docx = build_docx(&["Vacation is 25 days.", "Parking is free."]);
        let (status, body) = send(
            app,
            multipart_request(
                "/documents/",
                &[Part::File {
                    name: "file",
                    filename: "handbook.docx",
                    data: &docx,
                }],
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["document_id"].as_i64().expect("document id")
    }

    #[tokio::test]
    async fn test_health() {
        let server = MockServer::start_async().await;
        let (status, body) = send(&app(&server), get_request("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "document-ai");
    }

    #[tokio::test]
    async fn test_upload_then_list_and_get() {
        let server = MockServer::start_async().await;
        mock_single_embedding(&server).await;
        let app = app(&server);

        let docx = build_docx(&["Vacation is 25 days.", "Parking is free."]);
        let (status, body) = send(
            &app,
            multipart_request(
                "/documents/",
                &[Part::File {
                    name: "file",
                    filename: "handbook.docx",
                    data: &docx,
                }],
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["message"], "Document created");
        assert_eq!(body["chunk_count"], 1);

        let (status, list) = send(&app, get_request("/documents")).await;
        assert_eq!(status, StatusCode::OK);
        let list = list.as_array().expect("array");
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["filename"], "handbook.docx");
        assert_eq!(
            list[0]["text_content"],
            "Vacation is 25 days.\nParking is free.\n"
        );
        assert!(list[0]["uploaded_at"].is_string());

        let id = body["document_id"].as_i64().unwrap();
        let (status, doc) = send(&app, get_request(&format!("/documents/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(doc["id"], id);
    }

    #[tokio::test]
    async fn test_upload_unsupported_extension_is_400() {
        let server = MockServer::start_async().await;
        let (status, body) = send(
            &app(&server),
            multipart_request(
                "/documents/",
                &[Part::File {
                    name: "file",
                    filename: "notes.txt",
                    data: b"plain text",
                }],
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["detail"],
            "Unsupported file type: notes.txt. Only PDF and DOCX are supported."
        );
    }

    #[tokio::test]
    async fn test_upload_without_file_is_422() {
        let server = MockServer::start_async().await;
        let (status, body) = send(
            &app(&server),
            multipart_request(
                "/documents/",
                &[Part::Text {
                    name: "note",
                    value: "no file here",
                }],
            ),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].as_str().unwrap().contains("file"));
    }

    #[tokio::test]
    async fn test_oversized_upload_is_413() {
        let server = MockServer::start_async().await;
        let big = vec![b'x'; 70_000];
        let (status, _) = send(
            &app(&server),
            multipart_request(
                "/documents/",
                &[Part::File {
                    name: "file",
                    filename: "big.pdf",
                    data: &big,
                }],
            ),
        )
        .await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_broken_pdf_is_500_with_detail() {
        let server = MockServer::start_async().await;
        let (status, body) = send(
            &app(&server),
            multipart_request(
                "/documents/",
                &[Part::File {
                    name: "file",
                    filename: "broken.pdf",
                    data: b"not a pdf at all",
                }],
            ),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["detail"]
            .as_str()
            .unwrap()
            .starts_with("An error occurred while processing the request: "));
    }

    #[tokio::test]
    async fn test_question_about_stored_document() {
        let server = MockServer::start_async().await;
        mock_single_embedding(&server).await;
        mock_chat_reply(&server, "Question: How much vacation?", "25 days.").await;
        let app = app(&server);
        let id = upload_handbook(&app).await;

        let (status, body) = send(
            &app,
            json_request(
                &format!("/documents/{id}/question"),
                json!({ "question": "How much vacation?" }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["answer"], "25 days.");
    }

    #[tokio::test]
    async fn test_question_about_missing_document_is_404() {
        let server = MockServer::start_async().await;
        let (status, body) = send(
            &app(&server),
            json_request("/documents/99/question", json!({ "question": "Hello?" })),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Document not found");
    }

    #[tokio::test]
    async fn test_summarise_stored_document() {
        let server = MockServer::start_async().await;
        mock_single_embedding(&server).await;
        mock_chat_reply(&server, "Summarize the following text:", "An HR handbook.").await;
        let app = app(&server);
        let id = upload_handbook(&app).await;

        let (status, body) = send(&app, get_request(&format!("/documents/{id}/summarise"))).await;

        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["summary"], "An HR handbook.");
    }

    #[tokio::test]
    async fn test_summarise_missing_document_is_404() {
        let server = MockServer::start_async().await;
        let (status, _) = send(&app(&server), get_request("/documents/7/summarise")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_llm_failure_is_500() {
        let server = MockServer::start_async().await;
        mock_single_embedding(&server).await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/chat");
                then.status(500).json_body(json!({"error": "model crashed"}));
            })
            .await;
        let app = app(&server);
        let id = upload_handbook(&app).await;

        let (status, body) = send(&app, get_request(&format!("/documents/{id}/summarise"))).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["detail"].as_str().unwrap().contains("model crashed"));
    }

    #[tokio::test]
    async fn test_delete_document() {
        let server = MockServer::start_async().await;
        mock_single_embedding(&server).await;
        let app = app(&server);
        let id = upload_handbook(&app).await;

        let delete = |id: i64| {
            Request::builder()
                .method(Method::DELETE)
                .uri(format!("/documents/{id}"))
                .body(Body::empty())
                .expect("request")
        };

        let (status, _) = send(&app, delete(id)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, delete(id)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, list) = send(&app, get_request("/documents/")).await;
        assert_eq!(list, json!([]));
    }

    #[tokio::test]
    async fn test_stateless_upload_summarises_without_storing() {
        let server = MockServer::start_async().await;
        mock_chat_reply(&server, "Summarize the following text:", "Short summary.").await;
        let app = app(&server);
        let docx = build_docx(&["Meeting notes"]);

        let (status, body) = send(
            &app,
            multipart_request(
                "/upload/",
                &[Part::File {
                    name: "file",
                    filename: "notes.docx",
                    data: &docx,
                }],
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["summary"], "Short summary.");

        let (_, list) = send(&app, get_request("/documents/")).await;
        assert_eq!(list, json!([]));
    }

    #[tokio::test]
    async fn test_stateless_ask() {
        let server = MockServer::start_async().await;
        mock_chat_reply(&server, "Question: Who attended?", "Alice and Bob.").await;
        let app = app(&server);
        let docx = build_docx(&["Attendees: Alice, Bob"]);

        let (status, body) = send(
            &app,
            multipart_request(
                "/ask/",
                &[
                    Part::Text {
                        name: "question",
                        value: "Who attended?",
                    },
                    Part::File {
                        name: "file",
                        filename: "notes.docx",
                        data: &docx,
                    },
                ],
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["answer"], "Alice and Bob.");
    }

    #[tokio::test]
    async fn test_stateless_ask_requires_question() {
        let server = MockServer::start_async().await;
        let docx = build_docx(&["Attendees: Alice, Bob"]);

        let (status, body) = send(
            &app(&server),
            multipart_request(
                "/ask",
                &[Part::File {
                    name: "file",
                    filename: "notes.docx",
                    data: &docx,
                }],
            ),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].as_str().unwrap().contains("question"));
    }

    #[tokio::test]
    async fn test_question_without_question_field_is_422_json() {
        let server = MockServer::start_async().await;
        let (status, body) = send(
            &app(&server),
            json_request("/documents/1/question", json!({ "q": "x" })),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(
            body["detail"].as_str().unwrap().contains("missing field `question`"),
            "{body}"
        );
    }

    #[tokio::test]
    async fn test_negative_top_k_is_422_json() {
        let server = MockServer::start_async().await;
        let (status, body) = send(
            &app(&server),
            json_request(
                "/documents/1/question",
                json!({ "question": "x", "top_k": -1 }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].as_str().unwrap().contains("top_k"), "{body}");
    }

    #[tokio::test]
    async fn test_malformed_json_is_400_json() {
        let server = MockServer::start_async().await;
        let request = Request::builder()
            .method(Method::POST)
            .uri("/documents/1/question")
            .header("content-type", "application/json")
            .body(Body::from("{\"question\":"))
            .expect("request");

        let (status, body) = send(&app(&server), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].is_string(), "{body}");
    }

    #[tokio::test]
    async fn test_non_numeric_document_id_is_400_json() {
        let server = MockServer::start_async().await;
        let app = app(&server);

        for request in [
            get_request("/documents/abc"),
            get_request("/documents/abc/summarise"),
        ] {
            let (status, body) = send(&app, request).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(
                body["detail"].as_str().unwrap().contains("abc"),
                "{body}"
            );
        }
    }

    #[tokio::test]
    async fn test_upload_without_multipart_body_is_400_json() {
        let server = MockServer::start_async().await;
        let (status, body) = send(
            &app(&server),
            json_request("/upload/", json!({ "file": "report.pdf" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].is_string(), "{body}");
    }
}
