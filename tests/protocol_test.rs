mod common;

use acme_rfc8555::prelude::*;
use common::MockAcmeServer;

#[tokio::test]
async fn problem_document_is_decoded_with_detail_and_status() -> Result<()> {
    let mut mock_server = MockAcmeServer::new().await;
    let _m_dir = mock_server.mock_directory().await;
    let _m_nonce = mock_server.mock_new_nonce().await;

    let _m_account = mock_server
        .server
        .mock("POST", "/new-account")
        .with_status(400)
        .with_header("content-type", "application/problem+json")
        .with_body(
            serde_json::json!({
                "type": "urn:ietf:params:acme:error:malformed",
                "detail": "contact field invalid",
                "status": 400
            })
            .to_string(),
        )
        .create_async()
        .await;

    let key = KeyMaterial::generate()?;
    let mut session = AcmeSession::new(format!("{}/directory", mock_server.url()), key);

    let err = session
        .register_account(&[Contact::email("admin@example.com")], true)
        .await
        .unwrap_err();

    match err {
        AcmeError::AcmeServer { problem } => {
            assert_eq!(problem.problem_type, "urn:ietf:params:acme:error:malformed");
            assert_eq!(problem.detail.as_deref(), Some("contact field invalid"));
            assert_eq!(problem.status, Some(400));
        }
        other => panic!("expected AcmeServer error, got {other:?}"),
    }

    Ok(())
}

#[tokio::test]
async fn non_problem_json_error_body_falls_back_to_raw_detail() -> Result<()> {
    let mut mock_server = MockAcmeServer::new().await;
    let _m_dir = mock_server.mock_directory().await;
    let _m_nonce = mock_server.mock_new_nonce().await;

    let _m_account = mock_server
        .server
        .mock("POST", "/new-account")
        .with_status(502)
        .with_body("upstream timeout")
        .create_async()
        .await;

    let key = KeyMaterial::generate()?;
    let mut session = AcmeSession::new(format!("{}/directory", mock_server.url()), key);

    let err = session
        .register_account(&[Contact::email("admin@example.com")], true)
        .await
        .unwrap_err();

    match err {
        AcmeError::AcmeServer { problem } => {
            assert_eq!(problem.status, Some(502));
            assert!(problem.detail.is_some());
        }
        other => panic!("expected AcmeServer error, got {other:?}"),
    }

    Ok(())
}
