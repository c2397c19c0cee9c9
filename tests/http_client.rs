use std::time::Duration;

use dentoscan_lib::{
    client::{HttpPredictionClient, PredictionService},
    error::{TransportError, GENERIC_REJECTION},
    models::ImageDimensions,
};
use mockito::{Matcher, Server, ServerGuard};

fn client_for(server: &ServerGuard) -> HttpPredictionClient {
    HttpPredictionClient::new(&server.url(), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn successful_prediction_is_parsed() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/predict")
        .match_header(
            "content-type",
            Matcher::Regex("^multipart/form-data".to_string()),
        )
        .match_body(Matcher::Regex(
            r#"name="file"; filename="scan01.dcm""#.to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "png_url": "/static/scan01.png",
                "predictions": [
                    {"class": "Cavity", "x": 120.5, "y": 80.0, "width": 30.0, "height": 24.0, "confidence": 0.874}
                ],
                "image_dimensions": {"width": 1024, "height": 768},
                "report": "One cavity detected."
            }"#,
        )
        .create_async()
        .await;

    let payload = client_for(&server)
        .predict("scan01.dcm", vec![0x44, 0x49, 0x43, 0x4d])
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(
        payload.image_url,
        format!("{}/static/scan01.png", server.url())
    );
    assert_eq!(payload.image_dimensions, Some(ImageDimensions::new(1024, 768)));
    assert_eq!(payload.predictions.len(), 1);
    assert_eq!(payload.predictions[0].label(), "Cavity - 87%");
    assert_eq!(payload.report, "One cavity detected.");
}

#[tokio::test]
async fn null_dimensions_are_still_a_success() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/predict")
        .with_status(200)
        .with_body(
            r#"{"png_url": "/static/a.png", "predictions": [], "image_dimensions": null, "report": "Clear."}"#,
        )
        .create_async()
        .await;

    let payload = client_for(&server)
        .predict("a.rvg", vec![1, 2, 3])
        .await
        .unwrap();
    assert_eq!(payload.image_dimensions, None);
    assert!(payload.predictions.is_empty());
}

#[tokio::test]
async fn rejection_detail_is_surfaced() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/predict")
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"detail": "Invalid file type. Only DICOM and RVG are supported."}"#)
        .create_async()
        .await;

    let err = client_for(&server)
        .predict("a.dcm", vec![1])
        .await
        .unwrap_err();

    match err {
        TransportError::Rejected { status, ref detail } => {
            assert_eq!(status, 400);
            assert_eq!(detail, "Invalid file type. Only DICOM and RVG are supported.");
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn rejection_without_detail_uses_generic_message() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/predict")
        .with_status(500)
        .with_body("Internal Server Error")
        .create_async()
        .await;

    let err = client_for(&server)
        .predict("a.dcm", vec![1])
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), GENERIC_REJECTION);
}

#[tokio::test]
async fn unparsable_success_body_is_malformed() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/predict")
        .with_status(200)
        .with_body("<html>gateway</html>")
        .create_async()
        .await;

    let err = client_for(&server)
        .predict("a.dcm", vec![1])
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Malformed(_)));
}

#[tokio::test]
async fn health_and_image_fetch() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/health")
        .with_status(200)
        .with_body(r#"{"status": "healthy"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/static/a.png")
        .with_status(200)
        .with_header("content-type", "image/png")
        .with_body([0x89, b'P', b'N', b'G'])
        .create_async()
        .await;

    let client = client_for(&server);
    assert!(client.health().await.unwrap());

    let bytes = client
        .fetch_image(&format!("{}/static/a.png", server.url()))
        .await
        .unwrap();
    assert_eq!(bytes, vec![0x89, b'P', b'N', b'G']);
}

#[tokio::test]
async fn missing_processed_image_is_rejected() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/static/missing.png")
        .with_status(404)
        .create_async()
        .await;

    let err = client_for(&server)
        .fetch_image(&format!("{}/static/missing.png", server.url()))
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Rejected { status: 404, .. }));
}
