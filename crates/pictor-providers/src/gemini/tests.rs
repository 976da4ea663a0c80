use super::*;

fn generator() -> GeminiImageGenerator {
    GeminiImageGenerator::from_config(GeminiConfig {
        api_key: "AIza-test".into(),
        ..Default::default()
    })
    .unwrap()
}

fn parse(json: &str) -> GeminiResponse {
    serde_json::from_str(json).unwrap()
}

#[test]
fn test_gemini_provider_name() {
    let g = generator();
    assert_eq!(g.name(), "gemini");
    assert_eq!(g.model(), "gemini-2.0-flash-preview-image-generation");
}

#[test]
fn test_request_serialization() {
    let body = generator().request_body("A serene beach with palm trees");
    let json = serde_json::to_value(&body).unwrap();
    assert_eq!(json["contents"][0]["role"], "user");
    assert_eq!(
        json["contents"][0]["parts"][0]["text"],
        "Generate an image depicting: A serene beach with palm trees"
    );
    assert!(json["contents"][0]["parts"][0].get("inlineData").is_none());
    assert_eq!(
        json["generationConfig"]["responseModalities"],
        serde_json::json!(["TEXT", "IMAGE"])
    );
}

#[test]
fn test_extract_image() {
    let encoded = BASE64.encode([0x89, b'P', b'N', b'G']);
    let json = format!(
        r#"{{"candidates":[{{"content":{{"role":"model","parts":[
            {{"text":"Here is your cat."}},
            {{"inlineData":{{"mimeType":"image/png","data":"{encoded}"}}}}
        ]}},"finishReason":"STOP"}}]}}"#
    );
    let image = extract_image(parse(&json), "m").unwrap();
    assert_eq!(image.data, vec![0x89, b'P', b'N', b'G']);
    assert_eq!(image.mime_type, "image/png");
    assert_eq!(image.caption.as_deref(), Some("Here is your cat."));
    assert_eq!(image.model, "m");
}

#[test]
fn test_extract_skips_non_image_inline_data() {
    let pdf = BASE64.encode(b"%PDF");
    let jpg = BASE64.encode([0xff, 0xd8]);
    let json = format!(
        r#"{{"candidates":[{{"content":{{"parts":[
            {{"inlineData":{{"mimeType":"application/pdf","data":"{pdf}"}}}},
            {{"inlineData":{{"mimeType":"image/jpeg","data":"{jpg}"}}}}
        ]}}}}]}}"#
    );
    let image = extract_image(parse(&json), "m").unwrap();
    assert_eq!(image.mime_type, "image/jpeg");
    assert_eq!(image.data, vec![0xff, 0xd8]);
    assert!(image.caption.is_none());
}

#[test]
fn test_blocked_prompt() {
    let json = r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#;
    let err = extract_image(parse(json), "m").unwrap_err();
    assert!(matches!(err, PictorError::Blocked(ref r) if r == "SAFETY"));
}

#[test]
fn test_stopped_for_safety() {
    let json = r#"{"candidates":[{"content":{"parts":[]},"finishReason":"IMAGE_SAFETY"}]}"#;
    let err = extract_image(parse(json), "m").unwrap_err();
    assert!(matches!(err, PictorError::Stopped(ref r) if r == "IMAGE_SAFETY"));
}

#[test]
fn test_text_only_response_is_no_image() {
    let json = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"I can only describe images."}]},"finishReason":"STOP"}]}"#;
    let err = extract_image(parse(json), "m").unwrap_err();
    assert!(matches!(err, PictorError::NoImage));
}

#[test]
fn test_empty_response_is_no_image() {
    let err = extract_image(parse("{}"), "m").unwrap_err();
    assert!(matches!(err, PictorError::NoImage));

    let err = extract_image(parse(r#"{"candidates":[{}]}"#), "m").unwrap_err();
    assert!(matches!(err, PictorError::NoImage));
}

#[test]
fn test_invalid_base64_is_provider_error() {
    let json = r#"{"candidates":[{"content":{"parts":[{"inlineData":{"mimeType":"image/png","data":"***"}}]}}]}"#;
    let err = extract_image(parse(json), "m").unwrap_err();
    assert!(matches!(err, PictorError::Provider(_)));
}

#[tokio::test]
async fn test_unavailable_without_key() {
    let g = GeminiImageGenerator::from_config(GeminiConfig::default()).unwrap();
    assert!(!g.is_available().await);
}
