//! Integration tests for the full upload flow.
//!
//! An editor replaces an image field: the upload is decoded and cropped,
//! the resulting payload is merged into the in-progress edit buffer, and
//! the buffer is committed through the reconciliation engine.

use std::sync::Arc;

use folio_core::{
    About, EditSession, EditorToken, Profile, ReconciliationEngine, RecordSchema, RemoteStore,
    ResumeEntry, MemoryStore,
};
use folio_image::{crop, CropRect, FieldClass, ImageCodec, NormalizedImage};

/// A small PNG with enough pixels to crop.
fn sample_photo() -> Vec<u8> {
    let img = image::RgbaImage::from_fn(64, 48, |x, y| {
        let r = (x * 4 % 256) as u8;
        let g = (y * 5 % 256) as u8;
        image::Rgba([r, g, 90, 255])
    });
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .expect("encode sample png");
    bytes
}

#[tokio::test]
async fn test_avatar_upload_crop_and_commit() {
    let store = Arc::new(MemoryStore::with_collections([Profile::COLLECTION]));
    let engine: ReconciliationEngine<Profile> =
        ReconciliationEngine::new(Arc::clone(&store) as Arc<dyn RemoteStore>);
    let mut session = EditSession::new(
        engine.load().await.expect("initial load"),
        Some(EditorToken::issue()),
    );

    // Decode and crop the uploaded photo.
    let upload = sample_photo();
    let decoded = ImageCodec::new()
        .decode(&upload, "image/png", "avatar.png", FieldClass::Photo)
        .await
        .expect("decode");
    let NormalizedImage::Photo(bitmap) = decoded else {
        panic!("photo uploads decode to bitmaps");
    };
    let rect = CropRect::centered_with_zoom(bitmap.width, bitmap.height, 1.5);
    let payload = crop::apply(&bitmap, rect).expect("crop");

    // Merge the payload into the edit buffer, then commit.
    session.begin().expect("begin");
    session
        .edit(|p| p.image = payload.clone())
        .expect("edit");
    session.save(&engine).await.expect("save");

    assert!(session.committed().image.starts_with("data:image/jpeg;base64,"));

    // The payload round-trips through the store.
    let rows = store.select_all(Profile::COLLECTION).await.expect("select");
    assert_eq!(
        rows[0].get("image_url").and_then(serde_json::Value::as_str),
        Some(session.committed().image.as_str())
    );
}

#[tokio::test]
async fn test_resume_upload_skips_crop_and_commits() {
    let store = Arc::new(MemoryStore::with_collections([About::COLLECTION]));
    let engine: ReconciliationEngine<About> =
        ReconciliationEngine::new(Arc::clone(&store) as Arc<dyn RemoteStore>);
    let mut session = EditSession::new(
        engine.load().await.expect("initial load"),
        Some(EditorToken::issue()),
    );

    let decoded = ImageCodec::new()
        .decode(
            b"%PDF-1.7 resume body",
            "application/pdf",
            "resume.pdf",
            FieldClass::Document,
        )
        .await
        .expect("decode");
    let NormalizedImage::Document { data_uri } = decoded else {
        panic!("documents embed directly");
    };

    session.begin().expect("begin");
    session
        .edit(|about| {
            about.resumes.push(ResumeEntry {
                label: "Web Dev".to_string(),
                url: data_uri.clone(),
            });
        })
        .expect("edit");
    session.save(&engine).await.expect("save");

    let committed = session.committed();
    assert_eq!(committed.resumes.len(), 1);
    assert!(committed.resumes[0]
        .url
        .starts_with("data:application/pdf;base64,"));
}

#[tokio::test]
async fn test_oversized_upload_never_touches_the_session() {
    let store = Arc::new(MemoryStore::with_collections([Profile::COLLECTION]));
    let engine: ReconciliationEngine<Profile> =
        ReconciliationEngine::new(Arc::clone(&store) as Arc<dyn RemoteStore>);
    let mut session = EditSession::new(
        engine.load().await.expect("initial load"),
        Some(EditorToken::issue()),
    );
    let before = session.committed().image.clone();

    let oversized = vec![0_u8; FieldClass::Photo.max_bytes() + 1];
    let result = ImageCodec::new()
        .decode(&oversized, "image/png", "big.png", FieldClass::Photo)
        .await;
    assert!(result.is_err());

    // The rejected upload produced no field value; the record is as loaded.
    assert_eq!(session.committed().image, before);
    session.begin().expect("begin");
    session.cancel();
    assert_eq!(session.committed().image, before);
}
