//! End-to-end pipeline tests: batches flow through fingerprinting,
//! catalog-backed duplicate lookup, the pause/resume protocol, object
//! storage, and tag-usage accounting.

use std::io::Cursor;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use image::{DynamicImage, ImageBuffer, Luma};
use serde_json::json;

use refimage::{
    apply_tag_change, BatchConfig, BatchPhase, CatalogDuplicateChecker, CatalogProvider,
    CatalogRecord, ClassifierConfig, DuplicateProbe, IncomingFile, IngestionCoordinator,
    LookupError, MatchKind, MemoryCounterStore, MemoryObjectStore, TagUsageLedger,
    TagValue, VocabularySchema,
};

/// Synthesize a small PNG per seed: a 64-bit scramble of the seed painted
/// as an 8x8 grid of black/white blocks, so different seeds land perceptual
/// hashes roughly half their bits apart.
fn png(seed: u8) -> Vec<u8> {
    let mut z = (seed as u64).wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    let pattern = z ^ (z >> 31);
    let img = DynamicImage::ImageLuma8(ImageBuffer::from_fn(16, 16, |x, y| {
        let cell = (y / 2) * 8 + (x / 2);
        Luma([if pattern >> cell & 1 == 1 { 255 } else { 0 }])
    }));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png)
        .expect("png encode");
    buf.into_inner()
}

fn file(name: &str, bytes: Vec<u8>) -> IncomingFile {
    IncomingFile::new(name, "image/png", bytes)
}

/// Shared in-memory catalog; the lookup classifies probes against whatever
/// records the test has seeded. Also records which filenames were probed so
/// tests can assert the pipeline stops consulting the catalog while paused.
#[derive(Clone, Default)]
struct SharedCatalog {
    records: Arc<Mutex<Vec<CatalogRecord>>>,
    probed: Arc<Mutex<Vec<String>>>,
}

impl SharedCatalog {
    fn seed(&self, record: CatalogRecord) {
        self.records.lock().unwrap().push(record);
    }

    fn probed(&self) -> Vec<String> {
        self.probed.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogProvider for SharedCatalog {
    async fn candidates(&self, probe: &DuplicateProbe) -> Result<Vec<CatalogRecord>, LookupError> {
        self.probed.lock().unwrap().push(probe.filename.clone());
        Ok(self.records.lock().unwrap().clone())
    }
}

fn coordinator(
    catalog: &SharedCatalog,
) -> IngestionCoordinator<CatalogDuplicateChecker<SharedCatalog>, MemoryObjectStore> {
    let lookup = CatalogDuplicateChecker::new(catalog.clone(), ClassifierConfig::default());
    IngestionCoordinator::new(BatchConfig::default(), lookup, MemoryObjectStore::new())
        .expect("default config is valid")
}

#[tokio::test]
async fn clean_batch_uploads_everything_in_order() {
    let catalog = SharedCatalog::default();
    let coordinator = coordinator(&catalog);

    let session = coordinator
        .check_files(vec![file("a.png", png(1)), file("b.png", png(2))])
        .await;

    assert!(session.is_complete());
    assert_eq!(session.phase(), BatchPhase::Complete);
    let names: Vec<&str> = session.uploaded().iter().map(|u| u.filename.as_str()).collect();
    assert_eq!(names, ["a.png", "b.png"]);
    assert!(session.failures().is_empty());
    assert!(coordinator.store().contains("reference-images/a.png"));
    assert!(coordinator.store().contains("reference-images/b.png"));
}

#[tokio::test]
async fn exact_duplicate_pauses_and_skip_resumes() {
    let catalog = SharedCatalog::default();
    let dup_bytes = png(3);
    let existing = refimage::fingerprint(&dup_bytes).expect("fingerprint");
    catalog.seed(CatalogRecord::from_fingerprint("original.png", &existing));

    let coordinator = coordinator(&catalog);
    let mut session = coordinator
        .check_files(vec![
            file("1.png", png(1)),
            file("2.png", png(2)),
            file("3.png", dup_bytes),
            file("4.png", png(4)),
            file("5.png", png(5)),
        ])
        .await;

    // Paused on the third file; the first two are already uploaded and the
    // last two have not been touched yet.
    assert_eq!(session.phase(), BatchPhase::PausedOnDuplicate);
    assert_eq!(session.uploaded().len(), 2);
    assert_eq!(session.pending_len(), 2);
    assert_eq!(catalog.probed(), ["1.png", "2.png", "3.png"]);

    let active = session.active_decision().expect("a decision is pending");
    assert_eq!(active.file.filename, "3.png");
    assert_eq!(active.result.kind, MatchKind::Exact);
    assert_eq!(active.result.confidence, 100);

    // Viewing the matched record does not commit a decision.
    let viewed = session.view_existing().expect("matched record");
    assert_eq!(viewed.filename, "original.png");
    assert_eq!(session.phase(), BatchPhase::PausedOnDuplicate);

    coordinator.skip_duplicate(&mut session).await.expect("skip");

    assert!(session.is_complete());
    let names: Vec<&str> = session.uploaded().iter().map(|u| u.filename.as_str()).collect();
    assert_eq!(names, ["1.png", "2.png", "4.png", "5.png"]);
    assert_eq!(session.skipped(), ["3.png"]);
    assert!(!coordinator.store().contains("reference-images/3.png"));
}

#[tokio::test]
async fn keep_uploads_the_paused_file_before_the_rest() {
    let catalog = SharedCatalog::default();
    let dup_bytes = png(7);
    let existing = refimage::fingerprint(&dup_bytes).expect("fingerprint");
    catalog.seed(CatalogRecord::from_fingerprint("original.png", &existing));

    let coordinator = coordinator(&catalog);
    let mut session = coordinator
        .check_files(vec![file("dup.png", dup_bytes), file("tail.png", png(8))])
        .await;

    assert_eq!(session.phase(), BatchPhase::PausedOnDuplicate);
    coordinator.keep_duplicate(&mut session).await.expect("keep");

    assert!(session.is_complete());
    let names: Vec<&str> = session.uploaded().iter().map(|u| u.filename.as_str()).collect();
    assert_eq!(names, ["dup.png", "tail.png"]);
    assert!(session.skipped().is_empty());
    assert!(coordinator.store().contains("reference-images/dup.png"));
}

#[tokio::test]
async fn near_identical_image_pauses_as_similar() {
    // Same pattern, one pixel nudged: different bytes, near-identical
    // perceptual hash.
    let base = png(9);
    let mut tweaked_img = image::load_from_memory(&base).expect("decode").to_luma8();
    let px = tweaked_img.get_pixel_mut(0, 0);
    px.0[0] = px.0[0].wrapping_add(1);
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageLuma8(tweaked_img)
        .write_to(&mut buf, image::ImageFormat::Png)
        .expect("png encode");
    let tweaked = buf.into_inner();
    assert_ne!(base, tweaked);

    let catalog = SharedCatalog::default();
    let existing = refimage::fingerprint(&base).expect("fingerprint");
    catalog.seed(CatalogRecord::from_fingerprint("base.png", &existing));

    let coordinator = coordinator(&catalog);
    let session = coordinator
        .check_files(vec![file("retouch.png", tweaked)])
        .await;

    assert_eq!(session.phase(), BatchPhase::PausedOnDuplicate);
    let active = session.active_decision().expect("a decision is pending");
    assert_eq!(active.result.kind, MatchKind::Similar);
    assert!(active.result.confidence >= 85);
}

#[tokio::test]
async fn same_filename_different_content_pauses_as_filename_match() {
    let catalog = SharedCatalog::default();
    let existing = refimage::fingerprint(&png(20)).expect("fingerprint");
    let mut record = CatalogRecord::from_fingerprint("logo.png", &existing);
    // Force a size mismatch so the lower-confidence tier applies.
    record.byte_size += 1;
    catalog.seed(record);

    let coordinator = coordinator(&catalog);
    let session = coordinator
        .check_files(vec![file("logo.png", png(21))])
        .await;

    assert_eq!(session.phase(), BatchPhase::PausedOnDuplicate);
    let active = session.active_decision().expect("a decision is pending");
    assert_eq!(active.result.kind, MatchKind::Filename);
    assert_eq!(active.result.confidence, 50);
}

#[tokio::test]
async fn ingested_image_tags_flow_through_the_ledger() {
    let catalog = SharedCatalog::default();
    let coordinator = coordinator(&catalog);
    let session = coordinator
        .check_files(vec![file("tagged.png", png(30))])
        .await;
    assert!(session.is_complete());

    let schema = VocabularySchema::new(vec![
        refimage::CategoryDefinition {
            key: "style".into(),
            label: "Style".into(),
            storage_kind: refimage::StorageKind::DirectArray,
            storage_path: "style".into(),
            search_weight: 1.0,
        },
        refimage::CategoryDefinition {
            key: "room".into(),
            label: "Room".into(),
            storage_kind: refimage::StorageKind::NestedArray,
            storage_path: "meta.rooms".into(),
            search_weight: 2.0,
        },
    ])
    .expect("schema is valid");

    let ledger = TagUsageLedger::new(MemoryCounterStore::new());

    // Initial save of the ingested image's document.
    let empty = json!({});
    let saved = json!({"style": ["modern"], "meta": {"rooms": ["kitchen", "bath"]}});
    let report = apply_tag_change(&ledger, &empty, &saved, &schema).await;
    assert_eq!(report.applied, 3);
    assert_eq!(report.failed, 0);
    assert_eq!(ledger.store().count("style", "modern"), 1);
    assert_eq!(ledger.store().count("room", "kitchen"), 1);

    // Later edit swaps one room tag.
    let edited = json!({"style": ["modern"], "meta": {"rooms": ["kitchen", "attic"]}});
    apply_tag_change(&ledger, &saved, &edited, &schema).await;
    assert_eq!(ledger.store().count("room", "bath"), 0);
    assert_eq!(ledger.store().count("room", "attic"), 1);

    // Deleting the image releases everything it held.
    let old_state = refimage::read_state(&edited, &schema);
    assert_eq!(
        old_state.get("style"),
        Some(&TagValue::List(vec!["modern".into()]))
    );
    ledger.record_delete(&old_state, &schema).await;
    assert_eq!(ledger.store().count("style", "modern"), 0);
    assert_eq!(ledger.store().count("room", "kitchen"), 0);
    assert_eq!(ledger.store().count("room", "attic"), 0);
}
