use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use imgcrawl_core::{CacheKey, Image, Location, Platform, TransformError};
use imgcrawl_site::{ImageSpec, MemoryPlatform, SiteGraph};
use imgcrawl_transform::{
    TransformDescriptor, TransformGate, TransformKind, TransformOutcome, TransformPipeline,
    grayscale,
};
use rayon::prelude::*;

fn platform() -> MemoryPlatform {
    let site = SiteGraph::builder()
        .image("http://site/a.png", ImageSpec::new(2, 2, [200, 100, 50, 255]))
        .build();
    MemoryPlatform::new(Arc::new(site), "/cache")
}

fn image(platform: &MemoryPlatform) -> Image {
    platform.download(&Location::new("http://site/a.png")).unwrap()
}

#[test]
fn test_pipeline_stores_each_transform_once() {
    let platform = platform();
    let gate = TransformGate::new();
    let pipeline = TransformPipeline::from_kinds(&[
        TransformKind::Identity,
        TransformKind::Grayscale,
        TransformKind::Tint,
    ]);
    let image = image(&platform);

    let first = pipeline.run(&image, &gate, &platform);
    assert_eq!(first.iter().filter(|o| o.is_stored()).count(), 3);

    let second = pipeline.run(&image, &gate, &platform);
    assert!(second.iter().all(|o| matches!(o, TransformOutcome::Skipped(_))));

    assert_eq!(platform.store_calls(), 3);
    assert_eq!(
        platform
            .stored_keys()
            .iter()
            .map(|k| k.transform.as_str())
            .collect::<Vec<_>>(),
        ["grayscale", "identity", "tint"]
    );
}

#[test]
fn test_same_name_is_same_transform() {
    let platform = platform();
    let gate = TransformGate::new();
    let pipeline = TransformPipeline::new(vec![grayscale(), grayscale()]);

    let outcomes = pipeline.run(&image(&platform), &gate, &platform);
    assert!(outcomes[0].is_stored());
    assert!(matches!(outcomes[1], TransformOutcome::Skipped(_)));
}

#[test]
fn test_renamed_descriptor_is_distinct() {
    let platform = platform();
    let gate = TransformGate::new();
    let pipeline = TransformPipeline::new(vec![grayscale(), grayscale().renamed("gray-copy")]);

    let outcomes = pipeline.run(&image(&platform), &gate, &platform);
    assert!(outcomes.iter().all(TransformOutcome::is_stored));
}

#[test]
fn test_failed_transform_keeps_claim() {
    let platform = platform();
    let gate = TransformGate::new();
    let broken = TransformDescriptor::new("broken", |image: &Image| {
        Err(TransformError::Failed {
            name: "broken".to_string(),
            source_location: image.source().clone(),
            message: "unsupported".to_string(),
        })
    });
    let pipeline = TransformPipeline::new(vec![broken]);
    let image = image(&platform);

    let outcomes = pipeline.run(&image, &gate, &platform);
    assert!(matches!(outcomes[0], TransformOutcome::Failed { .. }));
    assert!(gate.is_claimed(&CacheKey::new("http://site/a.png", "broken")));

    let retry = pipeline.run(&image, &gate, &platform);
    assert!(matches!(retry[0], TransformOutcome::Skipped(_)));
    assert_eq!(platform.store_calls(), 0);
}

#[test]
fn test_store_failure_is_reported() {
    let platform = platform().rejecting("tint");
    let gate = TransformGate::new();
    let pipeline = TransformPipeline::from_kinds(&[TransformKind::Identity, TransformKind::Tint]);

    let outcomes = pipeline.run(&image(&platform), &gate, &platform);
    assert!(outcomes[0].is_stored());
    assert!(matches!(
        &outcomes[1],
        TransformOutcome::Failed {
            error: TransformError::Store(_),
            ..
        }
    ));
}

#[test]
fn test_gate_under_contention() {
    let gate = TransformGate::new();
    let computed = AtomicUsize::new(0);
    let keys: Vec<CacheKey> = (0..16)
        .map(|i| CacheKey::new(format!("http://site/{i}.png"), "grayscale"))
        .collect();

    (0..64).into_par_iter().for_each(|_| {
        for key in &keys {
            if gate.try_claim(key) {
                computed.fetch_add(1, Ordering::SeqCst);
            }
        }
    });

    assert_eq!(computed.load(Ordering::SeqCst), keys.len());
    assert_eq!(gate.len(), keys.len());
}

#[test]
fn test_concurrent_pipelines_store_once() {
    let platform = platform();
    let gate = TransformGate::new();
    let pipeline = TransformPipeline::from_kinds(&[TransformKind::Grayscale, TransformKind::Tint]);
    let image = image(&platform);

    let produced: usize = (0..32)
        .into_par_iter()
        .map(|_| {
            pipeline
                .run(&image, &gate, &platform)
                .iter()
                .filter(|o| o.is_stored())
                .count()
        })
        .sum();

    assert_eq!(produced, 2);
    assert_eq!(platform.store_calls(), 2);
}
