//! Integration tests for artifact naming and layout.

mod common;

use common::*;
use image::DynamicImage;
use platescan::persistence::plate_filename;
use platescan::{ArtifactStore, Recognition};
use time::macros::datetime;

fn region() -> PlateRegion {
    PlateRegion {
        image: DynamicImage::new_rgb8(40, 20),
        bbox: BoundingBox { x: 5, y: 5, width: 40, height: 20 },
    }
}

fn recognized(text: &str) -> PlateOutcome {
    PlateOutcome::Recognized {
        region: region(),
        recognition: Recognition {
            text: text.to_string(),
            engine: EngineRole::Primary,
        },
    }
}

#[test]
fn test_plate_filename_keeps_only_alphanumerics() {
    assert_eq!(plate_filename(&recognized("AB 12-CD"), 1700000000), "plate_AB12CD_1700000000.jpg");
    assert_eq!(
        plate_filename(&PlateOutcome::Unrecognized { region: region() }, 42),
        "plate_unrecognized_42.jpg"
    );
    assert_eq!(plate_filename(&recognized("--"), 7), "plate_unrecognized_7.jpg");
}

#[test]
fn test_save_writes_into_dated_folder() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let store = ArtifactStore::new(dir.path());
    let at = datetime!(2024-03-09 14:30:00 UTC);

    let saved = store
        .save(&DynamicImage::new_rgb8(100, 80), &recognized("XY99"), at)?
        .expect("artifacts should be written for a located plate");

    let day = dir.path().join("2024-03-09");
    assert_eq!(store.day_dir(at), day);
    assert_eq!(saved.original, day.join(format!("original_{}.jpg", at.unix_timestamp())));
    assert_eq!(saved.plate, day.join(format!("plate_XY99_{}.jpg", at.unix_timestamp())));
    assert!(saved.original.is_file());
    assert!(saved.plate.is_file());

    let crop = image::open(&saved.plate)?;
    assert_eq!((crop.width(), crop.height()), (40, 20));
    Ok(())
}

#[test]
fn test_save_skips_not_found() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let store = ArtifactStore::new(dir.path().join("out"));

    let saved = store.save(
        &DynamicImage::new_rgb8(10, 10),
        &PlateOutcome::NotFound,
        datetime!(2024-01-01 0:00 UTC),
    )?;

    assert!(saved.is_none());
    assert!(!dir.path().join("out").exists());
    Ok(())
}
