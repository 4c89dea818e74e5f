//! Integration tests for the lazily loaded, shared OCR engine slot.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use common::*;
use image::DynamicImage;
use platescan::SharedEngine;

fn counting_slot(loads: &Arc<AtomicUsize>) -> SharedEngine<Arc<ScriptedEngine>> {
    let loads = loads.clone();
    SharedEngine::new("fallback", move || {
        loads.fetch_add(1, Ordering::SeqCst);
        Ok(ScriptedEngine::replying("inner", "AB123"))
    })
}

#[test]
fn test_loads_lazily_and_once() -> anyhow::Result<()> {
    let loads = Arc::new(AtomicUsize::new(0));
    let slot = counting_slot(&loads);
    assert!(!slot.is_loaded());
    assert_eq!(loads.load(Ordering::SeqCst), 0);

    let img = DynamicImage::new_rgb8(8, 8);
    assert_eq!(slot.read_text(&img)?, "AB123");
    assert_eq!(slot.read_text(&img)?, "AB123");

    assert!(slot.is_loaded());
    assert_eq!(loads.load(Ordering::SeqCst), 1);
    assert_eq!(slot.name(), "fallback");
    Ok(())
}

#[test]
fn test_concurrent_callers_share_one_instance() -> anyhow::Result<()> {
    let loads = Arc::new(AtomicUsize::new(0));
    let slot = Arc::new(counting_slot(&loads));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let slot = slot.clone();
            std::thread::spawn(move || slot.get().map(|engine| Arc::as_ptr(&engine) as usize))
        })
        .collect();

    let mut addresses = Vec::new();
    for handle in handles {
        let address = handle
            .join()
            .map_err(|_| anyhow::anyhow!("worker panicked"))??;
        addresses.push(address);
    }

    assert_eq!(loads.load(Ordering::SeqCst), 1);
    assert!(addresses.windows(2).all(|w| w[0] == w[1]));
    Ok(())
}

#[test]
fn test_warm_up_and_teardown() -> anyhow::Result<()> {
    let loads = Arc::new(AtomicUsize::new(0));
    let slot = counting_slot(&loads);

    slot.warm_up()?;
    assert!(slot.is_loaded());
    assert_eq!(loads.load(Ordering::SeqCst), 1);

    assert!(slot.teardown());
    assert!(!slot.is_loaded());
    assert!(!slot.teardown());

    // Next use loads again
    slot.get()?;
    assert_eq!(loads.load(Ordering::SeqCst), 2);
    Ok(())
}

#[test]
fn test_failed_load_is_retried_on_next_use() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();
    let slot: SharedEngine<Arc<ScriptedEngine>> = SharedEngine::new("broken", move || {
        counter.fetch_add(1, Ordering::SeqCst);
        anyhow::bail!("model file missing")
    });

    assert!(slot.warm_up().is_err());
    assert!(slot.read_text(&DynamicImage::new_rgb8(4, 4)).is_err());
    assert!(!slot.is_loaded());
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}
