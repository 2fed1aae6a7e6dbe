//! Resolve each device entry and grow it with one backend.

use crate::backend::ResizeBackend;
use crate::errors::ResizeError;
use crate::report::{ResizeAction, ResizeOutcome, ResizeReport, SizeChange};
use crate::resolver::Resolve;

/// Process `entries` in order. Every entry yields exactly one outcome; resolution
/// failures become SKIPPED and backend failures FAILED without stopping the run.
pub fn resize_devices(
    resolver: &dyn Resolve,
    backend: &dyn ResizeBackend,
    entries: &[String],
) -> ResizeReport {
    let mut report = ResizeReport::default();
    for entry in entries {
        let outcome = resize_entry(resolver, backend, entry);
        report.push(entry, outcome);
    }
    report
}

fn resize_entry(resolver: &dyn Resolve, backend: &dyn ResizeBackend, entry: &str) -> ResizeOutcome {
    let device = match resolver.resolve(entry) {
        Ok(device) => device,
        Err(err) => return ResizeOutcome::skipped(err.to_string()),
    };

    let disk = device.disk.display();
    let ptnum = &device.partition;
    let result = backend
        .resize(&device.disk, ptnum, &device.block_device)
        .and_then(|(before, after)| {
            if after < before {
                Err(ResizeError::Shrunk { before, after })
            } else {
                Ok((before, after))
            }
        });

    match result {
        Ok((before, after)) if before == after => ResizeOutcome {
            action: ResizeAction::NoChange,
            message: format!("no change necessary ({}, {})", disk, ptnum),
            sizes: Some(SizeChange { before, after }),
        },
        Ok((before, after)) => ResizeOutcome {
            action: ResizeAction::Changed,
            message: format!("changed ({}, {}) from {} to {}", disk, ptnum, before, after),
            sizes: Some(SizeChange { before, after }),
        },
        Err(err) => ResizeOutcome::failed(format!(
            "failed to resize: disk={}, ptnum={}: {}",
            disk, ptnum, err
        )),
    }
}
