//! Bounded worker pool
//!
//! The task list is fixed up front. `workers` threads pull tasks from a
//! shared channel until it drains; results come back over a second channel
//! and are returned once every worker has finished. A panic inside one task
//! is caught and reported for that task alone.

use crossbeam_channel::unbounded;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::logging::Logger;

/// A task together with what running it produced
pub type Completed<T, R> = (T, Result<R, String>);

/// Run `work` over every task on at most `workers` threads
///
/// Each task runs exactly once. Result order is completion order.
pub fn run_bounded<T, R, F>(
    tasks: Vec<T>,
    workers: usize,
    logger: &Logger,
    work: F,
) -> Vec<Completed<T, R>>
where
    T: Send,
    R: Send,
    F: Fn(&T) -> R + Sync,
{
    if tasks.is_empty() {
        return Vec::new();
    }

    let worker_count = workers.clamp(1, tasks.len());
    let (task_tx, task_rx) = unbounded::<T>();
    let (result_tx, result_rx) = unbounded::<Completed<T, R>>();

    for task in tasks {
        // task_rx is alive, so the send cannot fail
        let _ = task_tx.send(task);
    }
    drop(task_tx);

    let work = &work;
    std::thread::scope(|scope| {
        for _ in 0..worker_count {
            let task_rx = task_rx.clone();
            let result_tx = result_tx.clone();
            let logger = logger.clone();

            scope.spawn(move || {
                logger.scope(|| {
                    for task in task_rx.iter() {
                        let outcome = panic::catch_unwind(AssertUnwindSafe(|| work(&task)))
                            .map_err(panic_message);
                        if result_tx.send((task, outcome)).is_err() {
                            break;
                        }
                    }
                })
            });
        }
    });
    drop(result_tx);

    result_rx.into_iter().collect()
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
