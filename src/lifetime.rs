// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Subscription lifetimes.
//!
//! Every subscription is a tokio task. A [`Lifetime`] owns the task handles
//! and aborts them when it is dropped, so no callback runs after the owner
//! starts going away.

use futures::{Stream, StreamExt};
use std::future::Future;
use tokio::task::JoinHandle;

/// Set of running subscriptions tied to one owner.
#[derive(Default)]
pub struct Lifetime {
    tasks: Vec<JoinHandle<()>>,
}

impl Lifetime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `future` until it completes or this lifetime ends.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<F>(&mut self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tasks.retain(|task| !task.is_finished());
        self.tasks.push(tokio::spawn(future));
    }

    /// Call `next` for every value of `stream`, in order.
    pub fn start_with_next<S, T, F>(&mut self, stream: S, mut next: F)
    where
        S: Stream<Item = T> + Send + 'static,
        T: Send + 'static,
        F: FnMut(T) + Send + 'static,
    {
        self.spawn(async move {
            let mut stream = Box::pin(stream);
            while let Some(value) = stream.next().await {
                next(value);
            }
        });
    }

    /// Number of subscriptions still running.
    pub fn active(&self) -> usize {
        self.tasks.iter().filter(|task| !task.is_finished()).count()
    }

    /// End every subscription now.
    pub fn destroy(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

impl Drop for Lifetime {
    fn drop(&mut self) {
        self.destroy();
    }
}
