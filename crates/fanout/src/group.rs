//! Worker group implementation.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{FanoutConfig, FanoutError};

/// A group of worker participants with scatter/gather semantics.
///
/// Participant `i` receives item `i`; results come back in the same order
/// regardless of completion order. The gather barrier blocks until every
/// participant has replied or the phase deadline elapses.
pub struct WorkerGroup {
    capacity: usize,
    phase_timeout: Duration,
    shutdown: CancellationToken,
}

impl WorkerGroup {
    /// Establish a worker group from configuration.
    ///
    /// Fails with [`FanoutError::Unavailable`] when the group is disabled or
    /// has no participant capacity; callers use that as the signal to fall
    /// back to single-node execution.
    pub fn connect(config: &FanoutConfig) -> Result<Self, FanoutError> {
        if !config.enabled {
            return Err(FanoutError::Unavailable(
                "disabled by configuration".to_string(),
            ));
        }
        if config.max_participants == 0 {
            return Err(FanoutError::Unavailable(
                "no participant capacity".to_string(),
            ));
        }

        debug!(
            capacity = config.max_participants,
            timeout_secs = config.phase_timeout_secs,
            "worker group established"
        );

        Ok(Self {
            capacity: config.max_participants,
            phase_timeout: config.phase_timeout(),
            shutdown: CancellationToken::new(),
        })
    }

    /// A local group with a single participant.
    ///
    /// Always available; used when a caller degrades to single-node
    /// execution through the same scatter/gather path.
    pub fn single(phase_timeout: Duration) -> Self {
        Self {
            capacity: 1,
            phase_timeout,
            shutdown: CancellationToken::new(),
        }
    }

    /// Number of participants this group can host.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The phase-wide gather deadline.
    pub fn phase_timeout(&self) -> Duration {
        self.phase_timeout
    }

    /// Request shutdown; any in-flight gather aborts with `Unavailable`.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Scatter `items` 1:1 over participants and gather all results.
    pub async fn scatter_gather<T, R, F, Fut>(
        &self,
        items: Vec<T>,
        task: F,
    ) -> Result<Vec<R>, FanoutError>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(usize, T) -> Fut,
        Fut: Future<Output = R> + Send + 'static,
    {
        self.scatter_gather_with(items, task, |_| {}).await
    }

    /// Like [`scatter_gather`](Self::scatter_gather), invoking `on_unit_done`
    /// with the completed-unit count after each participant replies.
    ///
    /// The hook runs on the gather loop; it must not block.
    pub async fn scatter_gather_with<T, R, F, Fut, P>(
        &self,
        items: Vec<T>,
        task: F,
        mut on_unit_done: P,
    ) -> Result<Vec<R>, FanoutError>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(usize, T) -> Fut,
        Fut: Future<Output = R> + Send + 'static,
        P: FnMut(usize),
    {
        let total = items.len();
        if total == 0 {
            return Ok(Vec::new());
        }
        if total > self.capacity {
            return Err(FanoutError::Unavailable(format!(
                "group of {} cannot host {} participants",
                self.capacity, total
            )));
        }

        let deadline = tokio::time::Instant::now() + self.phase_timeout;
        let mut join_set = JoinSet::new();
        for (index, item) in items.into_iter().enumerate() {
            let unit = task(index, item);
            join_set.spawn(async move { (index, unit.await) });
        }

        let mut slots: Vec<Option<R>> = Vec::with_capacity(total);
        slots.resize_with(total, || None);
        let mut completed = 0usize;

        while completed < total {
            let joined = tokio::select! {
                _ = self.shutdown.cancelled() => {
                    join_set.abort_all();
                    return Err(FanoutError::Unavailable(
                        "worker group shut down".to_string(),
                    ));
                }
                joined = tokio::time::timeout_at(deadline, join_set.join_next()) => joined,
            };

            match joined {
                Err(_) => {
                    warn!(
                        completed,
                        total,
                        timeout_secs = self.phase_timeout.as_secs(),
                        "gather deadline elapsed, aborting phase"
                    );
                    join_set.abort_all();
                    return Err(FanoutError::Timeout {
                        timeout: self.phase_timeout,
                    });
                }
                Ok(Some(Ok((index, result)))) => {
                    slots[index] = Some(result);
                    completed += 1;
                    on_unit_done(completed);
                }
                Ok(Some(Err(join_err))) => {
                    join_set.abort_all();
                    return Err(FanoutError::ParticipantLost {
                        reason: join_err.to_string(),
                    });
                }
                Ok(None) => {
                    // The set drained with slots still empty.
                    return Err(FanoutError::ParticipantLost {
                        reason: format!("{} of {} replies missing", total - completed, total),
                    });
                }
            }
        }

        Ok(slots.into_iter().flatten().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn group(capacity: usize, timeout_secs: u64) -> WorkerGroup {
        WorkerGroup::connect(&FanoutConfig {
            enabled: true,
            max_participants: capacity,
            phase_timeout_secs: timeout_secs,
        })
        .unwrap()
    }

    #[test]
    fn connect_disabled_is_unavailable() {
        let err = WorkerGroup::connect(&FanoutConfig {
            enabled: false,
            ..Default::default()
        })
        .err()
        .unwrap();
        assert!(matches!(err, FanoutError::Unavailable(_)));
    }

    #[test]
    fn connect_zero_capacity_is_unavailable() {
        let err = WorkerGroup::connect(&FanoutConfig {
            enabled: true,
            max_participants: 0,
            ..Default::default()
        })
        .err()
        .unwrap();
        assert!(matches!(err, FanoutError::Unavailable(_)));
    }

    #[test]
    fn single_group_has_capacity_one() {
        let group = WorkerGroup::single(Duration::from_secs(5));
        assert_eq!(group.capacity(), 1);
    }

    #[tokio::test]
    async fn gather_is_index_aligned_despite_completion_order() {
        let group = group(4, 30);
        // Later items finish first.
        let results = group
            .scatter_gather(vec![30u64, 20, 10, 0], |index, delay_ms| async move {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                index * 10
            })
            .await
            .unwrap();
        assert_eq!(results, vec![0, 10, 20, 30]);
    }

    #[tokio::test]
    async fn empty_scatter_returns_empty() {
        let group = group(2, 30);
        let results = group
            .scatter_gather(Vec::<u32>::new(), |_, n| async move { n })
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn over_capacity_scatter_is_unavailable() {
        let group = group(1, 30);
        let err = group
            .scatter_gather(vec![1u32, 2], |_, n| async move { n })
            .await
            .err()
            .unwrap();
        assert!(matches!(err, FanoutError::Unavailable(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_elapse_fails_the_phase() {
        let group = group(2, 1);
        let err = group
            .scatter_gather(vec![0u32, 1], |index, _| async move {
                if index == 1 {
                    // One participant never replies.
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                }
                index
            })
            .await
            .err()
            .unwrap();
        assert!(matches!(err, FanoutError::Timeout { .. }));
    }

    #[tokio::test]
    async fn panicking_participant_is_reported_lost() {
        let group = group(2, 30);
        let err = group
            .scatter_gather(vec![0u32, 1], |index, _| async move {
                if index == 0 {
                    panic!("worker crashed");
                }
                index
            })
            .await
            .err()
            .unwrap();
        assert!(matches!(err, FanoutError::ParticipantLost { .. }));
    }

    #[tokio::test]
    async fn progress_hook_sees_every_completion() {
        let group = group(3, 30);
        let mut seen = Vec::new();
        group
            .scatter_gather_with(
                vec![0u32, 1, 2],
                |index, _| async move { index },
                |done| seen.push(done),
            )
            .await
            .unwrap();
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn shutdown_aborts_in_flight_gather() {
        let group = std::sync::Arc::new(WorkerGroup::single(Duration::from_secs(600)));
        let trigger = group.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.shutdown();
        });
        let err = group
            .scatter_gather(vec![0u32], |_, _| async move {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                0usize
            })
            .await
            .err()
            .unwrap();
        assert!(matches!(err, FanoutError::Unavailable(_)));
    }
}
