use tokio::task::JoinHandle;

/// Named background tasks owned by a client.
///
/// Finished tasks are pruned on every spawn; dropping the manager aborts
/// whatever is still running, so tasks never outlive the client that started
/// them.
#[derive(Default)]
pub struct TaskManager {
    tasks: Vec<(&'static str, JoinHandle<()>)>,
}

impl TaskManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns `future` on the current runtime under `name`
    pub fn spawn<F>(&mut self, name: &'static str, future: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        self.tasks.retain(|(_, handle)| !handle.is_finished());
        tracing::debug!("Spawning background task: {}", name);
        self.tasks.push((name, tokio::spawn(future)));
    }

    /// Aborts every running task without waiting for it
    pub fn abort_all(&mut self) {
        for (name, handle) in self.tasks.drain(..) {
            if !handle.is_finished() {
                tracing::debug!("Aborting background task: {}", name);
                handle.abort();
            }
        }
    }

    /// Names of the tasks still running
    pub fn running(&self) -> Vec<&'static str> {
        self.tasks
            .iter()
            .filter(|(_, handle)| !handle.is_finished())
            .map(|(name, _)| *name)
            .collect()
    }
}

impl Drop for TaskManager {
    fn drop(&mut self) {
        self.abort_all();
    }
}
