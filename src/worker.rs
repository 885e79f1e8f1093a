use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::{BenchError, Result};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Message type for worker communication
pub enum Message {
    /// New job to execute
    NewJob(Job),
    /// Termination signal
    Terminate,
}

/// Worker thread implementation
pub struct Worker {
    id: usize,
    thread: Option<thread::JoinHandle<()>>,
}

impl Worker {
    /// Create a new worker with the given ID and job receiver
    pub fn new(id: usize, receiver: Receiver<Message>) -> Result<Worker> {
        let thread = thread::Builder::new()
            .name(format!("poolbench-worker-{id}"))
            .spawn(move || loop {
                let message = match receiver.recv() {
                    Ok(msg) => msg,
                    Err(_) => break, // Channel disconnected
                };

                match message {
                    Message::NewJob(job) => {
                        log::debug!("Worker {} executing job", id);
                        let start = std::time::Instant::now();
                        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(job)) {
                            log::error!("Worker {} job panicked: {}", id, panic_message(&*payload));
                        }
                        log::debug!("Worker {} finished job in {:?}", id, start.elapsed());
                    }
                    Message::Terminate => {
                        log::debug!("Worker {} received terminate signal", id);
                        break;
                    }
                }
            })?;

        Ok(Worker {
            id,
            thread: Some(thread),
        })
    }
}

impl fmt::Debug for Worker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Worker")
            .field("id", &self.id)
            .finish()
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("Worker {} thread panicked", self.id);
            }
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Fixed-size pool of OS threads fed from a shared queue
pub struct ThreadPool {
    workers: Vec<Worker>,
    sender: Sender<Message>,
}

impl ThreadPool {
    /// Start `size` worker threads
    pub fn new(size: usize) -> Result<ThreadPool> {
        if size == 0 {
            return Err(BenchError::InvalidPoolSize);
        }

        let (sender, receiver) = unbounded();
        let workers = (0..size)
            .map(|id| Worker::new(id, receiver.clone()))
            .collect::<Result<Vec<_>>>()?;

        Ok(ThreadPool { workers, sender })
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Queue a job without waiting for it
    pub fn execute<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if self.sender.send(Message::NewJob(Box::new(f))).is_err() {
            log::error!("Thread pool queue closed, job dropped");
        }
    }

    /// Run `f` once per input and block until every result is back.
    ///
    /// Results come back in input order no matter which worker finishes first.
    pub fn map<T, R, F, I>(&self, f: F, inputs: I) -> Result<Vec<R>>
    where
        I: IntoIterator<Item = T>,
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> R + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        let (result_tx, result_rx) = unbounded::<(usize, R)>();

        let mut submitted = 0;
        for (index, input) in inputs.into_iter().enumerate() {
            let f = Arc::clone(&f);
            let result_tx = result_tx.clone();
            self.execute(move || {
                let output = f(input);
                // receiver only disappears if the caller already bailed out
                let _ = result_tx.send((index, output));
            });
            submitted += 1;
        }
        drop(result_tx);

        let mut slots: Vec<Option<R>> = (0..submitted).map(|_| None).collect();
        for (index, output) in result_rx.iter() {
            slots[index] = Some(output);
        }

        let missing = slots.iter().filter(|slot| slot.is_none()).count();
        if missing > 0 {
            return Err(BenchError::TaskPanicked(format!(
                "{missing} of {submitted} jobs produced no result"
            )));
        }
        Ok(slots.into_iter().flatten().collect())
    }
}

impl fmt::Debug for ThreadPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadPool")
            .field("workers", &self.workers)
            .finish()
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        for _ in &self.workers {
            let _ = self.sender.send(Message::Terminate);
        }
        // Worker::drop joins each thread
        self.workers.clear();
    }
}
